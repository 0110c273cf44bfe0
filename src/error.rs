//! Error kinds surfaced across the engine's boundary: FEN/move parsing,
//! transposition-table allocation, and search cancellation. Nothing in the
//! search's inner loop raises — the stop flag and sentinel scores handle
//! early return there; these are only for the fallible operations a caller
//! invokes directly.

use std::fmt;

use crate::position::{FenError, MoveParseError};

#[derive(Debug)]
pub enum EngineError {
    /// FEN field count, character, or cross-field consistency failure.
    InvalidFen(FenError),
    /// Move string unparseable, or not legal in the current position.
    InvalidMove(MoveParseError),
    /// The requested transposition-table size could not be allocated.
    TableAllocationFailure { requested_mb: usize },
    /// The stop flag was observed before any depth completed.
    SearchCancelled,
    /// The time budget ran out before any depth completed.
    DeadlineExceeded,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidFen(e) => write!(f, "invalid FEN: {e}"),
            EngineError::InvalidMove(e) => write!(f, "invalid move: {e}"),
            EngineError::TableAllocationFailure { requested_mb } => {
                write!(f, "failed to allocate a {requested_mb} MB transposition table")
            }
            EngineError::SearchCancelled => write!(f, "search cancelled before any depth completed"),
            EngineError::DeadlineExceeded => write!(f, "time budget exhausted before any depth completed"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<FenError> for EngineError {
    fn from(e: FenError) -> Self {
        EngineError::InvalidFen(e)
    }
}

impl From<MoveParseError> for EngineError {
    fn from(e: MoveParseError) -> Self {
        EngineError::InvalidMove(e)
    }
}
