//! Chess engine core: bitboard position representation, move generation,
//! parallel alpha-beta search, and a shared transposition table. The UCI/CLI
//! protocol driver, opening book contents, and tablebase files are external
//! collaborators — this crate only names their interfaces ([`book`],
//! [`tablebase`]) and provides a default no-op implementation of each.
//!
//! [`Engine`] is the entry point a driver embeds: build one with [`Engine::new`],
//! point it at a position with [`Engine::set_position`], and call
//! [`Engine::search`].

pub mod attacks;
pub mod book;
pub mod error;
pub mod eval;
#[cfg(feature = "embedded_nnue")]
pub mod nnue;
pub mod ordering;
pub mod position;
pub mod search;
pub mod tablebase;
pub mod tt;
pub mod types;
mod zobrist;

use std::sync::Arc;

use book::{EmptyBook, OpeningBook};
use error::EngineError;
use eval::{ClassicalEvaluator, PositionEvaluator};
use position::Position;
use search::{Coordinator, SearchInfo, SearchLimits, SearchResult, SearchState};
use tablebase::{NoTablebase, Tablebase};
use tt::TranspositionTable;
use types::Move;

/// Default transposition table size, matching the teacher's own UCI default.
const DEFAULT_TT_SIZE_MB: usize = 64;
/// Default worker count when the caller doesn't specify one.
const DEFAULT_WORKER_COUNT: usize = 1;

/// One call to attack-table and Zobrist-key initialization, process-wide.
/// Cheap to call more than once (every step is idempotent), but callers
/// should call it once at startup rather than relying on first-use jitter
/// inside the search's hot loop.
pub fn init() {
    attacks::init();
    zobrist::init();
}

/// Ties together a position, a transposition table, an evaluator, and the
/// search coordinator. Not `Sync` itself — a driver wanting concurrent access
/// from multiple threads (e.g. a UCI command thread alongside a search
/// thread) should wrap it in its own `Mutex`; [`Engine::stop`] is the one
/// operation meant to be called while a search is in flight, and it only
/// touches the coordinator's own atomics.
pub struct Engine {
    position: Position,
    history: Vec<u64>,
    tt: Arc<TranspositionTable>,
    evaluator: Arc<dyn PositionEvaluator>,
    book: Arc<dyn OpeningBook>,
    tablebase: Arc<dyn Tablebase>,
    coordinator: Coordinator,
    worker_count: usize,
}

impl Engine {
    /// Build an engine at the starting position with a default-sized
    /// transposition table, the classical evaluator, and no book or
    /// tablebase. Calls [`init`] for you.
    #[must_use]
    pub fn new() -> Self {
        init();
        let tt = Arc::new(TranspositionTable::new(DEFAULT_TT_SIZE_MB));
        let evaluator: Arc<dyn PositionEvaluator> = Arc::new(ClassicalEvaluator);
        Engine {
            position: Position::startpos(),
            history: Vec::new(),
            tt: Arc::clone(&tt),
            evaluator: Arc::clone(&evaluator),
            book: Arc::new(EmptyBook),
            tablebase: Arc::new(NoTablebase),
            coordinator: Coordinator::new(tt, evaluator),
            worker_count: DEFAULT_WORKER_COUNT,
        }
    }

    /// Swap in a different evaluator (e.g. a loaded [`nnue::NnueEvaluator`]).
    /// Takes effect on the next [`search`](Self::search) call.
    pub fn set_evaluator(&mut self, evaluator: Arc<dyn PositionEvaluator>) {
        self.evaluator = Arc::clone(&evaluator);
        self.coordinator = Coordinator::new(Arc::clone(&self.tt), evaluator);
    }

    /// Install an opening book. Consulted by [`search`](Self::search) before
    /// any work is handed to the coordinator.
    pub fn set_book(&mut self, book: Arc<dyn OpeningBook>) {
        self.book = book;
    }

    /// Install a tablebase prober. Consulted by [`search`](Self::search)
    /// ahead of the book, since a verified tablebase result is stronger
    /// evidence than book statistics.
    pub fn set_tablebase(&mut self, tablebase: Arc<dyn Tablebase>) {
        self.tablebase = tablebase;
    }

    /// Default worker count used by [`search`](Self::search) when not told
    /// otherwise via [`search_with_workers`](Self::search_with_workers).
    pub fn set_worker_count(&mut self, worker_count: usize) {
        self.worker_count = worker_count.max(1);
    }

    /// Resize the transposition table, clearing its contents. The
    /// reallocation is the only engine operation that can fail: the
    /// requested size might not fit in available memory.
    pub fn set_tt_size(&mut self, size_mb: usize) -> Result<(), EngineError> {
        match TranspositionTable::try_new(size_mb) {
            Ok(table) => {
                #[cfg(feature = "logging")]
                log::info!("resized transposition table to {size_mb} MB");
                let tt = Arc::new(table);
                self.tt = Arc::clone(&tt);
                self.coordinator = Coordinator::new(tt, Arc::clone(&self.evaluator));
                Ok(())
            }
            Err(_) => {
                #[cfg(feature = "logging")]
                log::warn!("failed to allocate a {size_mb} MB transposition table");
                Err(EngineError::TableAllocationFailure { requested_mb: size_mb })
            }
        }
    }

    /// Set the current position from a FEN string, discarding any move
    /// history accumulated so far (a fresh FEN is a fresh game as far as
    /// repetition detection is concerned).
    pub fn set_position(&mut self, fen: &str) -> Result<(), EngineError> {
        self.position = Position::from_fen(fen)?;
        self.history.clear();
        Ok(())
    }

    /// Set the position to the standard start position, then play `moves`
    /// (UCI notation, e.g. `["e2e4", "e7e5"]`) against it. The played
    /// positions' hashes seed repetition detection for the upcoming search.
    pub fn set_position_from_startpos_and_moves(&mut self, moves: &[&str]) -> Result<(), EngineError> {
        self.position = Position::startpos();
        self.history.clear();
        for uci in moves {
            let mv = position::parse_uci_move(&self.position, uci)?;
            self.history.push(self.position.hash());
            let _ = self.position.make_move(mv);
        }
        Ok(())
    }

    #[must_use]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[must_use]
    pub fn state(&self) -> SearchState {
        self.coordinator.state()
    }

    /// Request that an in-progress search wind down at its next poll.
    /// Harmless to call when nothing is searching.
    pub fn stop(&self) {
        self.coordinator.stop();
    }

    /// Search the current position with this engine's configured worker
    /// count. A book hit or a confident tablebase result short-circuits the
    /// coordinator entirely, matching the "book/tablebase take precedence
    /// over search" behavior a driver expects from named move-selection
    /// stages.
    pub fn search(
        &self,
        limits: SearchLimits,
        on_info: impl FnMut(&SearchInfo) + Send + 'static,
    ) -> SearchResult {
        self.search_with_workers(limits, self.worker_count, on_info)
    }

    pub fn search_with_workers(
        &self,
        limits: SearchLimits,
        worker_count: usize,
        on_info: impl FnMut(&SearchInfo) + Send + 'static,
    ) -> SearchResult {
        if let Some(root_probe) = self.probe_tablebase_root() {
            #[cfg(feature = "logging")]
            log::info!("tablebase root probe resolved the position, skipping search");
            return root_probe;
        }
        if let Some(book_move) = self.book.best_move(&self.position) {
            #[cfg(feature = "logging")]
            log::info!("opening book supplied {}, skipping search", book_move.to_uci());
            return SearchResult {
                best_move: Some(book_move),
                ponder_move: None,
                score: 0,
                depth: 0,
                nodes: 0,
            };
        }
        #[cfg(feature = "logging")]
        log::debug!("starting search with {worker_count} worker(s)");
        self.coordinator
            .search(&self.position, self.history.clone(), limits, worker_count, on_info)
    }

    fn probe_tablebase_root(&self) -> Option<SearchResult> {
        if !self.tablebase.can_probe(&self.position) {
            return None;
        }
        let probe = self.tablebase.probe_root(&self.position)?;
        let score = match probe.wdl {
            tablebase::Wdl::Win => search::MATE_SCORE - probe.distance_to_zero as i32,
            tablebase::Wdl::Loss => -(search::MATE_SCORE - probe.distance_to_zero as i32),
            tablebase::Wdl::Draw | tablebase::Wdl::Failed => 0,
        };
        Some(SearchResult {
            best_move: Some(probe.best_move),
            ponder_move: None,
            score,
            depth: 0,
            nodes: 0,
        })
    }

    /// Play `mv` against the live position directly, bypassing
    /// [`search`](Self::search) — used by a driver applying the opponent's
    /// move between searches.
    pub fn make_move(&mut self, mv: Move) {
        self.history.push(self.position.hash());
        let _ = self.position.make_move(mv);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_engine_starts_at_startpos() {
        let engine = Engine::new();
        assert_eq!(engine.position().hash(), Position::startpos().hash());
    }

    #[test]
    fn set_position_from_moves_replays_them() {
        let mut engine = Engine::new();
        engine
            .set_position_from_startpos_and_moves(&["e2e4", "e7e5"])
            .unwrap();
        let mut expected = Position::startpos();
        expected.make_move(position::parse_uci_move(&expected, "e2e4").unwrap());
        expected.make_move(position::parse_uci_move(&expected, "e7e5").unwrap());
        assert_eq!(engine.position().hash(), expected.hash());
    }

    #[test]
    fn invalid_fen_is_rejected() {
        let mut engine = Engine::new();
        assert!(engine.set_position("not a fen").is_err());
    }

    #[test]
    fn resizing_tt_succeeds_for_reasonable_sizes() {
        let mut engine = Engine::new();
        assert!(engine.set_tt_size(8).is_ok());
    }

    #[test]
    fn idle_engine_reports_idle_state() {
        let engine = Engine::new();
        assert_eq!(engine.state(), SearchState::Idle);
    }
}
