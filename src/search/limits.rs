//! Caller-supplied search budget: a depth cap, a time cap, and an optional
//! node cap. The coordinator owns translating these into a deadline each
//! worker polls; nothing here is thread-specific.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, Default)]
pub struct SearchLimits {
    pub depth: Option<u32>,
    pub movetime: Option<Duration>,
    pub nodes: Option<u64>,
}

impl SearchLimits {
    #[must_use]
    pub fn depth(depth: u32) -> Self {
        SearchLimits {
            depth: Some(depth),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn movetime(ms: u64) -> Self {
        SearchLimits {
            movetime: Some(Duration::from_millis(ms)),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn deadline(&self, start: Instant) -> Option<Instant> {
        self.movetime.map(|d| start + d)
    }
}
