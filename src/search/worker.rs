//! Per-thread search state: a cloned [`Position`], worker-local move-ordering
//! tables, and the bookkeeping negamax needs (static-eval stack, previous-move
//! stack for counter-move lookups, node counter, repetition history). Shared
//! state — the transposition table, the stop flag, the evaluator — is held
//! behind `Arc` so every worker can read it without locking.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::eval::PositionEvaluator;
use crate::ordering::{OrderingTables, PreviousMove};
use crate::position::Position;
use crate::tt::TranspositionTable;
use crate::types::{Move, MAX_PLY};

/// A sentinel larger than any real score; used as the outer search window
/// before aspiration narrows it.
pub const INFINITY: i32 = 32_001;
/// The score returned for "mate delivered on this very move"; actual mate
/// scores are `MATE_SCORE - ply` so shorter mates always outscore longer ones.
pub const MATE_SCORE: i32 = 32_000;
/// Any score at or beyond this magnitude is a mate score, not a material
/// evaluation — used to recognize mates and to gate null-move/ProbCut, which
/// are unsound near forced mates.
pub const MATE_THRESHOLD: i32 = MATE_SCORE - MAX_PLY as i32;
/// Quiescence search's own depth bound (expressed as negative `depth`), deep
/// enough to resolve long capture sequences without runaway recursion in
/// pathological tactical positions.
pub const MAX_QUIESCENCE_PLY: i32 = 6;
/// How many nodes pass between stop-flag / deadline polls.
pub const POLL_INTERVAL: u64 = 4096;

pub struct Worker {
    pub(super) pos: Position,
    pub(super) tt: Arc<TranspositionTable>,
    pub(super) evaluator: Arc<dyn PositionEvaluator>,
    pub(super) ordering: OrderingTables,
    /// Zobrist hashes of every position from game start (or search root, if
    /// the caller has no earlier game history) through the current node,
    /// inclusive. Used for repetition detection.
    pub(super) history: Vec<u64>,
    pub(super) stop: Arc<AtomicBool>,
    pub(super) deadline: Option<Instant>,
    pub(super) node_limit: Option<u64>,
    pub(super) nodes: u64,
    pub(super) global_nodes: Arc<AtomicU64>,
    pub(super) seldepth: usize,
    pub(super) static_evals: Box<[i32; MAX_PLY]>,
    pub(super) previous_moves: Box<[Option<PreviousMove>; MAX_PLY]>,
    pub(super) root_best_move: Option<Move>,
    pub(super) root_moves: Vec<Move>,
}

impl Worker {
    pub(super) fn new(
        pos: Position,
        history: Vec<u64>,
        tt: Arc<TranspositionTable>,
        evaluator: Arc<dyn PositionEvaluator>,
        stop: Arc<AtomicBool>,
        global_nodes: Arc<AtomicU64>,
        deadline: Option<Instant>,
        node_limit: Option<u64>,
    ) -> Self {
        let root_moves = pos.legal_moves().iter().copied().collect();
        Worker {
            pos,
            tt,
            evaluator,
            ordering: OrderingTables::new(),
            history,
            stop,
            deadline,
            node_limit,
            nodes: 0,
            global_nodes,
            seldepth: 0,
            static_evals: Box::new([0; MAX_PLY]),
            previous_moves: Box::new([None; MAX_PLY]),
            root_best_move: None,
            root_moves,
        }
    }

    #[inline]
    pub(super) fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Called every [`POLL_INTERVAL`] nodes: check the cooperative stop flag
    /// and the deadline, latching the flag so every other worker notices too.
    pub(super) fn poll(&mut self) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            return true;
        }
        if let Some(limit) = self.node_limit {
            if self.nodes >= limit {
                self.stop.store(true, Ordering::Relaxed);
                return true;
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                self.stop.store(true, Ordering::Relaxed);
                return true;
            }
        }
        false
    }

    #[inline]
    pub(super) fn count_node(&mut self) -> bool {
        self.nodes += 1;
        self.global_nodes.fetch_add(1, Ordering::Relaxed);
        if self.nodes % POLL_INTERVAL == 0 {
            self.poll()
        } else {
            self.should_stop()
        }
    }

    #[inline]
    pub(super) fn evaluate(&self) -> i32 {
        self.evaluator.evaluate(&self.pos)
    }

    /// Fifty-move rule or a repetition within the current halfmove-clock
    /// window. `history` holds the current position's hash as its own last
    /// entry, so the lookback window excludes it before comparing.
    pub(super) fn is_draw(&self) -> bool {
        if self.pos.halfmove_clock() >= 100 {
            return true;
        }
        let len = self.history.len();
        if len < 2 {
            return false;
        }
        let current = self.history[len - 1];
        let clock = self.pos.halfmove_clock() as usize;
        let lookback = clock.min(len - 1);
        self.history[len - 1 - lookback..len - 1]
            .iter()
            .any(|&h| h == current)
    }

    pub(super) fn push_history(&mut self) {
        self.history.push(self.pos.hash());
    }

    pub(super) fn pop_history(&mut self) {
        self.history.pop();
    }

    pub(super) fn record_seldepth(&mut self, ply: usize) {
        if ply > self.seldepth {
            self.seldepth = ply;
        }
    }

    /// Walk the principal variation out of the transposition table, starting
    /// from `root`. Bounded by `max_len` and a visited-hash guard so a cyclic
    /// or stale TT can never spin forever.
    pub(super) fn extract_pv(&self, root: &Position, max_len: usize) -> Vec<Move> {
        let mut pv = Vec::with_capacity(max_len);
        let mut pos = root.clone();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..max_len {
            let Some(entry) = self.tt.probe(pos.hash()) else {
                break;
            };
            let mv = entry.best_move;
            if mv.is_null() || !pos.is_legal_move(mv) {
                break;
            }
            if !seen.insert(pos.hash()) {
                break;
            }
            pv.push(mv);
            pos.make_move(mv);
        }
        pv
    }
}
