//! Iterative deepening: search depth 1, then 2, then 3 and so on, narrowing
//! each iteration's window around the previous iteration's score (aspiration
//! windows) and re-searching with a wider window on failure.

use std::time::Instant;

use crate::types::Move;

use super::worker::{Worker, INFINITY, MATE_THRESHOLD};
use super::{SearchInfo, SearchLimits};

/// Fraction of the hard time limit spent as the "soft" limit: once an
/// iteration finishes past this point, don't start another.
const SOFT_TIME_NUMERATOR: u64 = 2;
const SOFT_TIME_DENOMINATOR: u64 = 3;

impl Worker {
    /// Run iterative deepening from depth 1 up to `limits.depth` (or
    /// [`crate::types::MAX_PLY`] if unset), calling `on_info` after each
    /// completed iteration. Returns the best move found and its score.
    pub(super) fn iterative_deepening(
        &mut self,
        limits: SearchLimits,
        start: Instant,
        mut on_info: impl FnMut(&SearchInfo),
    ) -> (Option<Move>, i32) {
        let max_depth = limits.depth.unwrap_or(crate::types::MAX_PLY as u32 - 1);
        let soft_deadline = limits
            .movetime
            .map(|d| start + d * SOFT_TIME_NUMERATOR as u32 / SOFT_TIME_DENOMINATOR as u32);

        let mut score = self.evaluate();
        let mut best_move = None;

        for depth in 1..=max_depth {
            if self.should_stop() {
                break;
            }
            if let Some(soft) = soft_deadline {
                if depth > 4 && Instant::now() >= soft {
                    break;
                }
            }

            let iter_start_nodes = self.nodes;
            self.seldepth = 0;

            let mut delta = if depth <= 5 { 25 } else { 15 };
            let mut alpha = (score - delta).max(-INFINITY);
            let mut beta = (score + delta).min(INFINITY);

            let iter_score = loop {
                let s = self.negamax(depth as i32, alpha, beta, 0, true, None);

                if self.should_stop() {
                    break score;
                }
                if s.abs() >= MATE_THRESHOLD {
                    break s;
                }
                if s >= beta {
                    beta = (beta + delta).min(INFINITY);
                    delta = delta.saturating_mul(3) / 2;
                } else if s <= alpha {
                    alpha = (alpha - delta).max(-INFINITY);
                    delta = delta.saturating_mul(2);
                } else {
                    break s;
                }
                if delta > 800 {
                    alpha = -INFINITY;
                    beta = INFINITY;
                }
            };

            if self.should_stop() && depth > 1 {
                break;
            }

            score = iter_score;
            if let Some(mv) = self.root_best_move {
                if self.root_moves.contains(&mv) {
                    best_move = Some(mv);
                }
            }

            let pv = self.extract_pv(&self.pos.clone(), depth as usize);
            let nodes_this_iter = self.nodes - iter_start_nodes;
            let elapsed = start.elapsed();
            let info = SearchInfo {
                depth,
                seldepth: self.seldepth as u32,
                score,
                nodes: self.nodes,
                nodes_this_iter,
                time: elapsed,
                pv,
            };
            on_info(&info);
        }

        (best_move, score)
    }
}
