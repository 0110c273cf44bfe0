//! Quiescence search: extend the leaf of the main search out through capture
//! sequences so the static evaluator is never asked to judge a position in
//! the middle of a tactical exchange.

use crate::ordering::OrderingTables;
use crate::tt::Bound;
use crate::types::{Move, NULL_MOVE};

use super::worker::{Worker, MATE_SCORE, MAX_QUIESCENCE_PLY};

/// Margin added to the captured piece's value before comparing against
/// alpha: a capture that cannot possibly catch up even with this much slack
/// is pruned without being played (delta pruning).
const DELTA_MARGIN: i32 = 200;

impl Worker {
    /// `qdepth` counts plies spent inside quiescence itself, separate from
    /// `ply` (which indexes the shared killer/history/static-eval stacks and
    /// is shared with the main search): a long forced-capture line can drive
    /// `ply` deep without quiescence recursing very far, and vice versa.
    /// Callers entering quiescence from the main search always pass 0.
    pub(super) fn quiescence(&mut self, mut alpha: i32, beta: i32, ply: usize, qdepth: i32) -> i32 {
        self.record_seldepth(ply);
        if self.count_node() {
            return self.evaluate();
        }

        if let Some(entry) = self.tt.probe(self.pos.hash()) {
            let usable = match entry.bound {
                Bound::Exact => true,
                Bound::Lower => entry.score >= beta,
                Bound::Upper => entry.score <= alpha,
            };
            if usable {
                return entry.score;
            }
        }

        let in_check = self.pos.is_in_check(self.pos.side_to_move());
        let stand_pat = if in_check { -MATE_SCORE + ply as i32 } else { self.evaluate() };

        if !in_check {
            if stand_pat >= beta {
                return stand_pat;
            }
            if stand_pat > alpha {
                alpha = stand_pat;
            }
        }

        if ply >= crate::types::MAX_PLY - 1 || qdepth >= MAX_QUIESCENCE_PLY {
            return stand_pat;
        }

        let candidates = if in_check {
            self.pos.generate_moves()
        } else {
            self.pos.generate_captures()
        };

        let mut scored = crate::types::ScoredMoveList::new();
        for &mv in &candidates {
            let score = OrderingTables::new_capture_score(&self.pos, mv);
            scored.push(mv, score);
        }

        let mover = self.pos.side_to_move();
        let mut best = stand_pat;
        let mut idx = 0;
        let mut searched_any = false;

        while let Some(scored_mv) = scored.pick_best(idx) {
            idx += 1;
            let mv = scored_mv.mv;

            if !in_check {
                // Futility/delta pruning: a capture that can't reach alpha
                // even crediting the full captured value plus a margin is
                // hopeless in a quiet (non-check) position.
                let victim_value = self
                    .pos
                    .piece_at(mv.to())
                    .map(|(_, p)| p.value())
                    .unwrap_or(100);
                if stand_pat + victim_value + DELTA_MARGIN <= alpha && !mv.is_promotion() {
                    continue;
                }
                if !self.pos.see_ge_zero(mv) {
                    continue;
                }
            }

            let info = self.pos.make_move(mv);
            if self.pos.is_in_check(mover) {
                self.pos.unmake_move(mv, info);
                continue;
            }
            searched_any = true;
            self.push_history();
            let score = -self.quiescence(-beta, -alpha, ply + 1, qdepth + 1);
            self.pop_history();
            self.pos.unmake_move(mv, info);

            if self.should_stop() {
                return best;
            }

            if score > best {
                best = score;
                if score > alpha {
                    alpha = score;
                    if alpha >= beta {
                        self.tt.store(
                            self.pos.hash(),
                            mv,
                            score,
                            stand_pat,
                            Bound::Lower,
                            0,
                        );
                        return best;
                    }
                }
            }
        }

        if in_check && !searched_any {
            // Checkmate: no evasion at all.
            return -MATE_SCORE + ply as i32;
        }

        let bound = if best > alpha { Bound::Exact } else { Bound::Upper };
        self.tt
            .store(self.pos.hash(), NULL_MOVE, best, stand_pat, bound, 0);
        best
    }
}

impl OrderingTables {
    /// MVV-LVA only — quiescence never has killers/history/counter-move
    /// context worth consulting, so it scores captures with a cheap
    /// free function instead of going through the full `score_move` table.
    fn new_capture_score(pos: &crate::position::Position, mv: Move) -> i32 {
        let moving_value = pos
            .piece_at(mv.from())
            .map(|(_, p)| p.value())
            .unwrap_or(0);
        let victim_value = pos
            .piece_at(mv.to())
            .map(|(_, p)| p.value())
            .unwrap_or(100); // en passant: pawn takes pawn
        victim_value * 100 - moving_value
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU64};
    use std::sync::Arc;

    use super::*;
    use crate::eval::ClassicalEvaluator;
    use crate::position::Position;
    use crate::tt::TranspositionTable;

    fn test_worker(fen: &str) -> Worker {
        let pos = Position::from_fen(fen).unwrap();
        Worker::new(
            pos,
            Vec::new(),
            Arc::new(TranspositionTable::new(1)),
            Arc::new(ClassicalEvaluator),
            Arc::new(AtomicBool::new(false)),
            Arc::new(AtomicU64::new(0)),
            None,
            None,
        )
    }

    #[test]
    fn quiescence_at_cap_returns_stand_pat_regardless_of_ply() {
        // A rook-trade position with an available capture: below the cap,
        // quiescence must be free to search it; at the cap (even though
        // `ply` itself is nowhere near `MAX_PLY`), it must bail out to
        // stand-pat instead of recursing further.
        let mut worker = test_worker("8/8/8/3r4/8/8/3R4/3K3k w - - 0 1");
        let stand_pat = worker.evaluate();
        let capped = worker.quiescence(-32_000, 32_000, 10, MAX_QUIESCENCE_PLY);
        assert_eq!(capped, stand_pat);
    }
}
