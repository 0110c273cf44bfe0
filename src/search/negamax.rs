//! The main search: negamax alpha-beta with the full pruning and extension
//! toolkit (null move, razoring, reverse futility, ProbCut, internal
//! iterative deepening, late move pruning/reductions, futility pruning,
//! SEE-pruned captures, check/singular extensions, PVS re-search).

use crate::ordering::PreviousMove;
use crate::tt::Bound;
use crate::types::{Move, Piece, ScoredMoveList, MAX_PLY, NULL_MOVE};

use super::extensions;
use super::lmr;
use super::pruning;
use super::worker::{Worker, INFINITY, MATE_SCORE, MATE_THRESHOLD};

impl Worker {
    /// `excluded`, when set, is the singular-extension verification search:
    /// every candidate move is tried except this one, and the caller compares
    /// the result against a margin below the excluded move's TT score.
    pub(super) fn negamax(
        &mut self,
        mut depth: i32,
        mut alpha: i32,
        mut beta: i32,
        ply: usize,
        is_pv: bool,
        excluded: Option<Move>,
    ) -> i32 {
        if depth <= 0 {
            return self.quiescence(alpha, beta, ply, 0);
        }

        if self.count_node() {
            return self.evaluate();
        }

        let is_root = ply == 0;

        if !is_root {
            // Mate distance pruning: a shorter mate always beats a longer
            // one, so once the window can't hold anything better than the
            // fastest possible mate from here, there is nothing left to find.
            alpha = alpha.max(-MATE_SCORE + ply as i32);
            beta = beta.min(MATE_SCORE - ply as i32 - 1);
            if alpha >= beta {
                return alpha;
            }

            if self.is_draw() {
                return 0;
            }
        }

        if ply >= MAX_PLY - 1 {
            return self.evaluate();
        }

        let in_check = self.pos.is_in_check(self.pos.side_to_move());
        if in_check {
            depth += 1; // never evaluate a check as a quiet leaf
        }

        let tt_hash = self.pos.hash();
        let tt_entry = if excluded.is_some() {
            None
        } else {
            self.tt.probe(tt_hash)
        };

        if let Some(entry) = tt_entry {
            if !is_pv && entry.depth >= depth {
                let usable = match entry.bound {
                    Bound::Exact => true,
                    Bound::Lower => entry.score >= beta,
                    Bound::Upper => entry.score <= alpha,
                };
                if usable {
                    return entry.score;
                }
            }
        }
        let tt_move = tt_entry.map(|e| e.best_move).filter(|m| !m.is_null());

        let static_eval = if in_check {
            -INFINITY
        } else {
            tt_entry.map(|e| e.static_eval).unwrap_or_else(|| self.evaluate())
        };
        self.static_evals[ply] = static_eval;
        let improving = !in_check && ply >= 2 && static_eval > self.static_evals[ply - 2];

        if !is_pv && !in_check && excluded.is_none() {
            // Razoring.
            if depth <= pruning::RAZOR_MAX_DEPTH
                && static_eval + pruning::razor_margin(depth) <= alpha
            {
                let score = self.quiescence(alpha, beta, ply, 0);
                if score <= alpha {
                    return score;
                }
            }

            // Reverse futility / static null move pruning.
            if depth <= pruning::RFP_MAX_DEPTH
                && static_eval - pruning::rfp_margin(depth, improving) >= beta
                && beta.abs() < MATE_THRESHOLD
            {
                return static_eval;
            }

            // Null-move pruning: skip our turn and see if the opponent is
            // still in trouble. Unsound with no non-pawn material (zugzwang)
            // or near mate scores.
            if depth >= pruning::NULL_MOVE_MIN_DEPTH
                && static_eval >= beta
                && self.pos.non_pawn_material(self.pos.side_to_move()) > 0
                && beta.abs() < MATE_THRESHOLD
            {
                let reduction = pruning::null_move_reduction(depth, static_eval - beta);
                let info = self.pos.make_null_move();
                let prev = self.previous_moves[ply + 1];
                self.previous_moves[ply + 1] = None;
                let score = -self.negamax(depth - 1 - reduction, -beta, -beta + 1, ply + 1, false, None);
                self.previous_moves[ply + 1] = prev;
                self.pos.unmake_null_move(info);
                if self.should_stop() {
                    return static_eval;
                }
                if score >= beta {
                    return if score >= MATE_THRESHOLD { beta } else { score };
                }
            }

            // ProbCut: a handful of good captures searched to a reduced depth
            // at a raised beta, strong evidence a full search would also
            // fail high.
            if depth >= pruning::PROBCUT_MIN_DEPTH && beta.abs() < MATE_THRESHOLD {
                let raised_beta = beta + pruning::PROBCUT_MARGIN;
                if let Some(score) = self.probcut(raised_beta, depth, ply) {
                    return score;
                }
            }
        }

        // Internal iterative deepening: no TT move on a PV node deep enough
        // to be worth the investment, so spend a shallower search finding
        // one to seed ordering with.
        let tt_move = if tt_move.is_none() && is_pv && depth >= pruning::IID_MIN_DEPTH {
            self.negamax(
                depth - pruning::IID_REDUCTION,
                alpha,
                beta,
                ply,
                is_pv,
                excluded,
            );
            self.tt.probe(tt_hash).map(|e| e.best_move).filter(|m| !m.is_null())
        } else {
            tt_move
        };

        // Singular extension candidate check: the TT move must come from a
        // deep-enough entry with a non-upper bound, and not already be a
        // mate score (which would make the verification window meaningless).
        let singular_candidate = excluded.is_none()
            && depth >= extensions::SINGULAR_MIN_DEPTH
            && tt_entry.is_some_and(|e| {
                tt_move.is_some()
                    && e.depth >= depth - extensions::SINGULAR_TT_DEPTH_MARGIN
                    && e.bound != Bound::Upper
                    && e.score.abs() < MATE_THRESHOLD
            });

        let moves = self.pos.generate_moves();
        let mut scored = ScoredMoveList::new();
        let prev_move = self.previous_moves[ply];
        for &mv in &moves {
            if Some(mv) == excluded {
                continue;
            }
            let score = self.ordering.score_move(&self.pos, mv, ply, tt_move, prev_move);
            scored.push(mv, score);
        }

        let original_alpha = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = NULL_MOVE;
        let mover = self.pos.side_to_move();
        let mut move_count = 0usize;
        let mut quiet_count = 0usize;
        let mut quiets_tried: Vec<Move> = Vec::new();
        let mut idx = 0;

        while let Some(scored_mv) = scored.pick_best(idx) {
            idx += 1;
            let mv = scored_mv.mv;

            let moving_piece = match self.pos.piece_at(mv.from()) {
                Some((_, p)) => p,
                None => continue,
            };
            let is_capture_or_promo =
                self.pos.piece_at(mv.to()).is_some() || mv.is_promotion() || {
                    moving_piece == Piece::Pawn && Some(mv.to()) == self.pos.en_passant_square()
                };
            let is_quiet = !is_capture_or_promo;

            // Singular extension verification: search every other move at a
            // reduced depth against a window just below the TT move's score.
            // If nothing beats it, the TT move is forced and earns extra depth.
            let mut extension = 0;
            if singular_candidate && Some(mv) == tt_move {
                let entry = tt_entry.expect("singular_candidate implies a TT entry");
                let margin = extensions::singular_margin(depth);
                let verification_depth = extensions::singular_verification_depth(depth);
                let reduced_beta = entry.score - margin;
                let verification_score = self.negamax(
                    verification_depth,
                    reduced_beta - 1,
                    reduced_beta,
                    ply,
                    false,
                    Some(mv),
                );
                if self.should_stop() {
                    return best_score.max(alpha);
                }
                if verification_score < reduced_beta {
                    extension = 1;
                }
            }

            if !is_root && is_quiet && !in_check {
                if depth <= pruning::FUTILITY_MAX_DEPTH
                    && move_count > 0
                    && static_eval + pruning::futility_margin(depth) <= alpha
                {
                    continue;
                }
                if depth <= 6 && move_count >= pruning::late_move_count(depth, improving) {
                    continue;
                }
            }

            if !is_root && is_capture_or_promo && !in_check && depth <= 8 && move_count > 0 {
                // SEE pruning: don't bother with captures that clearly lose
                // material once the position isn't forcing.
                if !self.pos.see_ge_zero(mv) {
                    continue;
                }
            }

            let info = self.pos.make_move(mv);
            if self.pos.is_in_check(mover) {
                self.pos.unmake_move(mv, info);
                continue;
            }

            move_count += 1;
            if is_quiet {
                quiet_count += 1;
                quiets_tried.push(mv);
            }

            let gives_check = self.pos.is_in_check(self.pos.side_to_move());
            extension += extensions::check_extension(gives_check);

            let prev_for_child = self.previous_moves[ply + 1];
            self.previous_moves[ply + 1] = Some(PreviousMove {
                piece: moving_piece,
                to: mv.to(),
            });
            self.push_history();

            let new_depth = depth - 1 + extension;
            let score = if move_count == 1 {
                -self.negamax(new_depth, -beta, -alpha, ply + 1, is_pv, None)
            } else {
                let is_killer = self.ordering.is_killer(ply, mv);
                let base = lmr::base_reduction(depth, move_count);
                let reduction = if is_quiet && !in_check && depth >= 3 && move_count > 3 {
                    lmr::adjust(base, is_pv, improving, is_killer, gives_check)
                } else {
                    0
                };
                let reduced_depth = (new_depth - reduction).max(1);
                let mut s = -self.negamax(reduced_depth, -alpha - 1, -alpha, ply + 1, false, None);
                if s > alpha && (reduction > 0 || is_pv) {
                    s = -self.negamax(new_depth, -beta, -alpha, ply + 1, is_pv, None);
                }
                s
            };

            self.pop_history();
            self.previous_moves[ply + 1] = prev_for_child;
            self.pos.unmake_move(mv, info);

            if self.should_stop() {
                return if best_move.is_null() { alpha } else { best_score };
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
                if is_root {
                    self.root_best_move = Some(mv);
                }
            }

            if score > alpha {
                alpha = score;
            }

            if alpha >= beta {
                if is_quiet {
                    self.ordering
                        .record_cutoff(mover, mv, moving_piece, depth, ply, prev_move);
                    for &quiet in quiets_tried.iter().take(quiets_tried.len().saturating_sub(1)) {
                        if quiet == mv {
                            continue;
                        }
                        if let Some((_, p)) = self.pos.piece_at(quiet.from()) {
                            self.ordering
                                .record_quiet_failure(mover, quiet, p, depth, prev_move);
                        }
                    }
                }
                break;
            }
        }

        let _ = quiet_count;

        if move_count == 0 {
            if excluded.is_some() {
                // Every move was the excluded one and it was illegal in some
                // edge case, or there simply were no other moves: treat as a
                // fail-low so the caller's singular check degrades gracefully.
                return alpha;
            }
            return if in_check {
                -MATE_SCORE + ply as i32
            } else {
                0
            };
        }

        let bound = if best_score <= original_alpha {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };

        if excluded.is_none() {
            self.tt.store(tt_hash, best_move, best_score, static_eval, bound, depth);
        }

        best_score
    }

    /// ProbCut helper: try a few good captures at a shallow depth against a
    /// raised beta. Returns `Some(score)` on a cutoff, `None` to fall through
    /// to the normal move loop.
    fn probcut(&mut self, raised_beta: i32, depth: i32, ply: usize) -> Option<i32> {
        let captures = self.pos.generate_captures();
        let mut scored = ScoredMoveList::new();
        for &mv in &captures {
            if !self.pos.see_ge_zero(mv) {
                continue;
            }
            let victim = self.pos.piece_at(mv.to()).map(|(_, p)| p.value()).unwrap_or(100);
            scored.push(mv, victim);
        }

        let mover = self.pos.side_to_move();
        let mut idx = 0;
        while let Some(scored_mv) = scored.pick_best(idx) {
            idx += 1;
            let mv = scored_mv.mv;
            let info = self.pos.make_move(mv);
            if self.pos.is_in_check(mover) {
                self.pos.unmake_move(mv, info);
                continue;
            }
            self.push_history();
            let score = -self.negamax(
                pruning::PROBCUT_REDUCED_DEPTH.min(depth - 1),
                -raised_beta,
                -raised_beta + 1,
                ply + 1,
                false,
                None,
            );
            self.pop_history();
            self.pos.unmake_move(mv, info);

            if self.should_stop() {
                return None;
            }
            if score >= raised_beta {
                return Some(score);
            }
        }
        None
    }
}
