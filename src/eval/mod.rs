//! Static evaluation: material, piece-square tables, mobility, king safety,
//! and pawn structure, tapered between middlegame and endgame terms by game
//! phase. Side-to-move relative: positive means the side to move stands
//! better.
//!
//! This module is the hand-crafted fallback. The search never calls it
//! directly — it goes through [`PositionEvaluator`], which dispatches to an
//! NNUE network when one is loaded (see [`crate::nnue`]) and falls back to
//! [`ClassicalEvaluator`] otherwise.

mod king_safety;
mod mobility;
mod pawns;
mod pst;

use crate::position::Position;
use crate::types::{Color, Piece};

/// Total phase weight at the start of the game (4 knights + 4 bishops + 4
/// rooks + 2 queens, weighted). Used to interpolate between middlegame and
/// endgame piece-square tables and term weights.
const PHASE_TOTAL: i32 = 24;

const fn phase_weight(piece: Piece) -> i32 {
    match piece {
        Piece::Knight | Piece::Bishop => 1,
        Piece::Rook => 2,
        Piece::Queen => 4,
        Piece::Pawn | Piece::King => 0,
    }
}

const BISHOP_PAIR_BONUS: i32 = 30;
const ROOK_OPEN_FILE_BONUS: i32 = 20;
const ROOK_SEMI_OPEN_FILE_BONUS: i32 = 10;
const TEMPO_BONUS: i32 = 12;

/// Anything that can score a position from the side-to-move's perspective.
/// The search core holds one behind a trait object so it never needs to
/// know whether it is talking to the hand-crafted evaluator or a loaded
/// NNUE network.
pub trait PositionEvaluator: Send + Sync {
    fn evaluate(&self, pos: &Position) -> i32;
}

/// The material + piece-square + mobility + king-safety + pawn-structure
/// evaluator described in the design. Always available; used whenever no
/// NNUE network has been loaded.
#[derive(Default)]
pub struct ClassicalEvaluator;

impl PositionEvaluator for ClassicalEvaluator {
    fn evaluate(&self, pos: &Position) -> i32 {
        evaluate(pos)
    }
}

/// Game phase in `[0, PHASE_TOTAL]`: 0 is a bare-kings endgame, `PHASE_TOTAL`
/// is the full middlegame material count.
fn game_phase(pos: &Position) -> i32 {
    let mut phase = 0;
    for color in [Color::White, Color::Black] {
        for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
            phase += pos.piece_bb(color, piece).popcount() as i32 * phase_weight(piece);
        }
    }
    phase.min(PHASE_TOTAL)
}

#[must_use]
pub fn evaluate(pos: &Position) -> i32 {
    let mut mg = 0i32;
    let mut eg = 0i32;

    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        for piece_idx in 0..6 {
            let piece = Piece::from_index(piece_idx);
            let mut bb = pos.piece_bb(color, piece);
            while let Some(sq) = bb.pop_lsb() {
                let (pst_mg, pst_eg) = pst::piece_square_bonus(color, piece, sq);
                mg += sign * (piece.value() + pst_mg);
                eg += sign * (piece.value() + pst_eg);
            }
        }

        let bishops = pos.piece_bb(color, Piece::Bishop).popcount();
        if bishops >= 2 {
            mg += sign * BISHOP_PAIR_BONUS;
            eg += sign * BISHOP_PAIR_BONUS;
        }

        let (rook_mg, rook_eg) = mobility::rook_file_bonus(pos, color);
        mg += sign * rook_mg;
        eg += sign * rook_eg;
    }

    let (mob_mg, mob_eg) = mobility::mobility_score(pos);
    mg += mob_mg;
    eg += mob_eg;

    let (king_mg, king_eg) = king_safety::king_safety_score(pos);
    mg += king_mg;
    eg += king_eg;

    let (pawn_mg, pawn_eg) = pawns::pawn_structure_score(pos);
    mg += pawn_mg;
    eg += pawn_eg;

    let phase = game_phase(pos);
    let tapered = (mg * phase + eg * (PHASE_TOTAL - phase)) / PHASE_TOTAL;

    let white_relative = tapered + TEMPO_BONUS * if pos.side_to_move() == Color::White { 1 } else { -1 };

    match pos.side_to_move() {
        Color::White => white_relative,
        Color::Black => -white_relative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn startpos_is_roughly_balanced() {
        let pos = Position::startpos();
        assert!(evaluate(&pos).abs() < 50);
    }

    #[test]
    fn missing_a_queen_is_heavily_negative() {
        let pos = Position::from_fen(
            "rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        )
        .unwrap();
        assert!(evaluate(&pos) < -700);
    }
}
