//! Pawn push and capture generators.
//!
//! Pushes and captures are computed with bit shifts masked against file edges
//! and empty/enemy occupancy, rather than precomputed per-square tables —
//! pawns are the only piece whose attack set depends on side to move, so a
//! table would need to be doubled for no benefit over a shift.

use crate::types::{Bitboard, Color, Square, RANK_3, RANK_6};

#[inline]
#[must_use]
pub fn single_push_targets(pawns: Bitboard, empty: Bitboard, color: Color) -> Bitboard {
    match color {
        Color::White => pawns.shift_north() & empty,
        Color::Black => pawns.shift_south() & empty,
    }
}

/// Double pushes: single-push the pawns, keep only those landing on the
/// third/sixth rank, then push again.
#[inline]
#[must_use]
pub fn double_push_targets(pawns: Bitboard, empty: Bitboard, color: Color) -> Bitboard {
    match color {
        Color::White => {
            let single = single_push_targets(pawns, empty, color) & RANK_3;
            single.shift_north() & empty
        }
        Color::Black => {
            let single = single_push_targets(pawns, empty, color) & RANK_6;
            single.shift_south() & empty
        }
    }
}

#[inline]
#[must_use]
pub fn pawn_attacks(pawns: Bitboard, color: Color) -> Bitboard {
    match color {
        Color::White => pawns.shift_north_west() | pawns.shift_north_east(),
        Color::Black => pawns.shift_south_west() | pawns.shift_south_east(),
    }
}

/// Attack set of a single pawn, used by the legality checker and SEE.
#[inline]
#[must_use]
pub fn pawn_attacks_from(sq: Square, color: Color) -> Bitboard {
    pawn_attacks(Bitboard::from_square(sq), color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EMPTY, RANK_2};

    #[test]
    fn white_double_push_from_start_rank() {
        let targets = double_push_targets(RANK_2, !EMPTY, Color::White);
        assert_eq!(targets.popcount(), 8);
    }

    #[test]
    fn corner_pawn_has_single_attack() {
        let a2 = Square::from_algebraic("a2").unwrap();
        assert_eq!(pawn_attacks_from(a2, Color::White).popcount(), 1);
    }

    #[test]
    fn black_pawn_attacks_point_south() {
        let d7 = Square::from_algebraic("d7").unwrap();
        let attacks = pawn_attacks_from(d7, Color::Black);
        assert!(attacks.contains(Square::from_algebraic("c6").unwrap()));
        assert!(attacks.contains(Square::from_algebraic("e6").unwrap()));
    }
}
