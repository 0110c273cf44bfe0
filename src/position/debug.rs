//! Debug-only invariant checks. Compiled out of release builds; called from
//! `debug_assert!` sites in `make_unmake` and from the round-trip tests.

use crate::types::{Color, Piece};

use super::Position;

impl Position {
    /// Occupancy bitboards agree with the twelve piece bitboards, the
    /// bitboards are pairwise disjoint, exactly one king per color exists,
    /// and the Zobrist hash matches a fresh recomputation.
    #[must_use]
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut white = crate::types::EMPTY;
        let mut black = crate::types::EMPTY;
        let mut seen = crate::types::EMPTY;

        for color in [Color::White, Color::Black] {
            for piece_idx in 0..6 {
                let piece = Piece::from_index(piece_idx);
                let bb = self.piece_bb(color, piece);
                if !(bb & seen).is_empty() {
                    return Err(format!(
                        "piece bitboards overlap at {:?}",
                        (bb & seen).lsb()
                    ));
                }
                seen |= bb;
                match color {
                    Color::White => white |= bb,
                    Color::Black => black |= bb,
                }
            }
        }

        if white | black != self.occupancy() {
            return Err("occupancy[All] does not equal the union of piece bitboards".into());
        }
        if !(white & black).is_empty() {
            return Err("white and black occupancy overlap".into());
        }
        if white != self.color_occupancy(Color::White) {
            return Err("occupancy[White] does not match piece bitboards".into());
        }
        if black != self.color_occupancy(Color::Black) {
            return Err("occupancy[Black] does not match piece bitboards".into());
        }

        for color in [Color::White, Color::Black] {
            let kings = self.piece_bb(color, Piece::King).popcount();
            if kings != 1 {
                return Err(format!("{color:?} has {kings} kings, expected exactly 1"));
            }
        }

        if self.hash() != self.recompute_hash() {
            return Err("zobrist hash diverged from recomputation".into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_satisfies_invariants() {
        assert!(Position::startpos().check_invariants().is_ok());
    }

    #[test]
    fn invariants_hold_after_a_sequence_of_moves() {
        let mut pos = Position::startpos();
        for uci in ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5"] {
            let mv = super::super::movegen::parse_uci_move(&pos, uci).unwrap();
            pos.make_move(mv);
            assert!(pos.check_invariants().is_ok(), "after {uci}");
        }
    }
}
