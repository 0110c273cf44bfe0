//! Static exchange evaluation: the square-by-square swap-off used to decide
//! whether a capture sequence on one square nets material for the side that
//! starts it. Main search uses it to defer or skip bad captures; quiescence
//! uses it to prune losing ones outright.

use crate::attacks::{king_attacks, knight_attacks, magic, pawn_attacks};
use crate::types::{Bitboard, Color, Move, Piece, Square, EMPTY};

use super::Position;

/// Least valuable attacker of `sq` belonging to `side`, given bitboards
/// (which the caller mutates as the exchange progresses, so this must be
/// recomputed — not cached — after every simulated capture).
fn attackers_to(
    sq: Square,
    occ: Bitboard,
    pieces: &[[Bitboard; 6]; 2],
    side: Color,
) -> Bitboard {
    let idx = side.index();
    let mut attackers = EMPTY;

    attackers |= pawn_attacks_to(sq, side) & pieces[idx][Piece::Pawn.index()];
    attackers |= knight_attacks(sq) & pieces[idx][Piece::Knight.index()];
    attackers |= king_attacks(sq) & pieces[idx][Piece::King.index()];

    let bishop_like = pieces[idx][Piece::Bishop.index()] | pieces[idx][Piece::Queen.index()];
    attackers |= magic::bishop_attacks(sq, occ) & bishop_like;

    let rook_like = pieces[idx][Piece::Rook.index()] | pieces[idx][Piece::Queen.index()];
    attackers |= magic::rook_attacks(sq, occ) & rook_like;

    attackers
}

#[inline]
fn pawn_attacks_to(sq: Square, pawn_color: Color) -> Bitboard {
    pawn_attacks(Bitboard::from_square(sq), !pawn_color)
}

fn least_valuable_attacker(
    attackers: Bitboard,
    pieces: &[[Bitboard; 6]; 2],
    side: Color,
) -> Option<(Square, Piece)> {
    const ORDER: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];
    let idx = side.index();
    for &piece in &ORDER {
        let bb = attackers & pieces[idx][piece.index()];
        if !bb.is_empty() {
            return Some((bb.lsb(), piece));
        }
    }
    None
}

impl Position {
    /// Static exchange evaluation for a capture (or en-passant capture) at
    /// `mv`'s destination. Returns the net centipawn gain for the side
    /// making `mv` assuming both sides always recapture with their least
    /// valuable attacker. Non-captures return 0.
    #[must_use]
    pub fn see(&self, mv: Move) -> i32 {
        let from = mv.from();
        let to = mv.to();
        let us = self.side_to_move();
        let Some((_, mut attacking_piece)) = self.piece_at(from) else {
            return 0;
        };

        let is_en_passant = attacking_piece == Piece::Pawn && Some(to) == self.en_passant_square();
        let victim = if is_en_passant {
            Some(Piece::Pawn)
        } else {
            self.piece_at(to).map(|(_, p)| p)
        };
        let Some(victim_piece) = victim else {
            return 0;
        };

        let mut pieces: [[Bitboard; 6]; 2] = std::array::from_fn(|color| {
            std::array::from_fn(|piece| self.piece_bb(Color::from_index(color), Piece::from_index(piece)))
        });
        let mut occ = self.occupancy();

        let ep_victim_sq = if is_en_passant {
            Some(match us {
                Color::White => Square::from_file_rank(to.file(), to.rank() - 1),
                Color::Black => Square::from_file_rank(to.file(), to.rank() + 1),
            })
        } else {
            None
        };

        // Play the first capture.
        pieces[us.index()][attacking_piece.index()].clear(from);
        occ.clear(from);
        if let Some(ep_sq) = ep_victim_sq {
            pieces[(!us).index()][Piece::Pawn.index()].clear(ep_sq);
            occ.clear(ep_sq);
        } else {
            pieces[(!us).index()][victim_piece.index()].clear(to);
        }
        pieces[us.index()][attacking_piece.index()].set(to);
        occ.set(to);

        let mut gains = vec![victim_piece.value()];
        let mut side = !us;

        loop {
            let attackers = attackers_to(to, occ, &pieces, side);
            let Some((sq, piece)) = least_valuable_attacker(attackers, &pieces, side) else {
                break;
            };

            gains.push(attacking_piece.value() - gains[gains.len() - 1]);

            pieces[side.index()][piece.index()].clear(sq);
            occ.clear(sq);
            pieces[side.index()][piece.index()].set(to);
            occ.set(to);

            attacking_piece = piece;
            side = !side;
        }

        recompute_minimax(&mut gains);
        gains[0]
    }

    /// `true` if the capture `mv` does not lose material under [`see`].
    #[must_use]
    pub fn see_ge_zero(&self, mv: Move) -> bool {
        self.see(mv) >= 0
    }
}

fn recompute_minimax(gains: &mut [i32]) {
    for i in (0..gains.len().saturating_sub(1)).rev() {
        gains[i] = (-gains[i + 1]).max(gains[i]);
    }
}
