//! Bitboard position representation: the twelve piece bitboards, occupancy,
//! side to move, castling rights, en-passant target, move clocks, and the
//! incrementally maintained Zobrist hash.

mod debug;
mod fen;
mod make_unmake;
mod movegen;
mod perft;
mod see;

pub use fen::FenError;
pub use make_unmake::UnmakeInfo;
pub use movegen::{parse_uci_move, MoveParseError};
pub use perft::{perft, perft_divide};

use crate::attacks::{king_attacks, knight_attacks, magic, pawn_attacks};
use crate::types::{Bitboard, CastlingRights, Color, Move, MoveList, Piece, Square, EMPTY};
use crate::zobrist;

/// A legal chess position.
///
/// Cloned once per search worker; never shared mutably across threads. The
/// invariant `occupancy[White] | occupancy[Black] == occupancy[All]`, and the
/// twelve piece bitboards are pairwise disjoint, holds after every public
/// method returns (checked in debug builds, see [`debug`]).
#[derive(Clone)]
pub struct Position {
    /// `pieces[color][piece_kind]`
    pieces: [[Bitboard; 6]; 2],
    occupancy: [Bitboard; 3],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u16,
    fullmove_number: u32,
    hash: u64,
}

const WHITE: usize = Color::White.index();
const BLACK: usize = Color::Black.index();
const ALL: usize = 2;

impl Position {
    #[must_use]
    pub fn startpos() -> Self {
        Self::from_fen(STARTPOS_FEN).expect("startpos FEN is well-formed")
    }

    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[must_use]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant
    }

    #[must_use]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[must_use]
    pub fn occupancy(&self) -> Bitboard {
        self.occupancy[ALL]
    }

    #[must_use]
    pub fn color_occupancy(&self, color: Color) -> Bitboard {
        self.occupancy[color.index()]
    }

    #[must_use]
    pub fn piece_bb(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        for color in [Color::White, Color::Black] {
            for piece_idx in 0..6 {
                let piece = Piece::from_index(piece_idx);
                if self.pieces[color.index()][piece_idx].contains(sq) {
                    return Some((color, piece));
                }
            }
        }
        None
    }

    #[must_use]
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces[color.index()][Piece::King.index()].lsb()
    }

    /// Does `attacker` have any piece attacking `sq` given the current
    /// occupancy? Shared by the legality filter, check detection, and SEE.
    #[must_use]
    pub fn is_square_attacked(&self, sq: Square, attacker: Color) -> bool {
        let occ = self.occupancy[ALL];
        let idx = attacker.index();

        if (knight_attacks(sq) & self.pieces[idx][Piece::Knight.index()]).0 != 0 {
            return true;
        }
        if (king_attacks(sq) & self.pieces[idx][Piece::King.index()]).0 != 0 {
            return true;
        }
        // Attacks *from* sq by the defender's pawn type mirror attacks *to*
        // sq by the attacker's pawns.
        if (pawn_attacks_to(sq, attacker) & self.pieces[idx][Piece::Pawn.index()]).0 != 0 {
            return true;
        }
        let rook_like = self.pieces[idx][Piece::Rook.index()] | self.pieces[idx][Piece::Queen.index()];
        let bishop_like =
            self.pieces[idx][Piece::Bishop.index()] | self.pieces[idx][Piece::Queen.index()];
        if (magic::rook_attacks(sq, occ) & rook_like).0 != 0 {
            return true;
        }
        if (magic::bishop_attacks(sq, occ) & bishop_like).0 != 0 {
            return true;
        }
        false
    }

    #[must_use]
    pub fn is_in_check(&self, color: Color) -> bool {
        self.is_square_attacked(self.king_square(color), !color)
    }

    #[must_use]
    pub fn generate_moves(&self) -> MoveList {
        movegen::generate_pseudo_legal(self, false)
    }

    #[must_use]
    pub fn generate_captures(&self) -> MoveList {
        movegen::generate_pseudo_legal(self, true)
    }

    /// Legal moves: pseudo-legal moves filtered by "does my king survive".
    #[must_use]
    pub fn legal_moves(&self) -> MoveList {
        let pseudo = self.generate_moves();
        let mut legal = MoveList::new();
        let mover = self.side_to_move;
        for &mv in &pseudo {
            let mut copy = self.clone();
            let info = copy.make_move(mv);
            if !copy.is_in_check(mover) {
                legal.push(mv);
            }
            let _ = info;
        }
        legal
    }

    /// Fast legality check for a single move without allocating a full move
    /// list — used by PV extraction against a possibly-stale TT move.
    #[must_use]
    pub fn is_legal_move(&self, mv: Move) -> bool {
        self.generate_moves().contains(mv) && {
            let mut copy = self.clone();
            let mover = self.side_to_move;
            copy.make_move(mv);
            !copy.is_in_check(mover)
        }
    }

    #[must_use]
    pub fn make_move(&mut self, mv: Move) -> UnmakeInfo {
        make_unmake::make_move(self, mv)
    }

    pub fn unmake_move(&mut self, mv: Move, info: UnmakeInfo) {
        make_unmake::unmake_move(self, mv, info);
    }

    /// Make a null move (pass): flips side to move and clears en passant,
    /// without moving any piece. Used by null-move pruning.
    #[must_use]
    pub fn make_null_move(&mut self) -> NullMoveInfo {
        let info = NullMoveInfo {
            en_passant: self.en_passant,
            hash: self.hash,
        };
        if let Some(ep) = self.en_passant.take() {
            self.hash ^= zobrist::en_passant_key(ep.file());
        }
        self.side_to_move = !self.side_to_move;
        self.hash ^= zobrist::side_to_move_key();
        info
    }

    pub fn unmake_null_move(&mut self, info: NullMoveInfo) {
        self.side_to_move = !self.side_to_move;
        self.en_passant = info.en_passant;
        self.hash = info.hash;
    }

    /// Recompute the Zobrist hash from scratch; used by debug assertions and
    /// FEN loading.
    #[must_use]
    pub fn recompute_hash(&self) -> u64 {
        let mut hash = 0u64;
        for color in [Color::White, Color::Black] {
            for piece_idx in 0..6 {
                let piece = Piece::from_index(piece_idx);
                let mut bb = self.pieces[color.index()][piece_idx];
                while let Some(sq) = bb.pop_lsb() {
                    hash ^= zobrist::piece_key(color, piece, sq);
                }
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= zobrist::side_to_move_key();
        }
        hash ^= zobrist::castling_key(self.castling.bits());
        if let Some(ep) = self.en_passant {
            hash ^= zobrist::en_passant_key(ep.file());
        }
        hash
    }

    /// Non-pawn material for `color`, used for phase interpolation and as a
    /// null-move-pruning safety gate (never null-move in a pure pawn ending).
    #[must_use]
    pub fn non_pawn_material(&self, color: Color) -> i32 {
        let idx = color.index();
        self.pieces[idx][Piece::Knight.index()].popcount() as i32 * Piece::Knight.value()
            + self.pieces[idx][Piece::Bishop.index()].popcount() as i32 * Piece::Bishop.value()
            + self.pieces[idx][Piece::Rook.index()].popcount() as i32 * Piece::Rook.value()
            + self.pieces[idx][Piece::Queen.index()].popcount() as i32 * Piece::Queen.value()
    }

    fn recompute_occupancy(&mut self) {
        let mut white = EMPTY;
        let mut black = EMPTY;
        for piece_idx in 0..6 {
            white |= self.pieces[WHITE][piece_idx];
            black |= self.pieces[BLACK][piece_idx];
        }
        self.occupancy[WHITE] = white;
        self.occupancy[BLACK] = black;
        self.occupancy[ALL] = white | black;
    }
}

#[inline]
fn pawn_attacks_to(sq: Square, pawn_color: Color) -> Bitboard {
    // A pawn of `pawn_color` attacking `sq` stands on one of the squares that
    // `sq` would attack if it itself held a pawn of the opposite color.
    pawn_attacks(Bitboard::from_square(sq), !pawn_color)
}

/// Record used to restore a null move.
#[derive(Clone, Copy)]
pub struct NullMoveInfo {
    en_passant: Option<Square>,
    hash: u64,
}

pub(crate) const STARTPOS_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_has_twenty_legal_moves() {
        let pos = Position::startpos();
        assert_eq!(pos.legal_moves().len(), 20);
    }

    #[test]
    fn startpos_occupancy_invariant_holds() {
        let pos = Position::startpos();
        assert_eq!(
            pos.occupancy[WHITE] | pos.occupancy[BLACK],
            pos.occupancy[ALL]
        );
        assert!((pos.occupancy[WHITE] & pos.occupancy[BLACK]).is_empty());
    }

    #[test]
    fn startpos_hash_matches_recomputation() {
        let pos = Position::startpos();
        assert_eq!(pos.hash, pos.recompute_hash());
    }
}
