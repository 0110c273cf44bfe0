//! Make and unmake a move, maintaining occupancy and the Zobrist hash
//! incrementally.
//!
//! `UnmakeInfo` is the per-move rollback record: search keeps one on its own
//! stack per ply rather than cloning the whole position, which is the
//! expensive "naive" path this spec explicitly calls out as unsuitable for
//! the hot search loop (cloning is still used by the convenience
//! [`Position::legal_moves`] helper and by workers copying the root
//! position once per search).

use crate::types::{
    CastlingRights, Color, Piece, Square, BLACK_KINGSIDE, BLACK_QUEENSIDE, WHITE_KINGSIDE,
    WHITE_QUEENSIDE,
};
use crate::zobrist;

use super::Position;

/// Rollback record captured on `make_move`, consumed by `unmake_move`.
#[derive(Clone, Copy)]
pub struct UnmakeInfo {
    captured: Option<(Color, Piece)>,
    prev_en_passant: Option<Square>,
    prev_castling: CastlingRights,
    prev_halfmove_clock: u16,
    prev_hash: u64,
}

fn castling_bit_for_rook_square(sq: Square) -> Option<u8> {
    match sq.index() {
        0 => Some(WHITE_QUEENSIDE),  // a1
        7 => Some(WHITE_KINGSIDE),   // h1
        56 => Some(BLACK_QUEENSIDE), // a8
        63 => Some(BLACK_KINGSIDE),  // h8
        _ => None,
    }
}

pub(super) fn make_move(pos: &mut Position, mv: crate::types::Move) -> UnmakeInfo {
    let from = mv.from();
    let to = mv.to();
    let mover = pos.side_to_move;
    let (_, moving_piece) = pos
        .piece_at(from)
        .expect("make_move called with no piece on the from-square");

    let prev_en_passant = pos.en_passant;
    let prev_castling = pos.castling;
    let prev_halfmove_clock = pos.halfmove_clock;
    let prev_hash = pos.hash;

    // En passant: a pawn moving to the en-passant target captures the pawn
    // one rank behind the destination, not on the destination itself.
    let is_en_passant = moving_piece == Piece::Pawn && Some(to) == prev_en_passant;
    let captured = if is_en_passant {
        let captured_sq = ep_victim_square(to, mover);
        Some((!mover, Piece::Pawn))
    } else {
        pos.piece_at(to)
    };
    let _ = &captured; // silence unused warning when is_en_passant branch below shadows

    // Remove the moving piece from its origin.
    pos.pieces[mover.index()][moving_piece.index()].clear(from);
    pos.hash ^= zobrist::piece_key(mover, moving_piece, from);

    // Remove any captured piece.
    if is_en_passant {
        let captured_sq = ep_victim_square(to, mover);
        pos.pieces[(!mover).index()][Piece::Pawn.index()].clear(captured_sq);
        pos.hash ^= zobrist::piece_key(!mover, Piece::Pawn, captured_sq);
    } else if let Some((victim_color, victim_piece)) = captured {
        pos.pieces[victim_color.index()][victim_piece.index()].clear(to);
        pos.hash ^= zobrist::piece_key(victim_color, victim_piece, to);
        if let Some(bit) = castling_bit_for_rook_square(to) {
            if pos.castling.has(bit) {
                pos.castling.clear(bit);
            }
        }
    }

    // Place the moving (or promoted) piece at the destination.
    let placed_piece = mv.promotion().unwrap_or(moving_piece);
    pos.pieces[mover.index()][placed_piece.index()].set(to);
    pos.hash ^= zobrist::piece_key(mover, placed_piece, to);

    // Castling: a king moving two files drags its rook along.
    let is_castle_kingside = moving_piece == Piece::King && to.index() as i32 - from.index() as i32 == 2;
    let is_castle_queenside =
        moving_piece == Piece::King && from.index() as i32 - to.index() as i32 == 2;
    if is_castle_kingside || is_castle_queenside {
        let rank = from.rank();
        let (rook_from, rook_to) = if is_castle_kingside {
            (
                Square::from_file_rank(7, rank),
                Square::from_file_rank(5, rank),
            )
        } else {
            (
                Square::from_file_rank(0, rank),
                Square::from_file_rank(3, rank),
            )
        };
        pos.pieces[mover.index()][Piece::Rook.index()].clear(rook_from);
        pos.hash ^= zobrist::piece_key(mover, Piece::Rook, rook_from);
        pos.pieces[mover.index()][Piece::Rook.index()].set(rook_to);
        pos.hash ^= zobrist::piece_key(mover, Piece::Rook, rook_to);
    }

    // Castling rights: king move clears both of the mover's rights; rook
    // move clears its own side's right.
    if moving_piece == Piece::King {
        let (k, q) = if mover == Color::White {
            (WHITE_KINGSIDE, WHITE_QUEENSIDE)
        } else {
            (BLACK_KINGSIDE, BLACK_QUEENSIDE)
        };
        pos.castling.clear(k);
        pos.castling.clear(q);
    } else if moving_piece == Piece::Rook {
        if let Some(bit) = castling_bit_for_rook_square(from) {
            pos.castling.clear(bit);
        }
    }

    // En-passant target: set only on a pawn double push.
    let is_double_push =
        moving_piece == Piece::Pawn && (to.rank() as i32 - from.rank() as i32).abs() == 2;
    pos.en_passant = if is_double_push {
        Some(Square::from_file_rank(
            from.file(),
            (from.rank() + to.rank()) / 2,
        ))
    } else {
        None
    };

    // Half-move clock: reset on pawn move or capture, else increment.
    let is_capture = captured.is_some() || is_en_passant;
    pos.halfmove_clock = if moving_piece == Piece::Pawn || is_capture {
        0
    } else {
        pos.halfmove_clock + 1
    };

    if mover == Color::Black {
        pos.fullmove_number += 1;
    }

    pos.side_to_move = !mover;

    // Hash components that don't depend on piece placement.
    pos.hash ^= zobrist::castling_key(prev_castling.bits());
    pos.hash ^= zobrist::castling_key(pos.castling.bits());
    if let Some(ep) = prev_en_passant {
        pos.hash ^= zobrist::en_passant_key(ep.file());
    }
    if let Some(ep) = pos.en_passant {
        pos.hash ^= zobrist::en_passant_key(ep.file());
    }
    pos.hash ^= zobrist::side_to_move_key();

    pos.recompute_occupancy();

    debug_assert_eq!(
        pos.hash,
        pos.recompute_hash(),
        "zobrist hash diverged from recomputation after make_move({mv:?})"
    );

    UnmakeInfo {
        captured: if is_en_passant {
            Some((!mover, Piece::Pawn))
        } else {
            captured
        },
        prev_en_passant,
        prev_castling,
        prev_halfmove_clock,
        prev_hash,
    }
}

pub(super) fn unmake_move(pos: &mut Position, mv: crate::types::Move, info: UnmakeInfo) {
    let from = mv.from();
    let to = mv.to();
    let mover = !pos.side_to_move; // side to move was flipped by make_move
    let placed_piece = pos
        .piece_at(to)
        .map(|(_, p)| p)
        .expect("unmake_move: destination square is empty");
    let moving_piece = if mv.is_promotion() {
        Piece::Pawn
    } else {
        placed_piece
    };

    pos.pieces[mover.index()][placed_piece.index()].clear(to);
    pos.pieces[mover.index()][moving_piece.index()].set(from);

    let is_en_passant = moving_piece == Piece::Pawn && Some(to) == info.prev_en_passant;

    if is_en_passant {
        let captured_sq = ep_victim_square(to, mover);
        pos.pieces[(!mover).index()][Piece::Pawn.index()].set(captured_sq);
    } else if let Some((victim_color, victim_piece)) = info.captured {
        pos.pieces[victim_color.index()][victim_piece.index()].set(to);
    }

    let is_castle_kingside = moving_piece == Piece::King && to.index() as i32 - from.index() as i32 == 2;
    let is_castle_queenside =
        moving_piece == Piece::King && from.index() as i32 - to.index() as i32 == 2;
    if is_castle_kingside || is_castle_queenside {
        let rank = from.rank();
        let (rook_from, rook_to) = if is_castle_kingside {
            (
                Square::from_file_rank(7, rank),
                Square::from_file_rank(5, rank),
            )
        } else {
            (
                Square::from_file_rank(0, rank),
                Square::from_file_rank(3, rank),
            )
        };
        pos.pieces[mover.index()][Piece::Rook.index()].clear(rook_to);
        pos.pieces[mover.index()][Piece::Rook.index()].set(rook_from);
    }

    if mover == Color::Black && pos.side_to_move == Color::White {
        pos.fullmove_number -= 1;
    }

    pos.side_to_move = mover;
    pos.en_passant = info.prev_en_passant;
    pos.castling = info.prev_castling;
    pos.halfmove_clock = info.prev_halfmove_clock;
    pos.hash = info.prev_hash;

    pos.recompute_occupancy();
}

#[inline]
fn ep_victim_square(to: Square, mover: Color) -> Square {
    match mover {
        Color::White => Square::from_file_rank(to.file(), to.rank() - 1),
        Color::Black => Square::from_file_rank(to.file(), to.rank() + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::super::Position;
    use crate::types::{Move, Square};

    #[test]
    fn make_unmake_restores_exact_state() {
        let mut pos = Position::startpos();
        let before_hash = pos.hash;
        let before_fen = pos.to_fen();
        let e2 = Square::from_algebraic("e2").unwrap();
        let e4 = Square::from_algebraic("e4").unwrap();
        let mv = Move::new(e2, e4);
        let info = pos.make_move(mv);
        assert_ne!(pos.hash, before_hash);
        pos.unmake_move(mv, info);
        assert_eq!(pos.hash, before_hash);
        assert_eq!(pos.to_fen(), before_fen);
    }

    #[test]
    fn en_passant_capture_removes_correct_pawn() {
        let mut pos =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
                .unwrap();
        let e5 = Square::from_algebraic("e5").unwrap();
        let d6 = Square::from_algebraic("d6").unwrap();
        let d5 = Square::from_algebraic("d5").unwrap();
        let mv = Move::new(e5, d6);
        pos.make_move(mv);
        assert!(pos.piece_at(d5).is_none());
        assert!(pos.piece_at(d6).is_some());
    }

    #[test]
    fn castling_moves_both_king_and_rook() {
        let mut pos =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let e1 = Square::from_algebraic("e1").unwrap();
        let g1 = Square::from_algebraic("g1").unwrap();
        let f1 = Square::from_algebraic("f1").unwrap();
        let h1 = Square::from_algebraic("h1").unwrap();
        let mv = Move::new(e1, g1);
        let info = pos.make_move(mv);
        assert!(pos.piece_at(f1).is_some());
        assert!(pos.piece_at(h1).is_none());
        pos.unmake_move(mv, info);
        assert!(pos.piece_at(h1).is_some());
        assert!(pos.piece_at(e1).is_some());
    }
}
