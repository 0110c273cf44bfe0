//! Mobility and rook-file terms.

use crate::attacks::{king_attacks, knight_attacks, magic};
use crate::position::Position;
use crate::types::{Bitboard, Color, Piece, FILE_A};

use super::{ROOK_OPEN_FILE_BONUS, ROOK_SEMI_OPEN_FILE_BONUS};

/// Per-piece-class mobility weight: small, since mobility is a tiebreaker
/// next to material and piece-square placement, not a dominant term.
const MOBILITY_WEIGHT_MG: [i32; 6] = [0, 4, 4, 2, 1, 0];
const MOBILITY_WEIGHT_EG: [i32; 6] = [0, 3, 3, 3, 2, 0];

fn file_mask(file: u8) -> Bitboard {
    FILE_A << (file as u32)
}

/// Count of pseudo-legal destination squares per piece class, summed and
/// weighted, returned as the white-minus-black difference.
pub(super) fn mobility_score(pos: &Position) -> (i32, i32) {
    let mut mg = 0i32;
    let mut eg = 0i32;
    let occ = pos.occupancy();

    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        let own = pos.color_occupancy(color);

        let mut knights = pos.piece_bb(color, Piece::Knight);
        while let Some(sq) = knights.pop_lsb() {
            let count = (knight_attacks(sq) & !own).popcount() as i32;
            mg += sign * count * MOBILITY_WEIGHT_MG[Piece::Knight.index()];
            eg += sign * count * MOBILITY_WEIGHT_EG[Piece::Knight.index()];
        }

        let mut bishops = pos.piece_bb(color, Piece::Bishop);
        while let Some(sq) = bishops.pop_lsb() {
            let count = (magic::bishop_attacks(sq, occ) & !own).popcount() as i32;
            mg += sign * count * MOBILITY_WEIGHT_MG[Piece::Bishop.index()];
            eg += sign * count * MOBILITY_WEIGHT_EG[Piece::Bishop.index()];
        }

        let mut rooks = pos.piece_bb(color, Piece::Rook);
        while let Some(sq) = rooks.pop_lsb() {
            let count = (magic::rook_attacks(sq, occ) & !own).popcount() as i32;
            mg += sign * count * MOBILITY_WEIGHT_MG[Piece::Rook.index()];
            eg += sign * count * MOBILITY_WEIGHT_EG[Piece::Rook.index()];
        }

        let mut queens = pos.piece_bb(color, Piece::Queen);
        while let Some(sq) = queens.pop_lsb() {
            let count =
                ((magic::rook_attacks(sq, occ) | magic::bishop_attacks(sq, occ)) & !own).popcount() as i32;
            mg += sign * count * MOBILITY_WEIGHT_MG[Piece::Queen.index()];
            eg += sign * count * MOBILITY_WEIGHT_EG[Piece::Queen.index()];
        }

        let mut kings = pos.piece_bb(color, Piece::King);
        while let Some(sq) = kings.pop_lsb() {
            let count = (king_attacks(sq) & !own).popcount() as i32;
            mg += sign * count * MOBILITY_WEIGHT_MG[Piece::King.index()];
            eg += sign * count * MOBILITY_WEIGHT_EG[Piece::King.index()];
        }
    }

    (mg, eg)
}

/// Bonus for `color`'s rooks standing on an open (no pawns of either color)
/// or semi-open (no own pawns) file.
pub(super) fn rook_file_bonus(pos: &Position, color: Color) -> (i32, i32) {
    let own_pawns = pos.piece_bb(color, Piece::Pawn);
    let enemy_pawns = pos.piece_bb(!color, Piece::Pawn);
    let mut mg = 0;
    let mut eg = 0;

    let mut rooks = pos.piece_bb(color, Piece::Rook);
    while let Some(sq) = rooks.pop_lsb() {
        let file = file_mask(sq.file());
        let has_own_pawn = !(file & own_pawns).is_empty();
        let has_enemy_pawn = !(file & enemy_pawns).is_empty();
        if !has_own_pawn && !has_enemy_pawn {
            mg += ROOK_OPEN_FILE_BONUS;
            eg += ROOK_OPEN_FILE_BONUS;
        } else if !has_own_pawn {
            mg += ROOK_SEMI_OPEN_FILE_BONUS;
            eg += ROOK_SEMI_OPEN_FILE_BONUS;
        }
    }
    (mg, eg)
}
