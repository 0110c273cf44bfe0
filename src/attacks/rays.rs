//! Ray-traced slider attacks.
//!
//! Used only to *build* the magic bitboard tables at startup (and by debug
//! assertions that cross-check the fast path). The search hot path never
//! calls these directly — see [`super::magic`].

use crate::types::{Bitboard, Square};

const ROOK_DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

fn ray_attacks(sq: Square, occupancy: Bitboard, dirs: &[(i32, i32); 4]) -> Bitboard {
    let file = sq.file() as i32;
    let rank = sq.rank() as i32;
    let mut attacks = Bitboard(0);
    for (df, dr) in dirs {
        let mut f = file + df;
        let mut r = rank + dr;
        while (0..8).contains(&f) && (0..8).contains(&r) {
            let target = Square::from_file_rank(f as u8, r as u8);
            attacks.set(target);
            if occupancy.contains(target) {
                break;
            }
            f += df;
            r += dr;
        }
    }
    attacks
}

pub(crate) fn rook_attacks_slow(sq: Square, occupancy: Bitboard) -> Bitboard {
    ray_attacks(sq, occupancy, &ROOK_DIRS)
}

pub(crate) fn bishop_attacks_slow(sq: Square, occupancy: Bitboard) -> Bitboard {
    ray_attacks(sq, occupancy, &BISHOP_DIRS)
}

/// Relevant-occupancy mask: the full ray, excluding the board edge square in
/// each direction (a blocker there can never be jumped, so whether it is
/// occupied doesn't change the attack set).
fn relevant_mask(sq: Square, dirs: &[(i32, i32); 4]) -> Bitboard {
    let file = sq.file() as i32;
    let rank = sq.rank() as i32;
    let mut mask = Bitboard(0);
    for (df, dr) in dirs {
        let mut f = file + df;
        let mut r = rank + dr;
        loop {
            let nf = f + df;
            let nr = r + dr;
            if !(0..8).contains(&f) || !(0..8).contains(&r) {
                break;
            }
            if !(0..8).contains(&nf) || !(0..8).contains(&nr) {
                break;
            }
            mask.set(Square::from_file_rank(f as u8, r as u8));
            f += df;
            r += dr;
        }
    }
    mask
}

pub(crate) fn rook_relevant_mask(sq: Square) -> Bitboard {
    relevant_mask(sq, &ROOK_DIRS)
}

pub(crate) fn bishop_relevant_mask(sq: Square) -> Bitboard {
    relevant_mask(sq, &BISHOP_DIRS)
}

/// Enumerate every occupancy subset of `mask` (there are `2^popcount` of them),
/// using the standard "carry-rippler" trick.
pub(crate) fn subsets(mask: Bitboard) -> Vec<Bitboard> {
    let mut result = Vec::with_capacity(1 << mask.popcount());
    let mut subset = Bitboard(0);
    loop {
        result.push(subset);
        subset = Bitboard(subset.0.wrapping_sub(mask.0) & mask.0);
        if subset.0 == 0 {
            break;
        }
    }
    result
}
