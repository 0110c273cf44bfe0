//! Magic bitboards for rook and bishop slider attacks.
//!
//! For each square, a relevant-occupancy mask is intersected with the actual
//! board occupancy, multiplied by a 64-bit magic constant, and shifted down
//! to index a precomputed attack table: `(occupancy & mask) * magic >> shift`.
//! Queen attacks are the union of rook and bishop attacks from the same
//! square.
//!
//! The magic constants are found at process startup by randomized search
//! rather than hardcoded, so the validity test — no two distinct relevant
//! occupancies may collide to the same index unless they share an attack set
//! — doubles as self-verification of the search itself (see `find_magic`).

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{Bitboard, Square};

use super::rays::{
    bishop_attacks_slow, bishop_relevant_mask, rook_attacks_slow, rook_relevant_mask, subsets,
};

struct MagicEntry {
    mask: Bitboard,
    magic: u64,
    shift: u32,
    offset: usize,
}

struct MagicTable {
    entries: [MagicEntry; 64],
    attacks: Vec<Bitboard>,
}

fn build_table(is_rook: bool) -> MagicTable {
    let mut entries: Vec<MagicEntry> = Vec::with_capacity(64);
    let mut attacks: Vec<Bitboard> = Vec::new();

    // Fixed seed: the table must be identical across runs and workers, since
    // all search threads share the same attack tables.
    let mut rng = StdRng::seed_from_u64(if is_rook { 0x900C_1234 } else { 0xB15C_5678 });

    for sq in 0..64u8 {
        let square = Square::new(sq);
        let mask = if is_rook {
            rook_relevant_mask(square)
        } else {
            bishop_relevant_mask(square)
        };
        let bits = mask.popcount();
        let shift = 64 - bits;
        let occupancies = subsets(mask);
        let reference: Vec<Bitboard> = occupancies
            .iter()
            .map(|&occ| {
                if is_rook {
                    rook_attacks_slow(square, occ)
                } else {
                    bishop_attacks_slow(square, occ)
                }
            })
            .collect();

        let magic = find_magic(&occupancies, &reference, shift, &mut rng);

        let offset = attacks.len();
        let table_size = 1usize << bits;
        let mut slot = vec![Bitboard(0); table_size];
        for (occ, &att) in occupancies.iter().zip(reference.iter()) {
            let index = magic_index(occ.0, magic, shift);
            slot[index] = att;
        }
        attacks.extend(slot);

        entries.push(MagicEntry {
            mask,
            magic,
            shift,
            offset,
        });
    }

    MagicTable {
        entries: entries
            .try_into()
            .unwrap_or_else(|_| unreachable!("exactly 64 squares")),
        attacks,
    }
}

#[inline]
fn magic_index(occupancy: u64, magic: u64, shift: u32) -> usize {
    ((occupancy.wrapping_mul(magic)) >> shift) as usize
}

/// Randomized search for a magic constant with no index collisions among
/// occupancies that map to *different* attack sets. Sparse random numbers
/// (ANDing several random u64s together) are heavily biased toward having
/// few set bits, which empirically yields fewer multiply collisions than a
/// uniform random u64.
fn find_magic(occupancies: &[Bitboard], reference: &[Bitboard], shift: u32, rng: &mut StdRng) -> u64 {
    let table_size = 1usize << (64 - shift);
    let mut used = vec![None; table_size];

    loop {
        let candidate = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
        if candidate == 0 {
            continue;
        }

        used.iter_mut().for_each(|slot| *slot = None);
        let mut valid = true;
        for (occ, &att) in occupancies.iter().zip(reference.iter()) {
            let index = magic_index(occ.0, candidate, shift);
            match used[index] {
                None => used[index] = Some(att),
                Some(existing) if existing == att => {}
                Some(_) => {
                    valid = false;
                    break;
                }
            }
        }

        if valid {
            return candidate;
        }
    }
}

static ROOK_TABLE: Lazy<MagicTable> = Lazy::new(|| build_table(true));
static BISHOP_TABLE: Lazy<MagicTable> = Lazy::new(|| build_table(false));

#[inline]
#[must_use]
pub fn rook_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    let entry = &ROOK_TABLE.entries[sq.index()];
    let blockers = occupancy & entry.mask;
    let index = magic_index(blockers.0, entry.magic, entry.shift);
    ROOK_TABLE.attacks[entry.offset + index]
}

#[inline]
#[must_use]
pub fn bishop_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    let entry = &BISHOP_TABLE.entries[sq.index()];
    let blockers = occupancy & entry.mask;
    let index = magic_index(blockers.0, entry.magic, entry.shift);
    BISHOP_TABLE.attacks[entry.offset + index]
}

#[inline]
#[must_use]
pub fn queen_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    rook_attacks(sq, occupancy) | bishop_attacks(sq, occupancy)
}

/// Force both magic tables to build. Called from [`crate::init`] so that the
/// (one-time, sub-second) randomized search happens predictably at startup
/// rather than lazily on the first search node.
pub fn init() {
    Lazy::force(&ROOK_TABLE);
    Lazy::force(&BISHOP_TABLE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rook_on_empty_board_attacks_whole_rank_and_file() {
        let d4 = Square::from_algebraic("d4").unwrap();
        let attacks = rook_attacks(d4, Bitboard(0));
        assert_eq!(attacks.popcount(), 14);
    }

    #[test]
    fn bishop_on_empty_board_attacks_both_diagonals() {
        let d4 = Square::from_algebraic("d4").unwrap();
        let attacks = bishop_attacks(d4, Bitboard(0));
        assert_eq!(attacks.popcount(), 13);
    }

    #[test]
    fn rook_attacks_stop_at_first_blocker() {
        let a1 = Square::from_algebraic("a1").unwrap();
        let a4 = Square::from_algebraic("a4").unwrap();
        let occ = Bitboard::from_square(a4);
        let attacks = rook_attacks(a1, occ);
        // a2, a3, a4 on the file, plus the full first rank.
        assert!(attacks.contains(a4));
        assert!(!attacks.contains(Square::from_algebraic("a5").unwrap()));
        assert!(attacks.contains(Square::from_algebraic("h1").unwrap()));
    }

    #[test]
    fn magic_table_matches_ray_tracer_for_random_occupancies() {
        use rand::RngCore;
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2000 {
            let occ = Bitboard(rng.next_u64());
            for sq in 0..64u8 {
                let square = Square::new(sq);
                assert_eq!(rook_attacks(square, occ), rook_attacks_slow(square, occ));
                assert_eq!(bishop_attacks(square, occ), bishop_attacks_slow(square, occ));
            }
        }
    }
}
