//! Zobrist hashing.
//!
//! A 64-bit hash is built by XORing random values keyed by (piece kind,
//! color, square), side to move, castling rights, and en-passant file. The
//! position maintains its hash incrementally across make/unmake rather than
//! recomputing it, but [`crate::position::Position::recompute_hash`] exists
//! to cross-check the incremental value in debug builds.

use std::sync::LazyLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{Color, Piece, Square};

struct ZobristKeys {
    piece_square: [[[u64; 64]; 6]; 2],
    side_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

fn build_keys() -> ZobristKeys {
    // Fixed seed so the hash space is reproducible across processes sharing
    // a transposition table dump, and identical across worker threads.
    let mut rng = StdRng::seed_from_u64(0x5EED_F00D_C0DE);

    let mut piece_square = [[[0u64; 64]; 6]; 2];
    for color in &mut piece_square {
        for piece in color.iter_mut() {
            for key in piece.iter_mut() {
                *key = rng.gen();
            }
        }
    }

    let side_to_move = rng.gen();

    let mut castling = [0u64; 16];
    for key in &mut castling {
        *key = rng.gen();
    }

    let mut en_passant_file = [0u64; 8];
    for key in &mut en_passant_file {
        *key = rng.gen();
    }

    ZobristKeys {
        piece_square,
        side_to_move,
        castling,
        en_passant_file,
    }
}

static KEYS: LazyLock<ZobristKeys> = LazyLock::new(build_keys);

#[inline]
#[must_use]
pub(crate) fn piece_key(color: Color, piece: Piece, sq: Square) -> u64 {
    KEYS.piece_square[color.index()][piece.index()][sq.index()]
}

#[inline]
#[must_use]
pub(crate) fn side_to_move_key() -> u64 {
    KEYS.side_to_move
}

/// Castling rights are a 4-bit mask; index directly into a 16-entry table
/// rather than XORing four independent keys so that `store == 0` transitions
/// don't need special-casing.
#[inline]
#[must_use]
pub(crate) fn castling_key(rights: u8) -> u64 {
    KEYS.castling[rights as usize & 0xF]
}

#[inline]
#[must_use]
pub(crate) fn en_passant_key(file: u8) -> u64 {
    KEYS.en_passant_file[file as usize & 0x7]
}

/// Force the Zobrist key table to initialize eagerly.
pub fn init() {
    LazyLock::force(&KEYS);
}
