//! Precomputed and magic-indexed attack generation.
//!
//! - Knight and king attacks: precomputed at startup, one bitboard per square.
//! - Pawn pushes/captures: computed on the fly via masked bit shifts.
//! - Rook/bishop/queen attacks: magic bitboards (see [`magic`]).

mod leapers;
pub mod magic;
mod pawns;
mod rays;

pub use leapers::{king_attacks, knight_attacks};
pub use pawns::{double_push_targets, pawn_attacks, pawn_attacks_from, single_push_targets};

/// Initialize all attack tables. Cheap (knight/king/pawn tables) except for
/// the magic bitboard search, which is sub-second but non-trivial — call
/// this once at process startup rather than relying on lazy-init jitter
/// inside the search's hot loop.
pub fn init() {
    once_cell::sync::Lazy::force(&leapers::KNIGHT_ATTACKS);
    once_cell::sync::Lazy::force(&leapers::KING_ATTACKS);
    magic::init();
}
