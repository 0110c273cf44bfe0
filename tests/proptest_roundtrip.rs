//! Property-based tests over random legal move sequences: make/unmake must
//! restore state exactly, the incremental hash must always agree with a
//! from-scratch recomputation, and a round trip through FEN must preserve
//! the position.

use chess_engine::position::Position;
use proptest::prelude::*;
use rand::prelude::*;

fn random_playout(rng: &mut StdRng, num_moves: usize) -> Position {
    let mut pos = Position::startpos();
    for _ in 0..num_moves {
        let moves = pos.legal_moves();
        if moves.is_empty() {
            break;
        }
        let idx = rng.gen_range(0..moves.len());
        pos.make_move(moves[idx]);
    }
    pos
}

proptest! {
    /// make_move followed by unmake_move restores the position exactly,
    /// hash and FEN included, no matter how many random legal moves deep.
    #[test]
    fn make_unmake_restores_state(seed in any::<u64>(), num_moves in 1..20usize) {
        let mut pos = Position::startpos();
        let mut rng = StdRng::seed_from_u64(seed);
        let initial_hash = pos.hash();
        let initial_fen = pos.to_fen();

        let mut history = Vec::new();
        for _ in 0..num_moves {
            let moves = pos.legal_moves();
            if moves.is_empty() {
                break;
            }
            let idx = rng.gen_range(0..moves.len());
            let mv = moves[idx];
            let info = pos.make_move(mv);
            history.push((mv, info));
        }

        while let Some((mv, info)) = history.pop() {
            pos.unmake_move(mv, info);
        }

        prop_assert_eq!(pos.hash(), initial_hash);
        prop_assert_eq!(pos.to_fen(), initial_fen);
    }

    /// The incrementally-maintained Zobrist hash always agrees with a hash
    /// recomputed from scratch off the current board state.
    #[test]
    fn incremental_hash_matches_recomputation(seed in any::<u64>(), num_moves in 1..20usize) {
        let mut pos = Position::startpos();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..num_moves {
            let moves = pos.legal_moves();
            if moves.is_empty() {
                break;
            }
            let idx = rng.gen_range(0..moves.len());
            pos.make_move(moves[idx]);

            prop_assert_eq!(pos.hash(), pos.recompute_hash());
        }
    }

    /// Every position reachable by random legal play survives a FEN
    /// round trip with its hash and side-to-move intact.
    #[test]
    fn fen_roundtrip_preserves_position(seed in any::<u64>(), num_moves in 0..20usize) {
        let mut rng = StdRng::seed_from_u64(seed);
        let pos = random_playout(&mut rng, num_moves);

        let fen = pos.to_fen();
        let restored = Position::from_fen(&fen).unwrap();

        prop_assert_eq!(pos.hash(), restored.hash());
        prop_assert_eq!(pos.side_to_move(), restored.side_to_move());
        prop_assert_eq!(pos.to_fen(), restored.to_fen());
    }

    /// No legal move ever leaves the mover's own king in check.
    #[test]
    fn legal_moves_never_leave_the_mover_in_check(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pos = Position::startpos();

        for _ in 0..10 {
            let moves = pos.legal_moves();
            if moves.is_empty() {
                break;
            }
            let mover = pos.side_to_move();
            for &mv in &moves {
                let info = pos.make_move(mv);
                prop_assert!(!pos.is_in_check(mover), "legal move {} left the mover in check", mv.to_uci());
                pos.unmake_move(mv, info);
            }
            let idx = rng.gen_range(0..moves.len());
            pos.make_move(moves[idx]);
        }
    }

    /// Static exchange evaluation of a capture never reports a gain larger
    /// than the value of the piece actually being captured.
    #[test]
    fn see_never_exceeds_captured_piece_value(seed in any::<u64>(), num_moves in 0..15usize) {
        let mut rng = StdRng::seed_from_u64(seed);
        let pos = random_playout(&mut rng, num_moves);

        for &mv in &pos.generate_moves() {
            if let Some((_, victim)) = pos.piece_at(mv.to()) {
                let victim_value = victim.value();
                prop_assert!(
                    pos.see(mv) <= victim_value,
                    "see {} exceeds captured piece value {} for {}",
                    pos.see(mv),
                    victim_value,
                    mv.to_uci()
                );
            }
        }
    }
}
