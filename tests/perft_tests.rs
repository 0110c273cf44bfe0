//! Move-generation correctness via perft, run through the crate's public
//! surface rather than the `position` module's own unit tests — these are
//! the three positions the standard perft suite checks against.

use chess_engine::position::{perft, Position};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -";
const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -";

#[test]
fn starting_position_perft_depths_one_through_five() {
    chess_engine::init();
    let mut pos = Position::startpos();
    let expected = [20u64, 400, 8_902, 197_281, 4_865_609];
    for (depth, &want) in expected.iter().enumerate() {
        assert_eq!(perft(&mut pos, depth as u32 + 1), want, "depth {}", depth + 1);
    }
}

#[test]
fn kiwipete_perft_depths_one_through_four() {
    chess_engine::init();
    let mut pos = Position::from_fen(KIWIPETE).unwrap();
    let expected = [48u64, 2_039, 97_862, 4_085_603];
    for (depth, &want) in expected.iter().enumerate() {
        assert_eq!(perft(&mut pos, depth as u32 + 1), want, "depth {}", depth + 1);
    }
}

#[test]
fn position_3_perft_depths_one_through_four() {
    chess_engine::init();
    let mut pos = Position::from_fen(POSITION_3).unwrap();
    let expected = [14u64, 191, 2_812, 43_238];
    for (depth, &want) in expected.iter().enumerate() {
        assert_eq!(perft(&mut pos, depth as u32 + 1), want, "depth {}", depth + 1);
    }
}

#[test]
fn fen_round_trips_for_positions_reachable_within_four_plies() {
    chess_engine::init();
    let mut frontier = vec![Position::startpos()];
    for _ in 0..4 {
        let mut next = Vec::new();
        for pos in &frontier {
            for &mv in &pos.legal_moves() {
                let mut child = pos.clone();
                child.make_move(mv);
                let fen = child.to_fen();
                let reparsed = Position::from_fen(&fen).unwrap();
                assert_eq!(reparsed.to_fen(), fen, "fen round-trip mismatch for {fen}");
                assert_eq!(reparsed.hash(), child.hash(), "hash mismatch for {fen}");
                next.push(child);
            }
        }
        // Keep the frontier a manageable size: every distinct position, not
        // every path, is what matters for a round-trip check.
        frontier = next;
        if frontier.len() > 500 {
            frontier.truncate(500);
        }
    }
}

#[test]
fn e2e4_round_trip_matches_known_fen() {
    chess_engine::init();
    let mut pos = Position::startpos();
    let mv = chess_engine::position::parse_uci_move(&pos, "e2e4").unwrap();
    pos.make_move(mv);
    assert_eq!(
        pos.to_fen(),
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
    );
}
