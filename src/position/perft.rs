//! Perft: count leaf positions reachable at a fixed depth from a position,
//! walking only legal moves. Used as the move generator's correctness
//! regression guard — a wrong perft count at a known position means
//! generation, make/unmake, or legality filtering disagrees with the rest of
//! the chess-programming world.

use super::Position;

/// Count legal leaf positions `depth` plies from `pos`. `perft(pos, 0) == 1`
/// by convention (the position itself is the one leaf).
#[must_use]
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = pos.generate_moves();
    let mover = pos.side_to_move();

    // At depth 1, counting survives without recursing: every legal move is
    // itself one leaf, so the illegal-king-left-in-check filter is all that
    // is needed.
    if depth == 1 {
        let mut count = 0;
        for &mv in &moves {
            let info = pos.make_move(mv);
            if !pos.is_in_check(mover) {
                count += 1;
            }
            pos.unmake_move(mv, info);
        }
        return count;
    }

    let mut nodes = 0;
    for &mv in &moves {
        let info = pos.make_move(mv);
        if !pos.is_in_check(mover) {
            nodes += perft(pos, depth - 1);
        }
        pos.unmake_move(mv, info);
    }
    nodes
}

/// Per-move leaf counts at `depth`, in move-generation order — a "divide",
/// used to localize a perft mismatch to a single root move.
#[must_use]
pub fn perft_divide(pos: &mut Position, depth: u32) -> Vec<(crate::types::Move, u64)> {
    let moves = pos.generate_moves();
    let mover = pos.side_to_move();
    let mut divide = Vec::new();
    for &mv in &moves {
        let info = pos.make_move(mv);
        if !pos.is_in_check(mover) {
            let nodes = if depth == 0 { 1 } else { perft(pos, depth - 1) };
            divide.push((mv, nodes));
        }
        pos.unmake_move(mv, info);
    }
    divide
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -";

    #[test]
    fn startpos_matches_known_counts_through_depth_five() {
        let mut pos = Position::startpos();
        assert_eq!(perft(&mut pos, 1), 20);
        assert_eq!(perft(&mut pos, 2), 400);
        assert_eq!(perft(&mut pos, 3), 8_902);
        assert_eq!(perft(&mut pos, 4), 197_281);
        assert_eq!(perft(&mut pos, 5), 4_865_609);
    }

    #[test]
    fn kiwipete_matches_known_counts_through_depth_four() {
        let mut pos = Position::from_fen(KIWIPETE).unwrap();
        assert_eq!(perft(&mut pos, 1), 48);
        assert_eq!(perft(&mut pos, 2), 2_039);
        assert_eq!(perft(&mut pos, 3), 97_862);
        assert_eq!(perft(&mut pos, 4), 4_085_603);
    }

    #[test]
    fn position_3_matches_known_counts_through_depth_four() {
        let mut pos = Position::from_fen(POSITION_3).unwrap();
        assert_eq!(perft(&mut pos, 1), 14);
        assert_eq!(perft(&mut pos, 2), 191);
        assert_eq!(perft(&mut pos, 3), 2_812);
        assert_eq!(perft(&mut pos, 4), 43_238);
    }

    #[test]
    fn divide_sums_to_the_same_total_as_perft() {
        let mut pos = Position::startpos();
        let divide = perft_divide(&mut pos, 3);
        let total: u64 = divide.iter().map(|(_, n)| n).sum();
        assert_eq!(total, perft(&mut pos, 3));
    }
}
