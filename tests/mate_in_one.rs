//! A small suite of hand-picked mate-in-one positions spanning every piece
//! kind, checked by replaying the engine's chosen move and confirming no
//! legal reply exists for the side left in check.

use chess_engine::position::Position;
use chess_engine::search::SearchLimits;
use chess_engine::Engine;

fn assert_move_is_checkmate(fen: &str, depth: u32) {
    let mut engine = Engine::new();
    engine.set_position(fen).unwrap();
    let result = engine.search(SearchLimits::depth(depth), |_| {});
    let mv = result.best_move.unwrap_or_else(|| panic!("no move found for {fen}"));

    let mut pos = Position::from_fen(fen).unwrap();
    pos.make_move(mv);
    assert!(
        pos.is_in_check(pos.side_to_move()),
        "{fen} playing {} should deliver check",
        mv.to_uci()
    );
    assert!(
        pos.legal_moves().is_empty(),
        "{fen} playing {} should leave no legal reply",
        mv.to_uci()
    );
}

#[test]
fn rook_back_rank_mate() {
    assert_move_is_checkmate("6k1/5ppp/8/8/8/8/8/R3K3 w Q -", 3);
}

#[test]
fn queen_back_rank_mate() {
    assert_move_is_checkmate("6k1/5ppp/8/8/8/8/8/4Q2K w - -", 3);
}

#[test]
fn smothered_knight_mate() {
    assert_move_is_checkmate("6rk/6pp/8/6N1/8/8/8/6K1 w - -", 3);
}

#[test]
fn two_rooks_ladder_mate() {
    assert_move_is_checkmate("7k/R7/8/8/8/8/8/1R5K w - -", 3);
}
