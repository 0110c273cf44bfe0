//! Core chess types shared by every other module: squares, pieces, colors,
//! bitboards, castling rights, and the move encoding.

mod bitboard;
mod castling;
mod moves;
mod piece;
mod square;

pub use bitboard::{
    Bitboard, BitboardIter, EMPTY, FILE_A, FILE_H, FULL, RANK_1, RANK_2, RANK_3, RANK_4, RANK_5,
    RANK_6, RANK_7, RANK_8,
};
pub use castling::{
    CastlingRights, ALL_CASTLING_RIGHTS, BLACK_KINGSIDE, BLACK_QUEENSIDE, WHITE_KINGSIDE,
    WHITE_QUEENSIDE,
};
pub use moves::{Move, MoveList, ScoredMove, ScoredMoveList, MAX_PLY, NULL_MOVE};
pub use piece::{
    Color, Piece, BISHOP_VALUE, KING_VALUE, KNIGHT_VALUE, PAWN_VALUE, PROMOTION_PIECES,
    QUEEN_VALUE, ROOK_VALUE,
};
pub use square::{Square, SquareError, NO_SQUARE};
