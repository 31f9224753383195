use thiserror::Error;

use crate::board::{Piece, PieceKind, Side, Square};

/// 盤面・指し手の契約違反を表すエラー。
///
/// いずれも呼び出し側の入力不備であり、再試行で解決するものではない。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShogiError {
    #[error("invalid piece kind: {0:?}")]
    InvalidPieceKind(char),

    #[error("invalid sfen: {0}")]
    InvalidSfen(String),

    #[error("invalid square: {0:?}")]
    InvalidSquare(String),

    #[error("invalid usi move: {0:?}")]
    InvalidUsiMove(String),

    #[error("no piece at {0}")]
    NoPieceAt(Square),

    #[error("expected {expected:?} at {square}, found {found:?}")]
    PieceMismatch {
        square: Square,
        expected: Piece,
        found: Option<Piece>,
    },

    #[error("illegal move: {from} -> {to}")]
    IllegalMove { from: Square, to: Square },

    #[error("piece at {square} does not belong to {side:?}")]
    NotSideToMove { square: Square, side: Side },

    #[error("cannot drop onto occupied square {0}")]
    DropOnOccupied(Square),

    #[error("{side:?} has no {kind:?} in hand")]
    NotInHand { side: Side, kind: PieceKind },

    #[error("illegal drop of {kind:?} at {to}")]
    IllegalDrop { kind: PieceKind, to: Square },

    #[error("promotion is not allowed for {from} -> {to}")]
    PromotionNotAllowed { from: Square, to: Square },

    #[error("promotion is required for {from} -> {to}")]
    PromotionRequired { from: Square, to: Square },
}

pub type Result<T> = std::result::Result<T, ShogiError>;
