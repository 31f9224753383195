//! 将棋の合法手判定と棋譜表記。
//!
//! 盤面 (`board`) から駒ごとの行き先 (`movegen`)、王手判定 (`check`)、
//! 自玉を王手にさらす手を除いた合法手 (`legal`)、同種の駒の紛れ (`disambiguation`)、
//! そして `"1手目：▲７六歩"` のような棋譜表記 (`notation`, `kifu`) を扱う。
pub mod board;
pub mod check;
pub mod disambiguation;
pub mod error;
pub mod game;
pub mod kifu;
pub mod legal;
pub mod movegen;
pub mod notation;
pub mod position_key;
pub mod usi;

pub use board::{Board, Piece, PieceKind, Side, Square};
pub use check::is_in_check;
pub use error::{Result, ShogiError};
pub use game::Game;
pub use kifu::{Kifu, MoveRecord};
pub use legal::legal_moves;
pub use movegen::raw_moves;
pub use notation::{format_move, Origin, Promotion, Selection};
pub use position_key::{Hand, PositionKey};
