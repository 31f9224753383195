use crate::board::{Board, Side};
use crate::movegen::piece_moves;

/// `side` の玉に相手の駒の利きがあるかを返す。
///
/// 利きは王手放置を考慮しない生の行き先で判定する（合法手フィルタは呼ばない）。
/// 玉がいない局面は王手ではないとみなす。
pub fn is_in_check(side: Side, board: &Board) -> bool {
    let Some(king) = board.find_king(side) else {
        return false;
    };

    board
        .pieces()
        .filter(|(_, piece)| piece.side != side)
        .any(|(from, piece)| piece_moves(from, piece, board).contains(&king))
}
