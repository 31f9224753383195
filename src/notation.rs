use crate::board::{Board, Piece, PieceKind, Side, Square};
use crate::disambiguation;
use crate::error::{Result, ShogiError};

pub const FILE_GLYPHS: [&str; 9] = ["９", "８", "７", "６", "５", "４", "３", "２", "１"];
pub const RANK_GLYPHS: [&str; 9] = ["一", "二", "三", "四", "五", "六", "七", "八", "九"];

pub const BLACK_MARK: &str = "▲";
pub const WHITE_MARK: &str = "△";
pub const SAME_SQUARE: &str = "同";
pub const DROP_MARK: &str = "打";
pub const PROMOTE_MARK: &str = "成";
pub const DECLINE_MARK: &str = "不成";

/// 成りを除いた駒種の表記。
pub fn piece_glyph(kind: PieceKind) -> &'static str {
    match kind {
        PieceKind::Pawn => "歩",
        PieceKind::Lance => "香",
        PieceKind::Knight => "桂",
        PieceKind::Silver => "銀",
        PieceKind::Gold => "金",
        PieceKind::Bishop => "角",
        PieceKind::Rook => "飛",
        PieceKind::King => "玉",
    }
}

pub fn mover_mark(move_number: u32) -> &'static str {
    match Side::from_move_number(move_number) {
        Side::Black => BLACK_MARK,
        Side::White => WHITE_MARK,
    }
}

pub fn square_glyphs(sq: Square) -> String {
    format!(
        "{}{}",
        FILE_GLYPHS[sq.file() as usize],
        RANK_GLYPHS[sq.rank() as usize]
    )
}

/// 指し手の出どころ。盤上のマスか、駒台からの打ち。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Board(Square),
    Hand(PieceKind),
}

/// 成・不成の選択。成れない手では `NotApplicable`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    Promote,
    Decline,
    NotApplicable,
}

/// 入力中（確定済み）の指し手。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub origin: Origin,
    pub destination: Square,
    pub promotion: Promotion,
}

impl Selection {
    pub fn normal(from: Square, to: Square, promotion: Promotion) -> Self {
        Selection {
            origin: Origin::Board(from),
            destination: to,
            promotion,
        }
    }

    pub fn drop(kind: PieceKind, to: Square) -> Self {
        Selection {
            origin: Origin::Hand(kind),
            destination: to,
            promotion: Promotion::NotApplicable,
        }
    }
}

/// 成・不成の表記が付く手か（成れる駒・未成・移動元か移動先が敵陣）。
pub fn promotion_applies(piece: Piece, from: Square, to: Square) -> bool {
    !piece.promoted
        && piece.kind.can_promote()
        && (from.in_promotion_zone(piece.side) || to.in_promotion_zone(piece.side))
}

/// 指し手を棋譜の一行（例: `"1手目：▲７六歩"`）に変換する。
///
/// `piece` と `board_before` は指す前のもの。盤上の駒の手は合法でなければならず、
/// 移動元の駒が `piece` と一致しない場合や合法手でない場合はエラーを返す。
pub fn format_move(
    selection: &Selection,
    piece: Piece,
    board_before: &Board,
    move_number: u32,
    previous_destination: Option<Square>,
) -> Result<String> {
    let to = selection.destination;
    let mut kifu = format!("{}手目：{}", move_number, mover_mark(move_number));

    if previous_destination == Some(to) {
        kifu.push_str(SAME_SQUARE);
    } else {
        kifu.push_str(&square_glyphs(to));
    }
    kifu.push_str(piece_glyph(piece.kind));

    let from = match selection.origin {
        Origin::Hand(kind) => {
            if kind != piece.kind || piece.promoted {
                return Err(ShogiError::PieceMismatch {
                    square: to,
                    expected: Piece::new(kind, piece.side),
                    found: Some(piece),
                });
            }
            if board_before.piece_at(to).is_some() {
                return Err(ShogiError::DropOnOccupied(to));
            }
            kifu.push_str(DROP_MARK);
            return Ok(kifu);
        }
        Origin::Board(from) => from,
    };

    let found = board_before.piece_at(from);
    if found != Some(piece) {
        return Err(ShogiError::PieceMismatch {
            square: from,
            expected: piece,
            found,
        });
    }

    if let Some(q) = disambiguation::resolve(from, to, board_before)? {
        kifu.push_str(q.glyph());
    }

    if promotion_applies(piece, from, to) {
        match selection.promotion {
            Promotion::Promote => kifu.push_str(PROMOTE_MARK),
            Promotion::Decline => kifu.push_str(DECLINE_MARK),
            Promotion::NotApplicable => {}
        }
    }
    Ok(kifu)
}
