use log::warn;

use crate::board::{Board, Side, Square};
use crate::error::{Result, ShogiError};
use crate::legal::legal_moves;

/// 同じ升に動ける同種の駒が他にあるときに付ける修飾（直・右上・左引 など）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    Straight,
    RightForward,
    LeftForward,
    RightBackward,
    LeftBackward,
    RightLateral,
    LeftLateral,
}

impl Qualifier {
    pub fn glyph(self) -> &'static str {
        match self {
            Qualifier::Straight => "直",
            Qualifier::RightForward => "右上",
            Qualifier::LeftForward => "左上",
            Qualifier::RightBackward => "右引",
            Qualifier::LeftBackward => "左引",
            Qualifier::RightLateral => "右寄",
            Qualifier::LeftLateral => "左寄",
        }
    }
}

/// 指した駒自身の動きから修飾を決める。
///
/// 筋が変わらなければ「直」。そうでなければ前後（手番の前方向基準）と左右で分類する。
/// 左右は先手なら file が減る向きが右、後手はその逆。
pub fn qualifier(from: Square, to: Square, side: Side) -> Qualifier {
    let df = to.file() as i8 - from.file() as i8;
    let dr = (to.rank() as i8 - from.rank() as i8) * side.forward();

    if df == 0 {
        return Qualifier::Straight;
    }

    let right = match side {
        Side::Black => df < 0,
        Side::White => df > 0,
    };

    match (dr.signum(), right) {
        (1, true) => Qualifier::RightForward,
        (1, false) => Qualifier::LeftForward,
        (-1, true) => Qualifier::RightBackward,
        (-1, false) => Qualifier::LeftBackward,
        (_, true) => Qualifier::RightLateral,
        (_, false) => Qualifier::LeftLateral,
    }
}

/// `from` の駒と同じ手番・同じ駒種（成りは問わない）で、`to` に合法に動ける他の駒。
///
/// `board` は指す前の局面。`from` の駒自身の手も合法でなければならない。
pub fn rivals(from: Square, to: Square, board: &Board) -> Result<Vec<Square>> {
    let piece = board.piece_at(from).ok_or(ShogiError::NoPieceAt(from))?;
    let mut scratch = board.clone();

    if !legal_moves(from, &mut scratch)?.contains(&to) {
        return Err(ShogiError::IllegalMove { from, to });
    }

    let mut found = Vec::new();
    for (sq, other) in board.pieces() {
        if sq == from || other.side != piece.side || other.kind != piece.kind {
            continue;
        }
        if legal_moves(sq, &mut scratch)?.contains(&to) {
            found.push(sq);
        }
    }
    Ok(found)
}

/// 紛れがあれば修飾を返す。紛れがなければ `None`。
pub fn resolve(from: Square, to: Square, board: &Board) -> Result<Option<Qualifier>> {
    let others = rivals(from, to, board)?;
    if others.is_empty() {
        return Ok(None);
    }

    let side = board
        .piece_at(from)
        .map(|p| p.side)
        .ok_or(ShogiError::NoPieceAt(from))?;
    if others.len() >= 2 {
        // 3 枚以上の紛れは一つの修飾では区別しきれない
        warn!(
            "{} other pieces can also reach {to}; qualifier may be ambiguous",
            others.len()
        );
    }
    Ok(Some(qualifier(from, to, side)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Piece, PieceKind};

    fn sq(file: u8, rank: u8) -> Square {
        Square::new(file, rank).unwrap()
    }

    fn board_with(pieces: &[(u8, u8, Piece)]) -> Board {
        let mut b = Board::empty();
        for &(f, r, p) in pieces {
            b.place(sq(f, r), p);
        }
        b
    }

    #[test]
    fn test_qualifier_black() {
        let s = Side::Black;
        assert_eq!(qualifier(sq(4, 5), sq(4, 4), s), Qualifier::Straight);
        assert_eq!(qualifier(sq(4, 3), sq(4, 4), s), Qualifier::Straight);
        assert_eq!(qualifier(sq(5, 5), sq(4, 4), s), Qualifier::RightForward);
        assert_eq!(qualifier(sq(3, 5), sq(4, 4), s), Qualifier::LeftForward);
        assert_eq!(qualifier(sq(5, 3), sq(4, 4), s), Qualifier::RightBackward);
        assert_eq!(qualifier(sq(3, 3), sq(4, 4), s), Qualifier::LeftBackward);
        assert_eq!(qualifier(sq(5, 4), sq(4, 4), s), Qualifier::RightLateral);
        assert_eq!(qualifier(sq(3, 4), sq(4, 4), s), Qualifier::LeftLateral);
    }

    #[test]
    fn test_qualifier_white_is_mirrored() {
        let s = Side::White;
        assert_eq!(qualifier(sq(3, 3), sq(4, 4), s), Qualifier::RightForward);
        assert_eq!(qualifier(sq(5, 3), sq(4, 4), s), Qualifier::LeftForward);
        assert_eq!(qualifier(sq(3, 5), sq(4, 4), s), Qualifier::RightBackward);
        assert_eq!(qualifier(sq(5, 5), sq(4, 4), s), Qualifier::LeftBackward);
        assert_eq!(qualifier(sq(3, 4), sq(4, 4), s), Qualifier::RightLateral);
        assert_eq!(qualifier(sq(5, 4), sq(4, 4), s), Qualifier::LeftLateral);
    }

    #[test]
    fn test_rivals_of_two_golds() {
        let gold = Piece::new(PieceKind::Gold, Side::Black);
        let b = board_with(&[(5, 7, gold), (6, 8, gold)]);
        assert_eq!(rivals(sq(6, 8), sq(5, 8), &b).unwrap(), vec![sq(5, 7)]);
        assert_eq!(
            resolve(sq(6, 8), sq(5, 8), &b).unwrap(),
            Some(Qualifier::RightLateral)
        );
        assert_eq!(
            resolve(sq(5, 7), sq(5, 8), &b).unwrap(),
            Some(Qualifier::Straight)
        );
    }

    #[test]
    fn test_rivals_ignore_other_side_and_kind() {
        let b = board_with(&[
            (5, 7, Piece::new(PieceKind::Gold, Side::Black)),
            (6, 8, Piece::new(PieceKind::Gold, Side::White)),
            (4, 8, Piece::new(PieceKind::Silver, Side::Black)),
        ]);
        assert!(rivals(sq(5, 7), sq(5, 8), &b).unwrap().is_empty());
        assert_eq!(resolve(sq(5, 7), sq(5, 8), &b).unwrap(), None);
    }

    #[test]
    fn test_pinned_rival_is_not_counted() {
        // ５筋の金は飛車にピンされているので４八へは行けない
        let gold = Piece::new(PieceKind::Gold, Side::Black);
        let b = board_with(&[
            (4, 0, Piece::new(PieceKind::Rook, Side::White)),
            (4, 7, gold),
            (4, 8, Piece::new(PieceKind::King, Side::Black)),
            (6, 7, gold),
        ]);
        assert!(rivals(sq(6, 7), sq(5, 7), &b).unwrap().is_empty());
    }

    #[test]
    fn test_illegal_mover_fails_fast() {
        let gold = Piece::new(PieceKind::Gold, Side::Black);
        let b = board_with(&[(4, 4, gold)]);
        assert_eq!(
            rivals(sq(4, 4), sq(4, 6), &b),
            Err(ShogiError::IllegalMove {
                from: sq(4, 4),
                to: sq(4, 6)
            })
        );
        assert_eq!(
            rivals(sq(0, 0), sq(0, 1), &b),
            Err(ShogiError::NoPieceAt(sq(0, 0)))
        );
    }
}
