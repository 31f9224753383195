use serde::{Deserialize, Serialize};

use crate::board::{Board, Piece, Side, Square};
use crate::error::Result;
use crate::notation::{format_move, Selection};

/// 棋譜の一手。作成後は変更しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    number: u32,
    side: Side,
    notation: String,
}

impl MoveRecord {
    fn new(number: u32, notation: String) -> Self {
        MoveRecord {
            number,
            side: Side::from_move_number(number),
            notation,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn notation(&self) -> &str {
        &self.notation
    }
}

/// 追記専用の棋譜。手数と直前の着手先（「同」用）を管理する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kifu {
    first_number: u32,
    records: Vec<MoveRecord>,
    #[serde(default)]
    last_destination: Option<Square>,
}

impl Default for Kifu {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl Kifu {
    pub fn new() -> Self {
        Self::default()
    }

    /// 途中局面から始める棋譜。手数の偶奇が手番を決める。
    pub fn starting_at(first_number: u32) -> Self {
        Kifu {
            first_number: first_number.max(1),
            records: Vec::new(),
            last_destination: None,
        }
    }

    pub fn next_number(&self) -> u32 {
        self.first_number + self.records.len() as u32
    }

    pub fn last_destination(&self) -> Option<Square> {
        self.last_destination
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 指す前の局面で指し手を表記し、棋譜の末尾に追加する。
    pub fn record(
        &mut self,
        selection: &Selection,
        piece: Piece,
        board_before: &Board,
    ) -> Result<&MoveRecord> {
        let number = self.next_number();
        let notation = format_move(
            selection,
            piece,
            board_before,
            number,
            self.last_destination,
        )?;
        self.last_destination = Some(selection.destination);
        self.records.push(MoveRecord::new(number, notation));
        Ok(&self.records[self.records.len() - 1])
    }

    /// KIF 形式のテキスト。対局者名を見出しに書く。
    pub fn to_kif(&self, black_name: &str, white_name: &str) -> String {
        let mut out = String::new();
        out.push_str("手合割：平手\n");
        out.push_str(&format!("先手：{black_name}\n"));
        out.push_str(&format!("後手：{white_name}\n"));
        out.push('\n');
        for record in &self.records {
            out.push_str(record.notation());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PieceKind;
    use crate::notation::Promotion;

    fn usi(s: &str) -> Square {
        Square::from_usi(s).unwrap()
    }

    #[test]
    fn test_numbering_and_same_square() {
        let mut board = Board::startpos();
        let mut kifu = Kifu::new();

        let pawn = Piece::new(PieceKind::Pawn, Side::Black);
        let sel = Selection::normal(usi("2g"), usi("2f"), Promotion::NotApplicable);
        let rec = kifu.record(&sel, pawn, &board).unwrap().clone();
        assert_eq!(rec.number(), 1);
        assert_eq!(rec.side(), Side::Black);
        assert_eq!(rec.notation(), "1手目：▲２六歩");
        board.clear(usi("2g"));
        board.place(usi("2f"), pawn);

        let wpawn = Piece::new(PieceKind::Pawn, Side::White);
        board.place(usi("2e"), wpawn);
        board.clear(usi("2c"));
        let sel = Selection::normal(usi("2e"), usi("2f"), Promotion::NotApplicable);
        let rec = kifu.record(&sel, wpawn, &board).unwrap();
        assert_eq!(rec.side(), Side::White);
        assert_eq!(rec.notation(), "2手目：△同歩");
        assert_eq!(kifu.len(), 2);
        assert_eq!(kifu.next_number(), 3);
    }

    #[test]
    fn test_failed_record_leaves_kifu_untouched() {
        let board = Board::startpos();
        let mut kifu = Kifu::new();
        let pawn = Piece::new(PieceKind::Pawn, Side::Black);
        let sel = Selection::normal(usi("2g"), usi("2e"), Promotion::NotApplicable);
        assert!(kifu.record(&sel, pawn, &board).is_err());
        assert!(kifu.is_empty());
        assert_eq!(kifu.last_destination(), None);
    }

    #[test]
    fn test_starting_at_white() {
        let kifu = Kifu::starting_at(2);
        assert_eq!(kifu.next_number(), 2);
        assert_eq!(Side::from_move_number(kifu.next_number()), Side::White);
    }

    #[test]
    fn test_kif_text_and_json() {
        let board = Board::startpos();
        let mut kifu = Kifu::new();
        let pawn = Piece::new(PieceKind::Pawn, Side::Black);
        let sel = Selection::normal(usi("7g"), usi("7f"), Promotion::NotApplicable);
        kifu.record(&sel, pawn, &board).unwrap();

        let kif = kifu.to_kif("Alice", "Bob");
        assert!(kif.starts_with("手合割：平手\n先手：Alice\n後手：Bob\n"));
        assert!(kif.ends_with("1手目：▲７六歩\n"));

        let json = serde_json::to_string(&kifu).unwrap();
        assert!(json.contains("1手目：▲７六歩"));
        let back: Kifu = serde_json::from_str(&json).unwrap();
        assert_eq!(back.records(), kifu.records());
    }

    #[test]
    fn test_json_keeps_same_square_context() {
        let mut board = Board::startpos();
        let mut kifu = Kifu::new();
        let pawn = Piece::new(PieceKind::Pawn, Side::Black);
        let sel = Selection::normal(usi("2g"), usi("2f"), Promotion::NotApplicable);
        kifu.record(&sel, pawn, &board).unwrap();
        board.clear(usi("2g"));
        board.place(usi("2f"), pawn);

        let json = serde_json::to_string(&kifu).unwrap();
        let mut back: Kifu = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kifu);
        assert_eq!(back.last_destination(), Some(usi("2f")));

        let wpawn = Piece::new(PieceKind::Pawn, Side::White);
        board.place(usi("2e"), wpawn);
        board.clear(usi("2c"));
        let sel = Selection::normal(usi("2e"), usi("2f"), Promotion::NotApplicable);
        let rec = back.record(&sel, wpawn, &board).unwrap();
        assert_eq!(rec.notation(), "2手目：△同歩");
    }
}
