use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ShogiError};

pub const BOARD_SIZE: u8 = 9;

/// 成れる段の深さ（敵陣三段）
pub const PROMOTION_ZONE_DEPTH: u8 = 3;

/// 平手の初期局面（SFEN の盤面フィールド）
pub const STARTPOS_BOARD: &str = "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL";

/// 手番。先手(Black)は段の小さい方へ、後手(White)は段の大きい方へ進む。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Black,
    White,
}

impl Side {
    pub fn flip(self) -> Side {
        match self {
            Side::Black => Side::White,
            Side::White => Side::Black,
        }
    }

    /// 前方向の段の増分。全ての方向ルールはこの符号を一度だけ掛けて使う。
    pub fn forward(self) -> i8 {
        match self {
            Side::Black => -1,
            Side::White => 1,
        }
    }

    /// 手数の偶奇から指し手側を求める（奇数 = 先手）。
    pub fn from_move_number(move_number: u32) -> Side {
        if move_number % 2 == 1 {
            Side::Black
        } else {
            Side::White
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Black => 0,
            Side::White => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Lance,
    Knight,
    Silver,
    Gold,
    Bishop,
    Rook,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 8] = [
        PieceKind::Pawn,
        PieceKind::Lance,
        PieceKind::Knight,
        PieceKind::Silver,
        PieceKind::Gold,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::King,
    ];

    pub fn can_promote(self) -> bool {
        !matches!(self, PieceKind::Gold | PieceKind::King)
    }

    /// SFEN の駒文字（大文字）から駒種を得る。
    pub fn from_sfen_char(c: char) -> Result<PieceKind> {
        match c.to_ascii_uppercase() {
            'P' => Ok(PieceKind::Pawn),
            'L' => Ok(PieceKind::Lance),
            'N' => Ok(PieceKind::Knight),
            'S' => Ok(PieceKind::Silver),
            'G' => Ok(PieceKind::Gold),
            'B' => Ok(PieceKind::Bishop),
            'R' => Ok(PieceKind::Rook),
            'K' => Ok(PieceKind::King),
            _ => Err(ShogiError::InvalidPieceKind(c)),
        }
    }

    pub fn sfen_char(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Lance => 'L',
            PieceKind::Knight => 'N',
            PieceKind::Silver => 'S',
            PieceKind::Gold => 'G',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::King => 'K',
        }
    }

    /// 敵陣の奥で行き所がなくなる段数（相対段がこれ未満だと動けない）。
    pub fn dead_ranks(self) -> u8 {
        match self {
            PieceKind::Pawn | PieceKind::Lance => 1,
            PieceKind::Knight => 2,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
    pub promoted: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, side: Side) -> Self {
        Piece {
            kind,
            side,
            promoted: false,
        }
    }

    pub fn promote(self) -> Self {
        Piece {
            promoted: true,
            ..self
        }
    }

    /// 駒台に乗るときの姿（成りを戻す）。
    pub fn unpromote(self) -> Self {
        Piece {
            promoted: false,
            ..self
        }
    }

    pub fn to_sfen(self) -> String {
        let c = match self.side {
            Side::Black => self.kind.sfen_char(),
            Side::White => self.kind.sfen_char().to_ascii_lowercase(),
        };
        if self.promoted {
            format!("+{c}")
        } else {
            c.to_string()
        }
    }
}

/// 盤上のマス。file 0 が９筋（先手から見て左端）、file 8 が１筋、rank 0 が一段目。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    pub const NUM_SQUARES: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if file >= BOARD_SIZE || rank >= BOARD_SIZE {
            return None;
        }
        Some(Square { file, rank })
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    /// 盤外なら `None`。盤端での折り返しはない。
    pub fn shift(self, df: i8, dr: i8) -> Option<Self> {
        let f = self.file as i8 + df;
        let r = self.rank as i8 + dr;
        if !(0..BOARD_SIZE as i8).contains(&f) || !(0..BOARD_SIZE as i8).contains(&r) {
            return None;
        }
        Some(Square {
            file: f as u8,
            rank: r as u8,
        })
    }

    /// 段を上から順に、各段を file の昇順で列挙する。
    pub fn iter() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|rank| (0..BOARD_SIZE).map(move |file| Square { file, rank }))
    }

    /// 指定した側から見た段（0 = 相手側の端）。
    pub fn relative_rank(self, side: Side) -> u8 {
        match side {
            Side::Black => self.rank,
            Side::White => BOARD_SIZE - 1 - self.rank,
        }
    }

    pub fn in_promotion_zone(self, side: Side) -> bool {
        self.relative_rank(side) < PROMOTION_ZONE_DEPTH
    }

    /// USI 形式（例: "7g"）から読む。USI の筋 d は file 9 - d に対応する。
    pub fn from_usi(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let (Some(f), Some(r), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ShogiError::InvalidSquare(s.to_string()));
        };
        let file = f
            .to_digit(10)
            .filter(|d| (1..=9).contains(d))
            .map(|d| BOARD_SIZE - d as u8);
        let rank = ('a'..='i').contains(&r).then(|| r as u8 - b'a');
        match (file, rank) {
            (Some(file), Some(rank)) => Ok(Square { file, rank }),
            _ => Err(ShogiError::InvalidSquare(s.to_string())),
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}{}",
            BOARD_SIZE - self.file,
            (b'a' + self.rank) as char
        )
    }
}

/// 9×9 の盤面。局面の唯一の可変な実体で、検証は一切しない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Board {
    squares: [[Option<Piece>; BOARD_SIZE as usize]; BOARD_SIZE as usize],
}

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn startpos() -> Self {
        // 定数文字列なので失敗しない
        Self::from_sfen_board(STARTPOS_BOARD).unwrap_or_default()
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.rank as usize][sq.file as usize]
    }

    pub fn place(&mut self, sq: Square, piece: Piece) {
        self.set(sq, Some(piece));
    }

    pub fn clear(&mut self, sq: Square) {
        self.set(sq, None);
    }

    pub(crate) fn set(&mut self, sq: Square, slot: Option<Piece>) {
        self.squares[sq.rank as usize][sq.file as usize] = slot;
    }

    /// 駒のあるマスを `Square::iter` の順に列挙する。
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    pub fn find_king(&self, side: Side) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.kind == PieceKind::King && p.side == side)
            .map(|(sq, _)| sq)
    }

    /// SFEN の盤面フィールドを読む。各段は９筋から１筋の順（file 0 から）。
    pub fn from_sfen_board(field: &str) -> Result<Self> {
        let rows: Vec<&str> = field.split('/').collect();
        if rows.len() != BOARD_SIZE as usize {
            return Err(ShogiError::InvalidSfen(format!(
                "expected {} ranks, got {}",
                BOARD_SIZE,
                rows.len()
            )));
        }

        let mut board = Board::empty();
        for (rank, row) in rows.iter().enumerate() {
            let mut file: u8 = 0;
            let mut promoted = false;
            for c in row.chars() {
                if c == '+' {
                    promoted = true;
                    continue;
                }
                if let Some(n) = c.to_digit(10) {
                    if promoted || n == 0 {
                        return Err(ShogiError::InvalidSfen(field.to_string()));
                    }
                    file += n as u8;
                    if file > BOARD_SIZE {
                        return Err(ShogiError::InvalidSfen(field.to_string()));
                    }
                    continue;
                }
                let kind = PieceKind::from_sfen_char(c)?;
                let side = if c.is_ascii_uppercase() {
                    Side::Black
                } else {
                    Side::White
                };
                let sq = Square::new(file, rank as u8)
                    .ok_or_else(|| ShogiError::InvalidSfen(field.to_string()))?;
                if promoted && !kind.can_promote() {
                    return Err(ShogiError::InvalidSfen(format!("{kind:?} cannot be promoted")));
                }
                board.place(
                    sq,
                    Piece {
                        kind,
                        side,
                        promoted,
                    },
                );
                promoted = false;
                file += 1;
            }
            if file != BOARD_SIZE || promoted {
                return Err(ShogiError::InvalidSfen(field.to_string()));
            }
        }
        Ok(board)
    }

    pub fn to_sfen_board(&self) -> String {
        let mut out = String::new();
        for rank in 0..BOARD_SIZE {
            if rank > 0 {
                out.push('/');
            }
            let mut empty = 0;
            for file in 0..BOARD_SIZE {
                match self.squares[rank as usize][file as usize] {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push_str(&piece.to_sfen());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
        }
        out
    }
}
