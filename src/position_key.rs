use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::{Board, PieceKind, Side, Square};
use crate::error::{Result, ShogiError};

/// 持ち駒になりうる駒種（SFEN の持ち駒表記の順）。
pub const HAND_PIECE_KINDS: [PieceKind; 7] = [
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Gold,
    PieceKind::Silver,
    PieceKind::Knight,
    PieceKind::Lance,
    PieceKind::Pawn,
];

const MAX_HAND_COUNTS: [usize; 7] = [2, 2, 4, 4, 4, 4, 18];

fn hand_index(kind: PieceKind) -> Option<usize> {
    HAND_PIECE_KINDS.iter().position(|&k| k == kind)
}

/// 片方の持ち駒の枚数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hand {
    counts: [u8; 7],
}

impl Hand {
    pub fn count(&self, kind: PieceKind) -> u8 {
        hand_index(kind).map_or(0, |i| self.counts[i])
    }

    /// 玉は持ち駒にならないので無視する。
    pub fn add(&mut self, kind: PieceKind) {
        if let Some(i) = hand_index(kind) {
            self.counts[i] = self.counts[i].saturating_add(1);
        }
    }

    pub fn take(&mut self, kind: PieceKind) -> bool {
        match hand_index(kind) {
            Some(i) if self.counts[i] > 0 => {
                self.counts[i] -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    fn write_sfen(&self, side: Side, out: &mut String) {
        for (i, kind) in HAND_PIECE_KINDS.iter().enumerate() {
            let n = self.counts[i];
            if n == 0 {
                continue;
            }
            if n > 1 {
                out.push_str(&n.to_string());
            }
            let c = kind.sfen_char();
            out.push(match side {
                Side::Black => c,
                Side::White => c.to_ascii_lowercase(),
            });
        }
    }
}

/// SFEN の持ち駒フィールド（例: `"2Pb"`、なしは `"-"`）を読む。
pub fn parse_hands(field: &str) -> Result<[Hand; 2]> {
    let mut hands = [Hand::default(); 2];
    if field == "-" {
        return Ok(hands);
    }

    let mut count: usize = 0;
    for c in field.chars() {
        if let Some(d) = c.to_digit(10) {
            count = count * 10 + d as usize;
            // 歩の 18 枚が最多なので、それを超えた時点で打ち切る
            if count > MAX_HAND_COUNTS[6] {
                return Err(ShogiError::InvalidSfen(format!("hand count too large in {field:?}")));
            }
            continue;
        }
        let kind = PieceKind::from_sfen_char(c)?;
        let side = if c.is_ascii_uppercase() {
            Side::Black
        } else {
            Side::White
        };
        let i = hand_index(kind)
            .ok_or_else(|| ShogiError::InvalidSfen(format!("{kind:?} cannot be in hand")))?;
        let n = count.max(1);
        let total = hands[side.index()].counts[i] as usize + n;
        if total > MAX_HAND_COUNTS[i] {
            return Err(ShogiError::InvalidSfen(format!("too many {kind:?} in hand")));
        }
        hands[side.index()].counts[i] = total as u8;
        count = 0;
    }
    if count != 0 {
        return Err(ShogiError::InvalidSfen(field.to_string()));
    }
    Ok(hands)
}

/// 同一局面判定のための正規化されたキー。
///
/// `"<盤面> <b|w> <持ち駒>"` の SFEN 形式で、手数や指し手の経路には依存しない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionKey(String);

impl PositionKey {
    pub fn new(board: &Board, side_to_move: Side, hands: &[Hand; 2]) -> Self {
        let mut key = board.to_sfen_board();
        key.push(' ');
        key.push(match side_to_move {
            Side::Black => 'b',
            Side::White => 'w',
        });
        key.push(' ');
        if hands.iter().all(Hand::is_empty) {
            key.push('-');
        } else {
            hands[0].write_sfen(Side::Black, &mut key);
            hands[1].write_sfen(Side::White, &mut key);
        }
        PositionKey(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct ZobristKeys {
    // piece kind, promoted, square, side
    pub board: [[[[u64; 2]; 81]; 2]; 8],
    // hand kind, count, side
    pub hand: [[[u64; 2]; 19]; 7],
    pub side_to_move: u64,
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(19700101);
        let mut board = [[[[0; 2]; 81]; 2]; 8];
        let mut hand = [[[0; 2]; 19]; 7];

        for kind in board.iter_mut() {
            for promoted in kind.iter_mut() {
                for square in promoted.iter_mut() {
                    for key in square.iter_mut() {
                        *key = rng.gen();
                    }
                }
            }
        }

        for (i, kind) in hand.iter_mut().enumerate() {
            // count 0 is not used
            for count in kind.iter_mut().take(MAX_HAND_COUNTS[i] + 1).skip(1) {
                for key in count.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        let side_to_move = rng.gen();

        ZobristKeys {
            board,
            hand,
            side_to_move,
        }
    }
}

lazy_static! {
    pub static ref ZOBRIST_KEYS: ZobristKeys = ZobristKeys::new();
}

fn kind_index(kind: PieceKind) -> usize {
    PieceKind::ALL.iter().position(|&k| k == kind).unwrap_or(0)
}

fn square_index(sq: Square) -> usize {
    sq.rank() as usize * 9 + sq.file() as usize
}

/// キーの 64bit ダイジェスト。同じキーなら同じ値になる。
pub fn digest(board: &Board, side_to_move: Side, hands: &[Hand; 2]) -> u64 {
    let keys = &*ZOBRIST_KEYS;
    let mut h = 0u64;
    for (sq, piece) in board.pieces() {
        h ^= keys.board[kind_index(piece.kind)][piece.promoted as usize][square_index(sq)]
            [piece.side.index()];
    }
    for side in [Side::Black, Side::White] {
        for (i, &kind) in HAND_PIECE_KINDS.iter().enumerate() {
            let n = (hands[side.index()].count(kind) as usize).min(MAX_HAND_COUNTS[i]);
            if n > 0 {
                h ^= keys.hand[i][n][side.index()];
            }
        }
    }
    if side_to_move == Side::White {
        h ^= keys.side_to_move;
    }
    h
}
