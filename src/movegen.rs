use arrayvec::ArrayVec;

use crate::board::{Board, Piece, PieceKind, Square};
use crate::error::{Result, ShogiError};

/// 1 駒の行き先の最大数は龍・馬の 20 マス。
pub const MAX_PIECE_MOVES: usize = 20;

pub type MoveList = ArrayVec<Square, MAX_PIECE_MOVES>;

// 方向はすべて (筋の増分, 前方向への段の増分) で書き、段は手番の符号を掛けて使う。
const PAWN_STEPS: [(i8, i8); 1] = [(0, 1)];
const KNIGHT_STEPS: [(i8, i8); 2] = [(-1, 2), (1, 2)];
const SILVER_STEPS: [(i8, i8); 5] = [(-1, 1), (0, 1), (1, 1), (-1, -1), (1, -1)];
const GOLD_STEPS: [(i8, i8); 6] = [(-1, 1), (0, 1), (1, 1), (-1, 0), (1, 0), (0, -1)];
const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];
const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
const LANCE_RAY: [(i8, i8); 1] = [(0, 1)];

/// `sq` にある駒の、王手放置を考慮しない行き先を返す。
///
/// 空きマスは契約違反として `NoPieceAt` を返す（動けない駒と区別するため）。
pub fn raw_moves(sq: Square, board: &Board) -> Result<MoveList> {
    let piece = board.piece_at(sq).ok_or(ShogiError::NoPieceAt(sq))?;
    Ok(piece_moves(sq, piece, board))
}

/// 駒を指定して行き先を生成する。王手判定からはこちらを直接使う。
pub(crate) fn piece_moves(from: Square, piece: Piece, board: &Board) -> MoveList {
    let mut gen = Generator {
        from,
        piece,
        board,
        forward: piece.side.forward(),
        moves: MoveList::new(),
    };

    if piece.promoted {
        match piece.kind {
            PieceKind::Bishop => {
                gen.slide_all(&DIAGONAL);
                gen.step_all(&ORTHOGONAL);
            }
            PieceKind::Rook => {
                gen.slide_all(&ORTHOGONAL);
                gen.step_all(&DIAGONAL);
            }
            _ => gen.step_all(&GOLD_STEPS),
        }
    } else {
        match piece.kind {
            PieceKind::Pawn => gen.step_all(&PAWN_STEPS),
            PieceKind::Lance => gen.slide_all(&LANCE_RAY),
            PieceKind::Knight => gen.step_all(&KNIGHT_STEPS),
            PieceKind::Silver => gen.step_all(&SILVER_STEPS),
            PieceKind::Gold => gen.step_all(&GOLD_STEPS),
            PieceKind::King => gen.step_all(&KING_STEPS),
            PieceKind::Bishop => gen.slide_all(&DIAGONAL),
            PieceKind::Rook => gen.slide_all(&ORTHOGONAL),
        }
    }
    gen.moves
}

struct Generator<'a> {
    from: Square,
    piece: Piece,
    board: &'a Board,
    forward: i8,
    moves: MoveList,
}

impl Generator<'_> {
    /// 行き先を追加し、さらに先へ進めるかを返す。
    fn add(&mut self, to: Option<Square>) -> bool {
        let Some(to) = to else {
            return false;
        };
        match self.board.piece_at(to) {
            Some(target) if target.side == self.piece.side => false,
            Some(_) => {
                self.moves.push(to);
                false
            }
            None => {
                self.moves.push(to);
                true
            }
        }
    }

    fn target(&self, from: Square, (df, dr): (i8, i8)) -> Option<Square> {
        from.shift(df, dr * self.forward)
    }

    fn step_all(&mut self, steps: &[(i8, i8)]) {
        for &step in steps {
            let to = self.target(self.from, step);
            self.add(to);
        }
    }

    fn slide_all(&mut self, rays: &[(i8, i8)]) {
        for &ray in rays {
            let mut cur = self.from;
            while let Some(next) = self.target(cur, ray) {
                if !self.add(Some(next)) {
                    break;
                }
                cur = next;
            }
        }
    }
}
