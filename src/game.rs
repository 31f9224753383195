use log::debug;

use crate::board::{Board, Piece, PieceKind, Side, Square};
use crate::check::is_in_check;
use crate::error::{Result, ShogiError};
use crate::kifu::{Kifu, MoveRecord};
use crate::legal::{legal_moves, Simulation};
use crate::movegen::MoveList;
use crate::notation::{promotion_applies, Origin, Promotion, Selection};
use crate::position_key::{self, parse_hands, Hand, PositionKey};
use crate::usi::{parse_usi_move, UsiMove};

/// 対局の状態。盤面・持ち駒・手番・棋譜をまとめて持つ。
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    hands: [Hand; 2],
    side_to_move: Side,
    kifu: Kifu,
}

impl Default for Game {
    fn default() -> Self {
        Game {
            board: Board::startpos(),
            hands: [Hand::default(); 2],
            side_to_move: Side::Black,
            kifu: Kifu::new(),
        }
    }
}

impl Game {
    pub fn new() -> Self {
        Self::default()
    }

    /// `"startpos"` または SFEN（先頭の `"sfen "` は省略可）から対局を作る。
    ///
    /// 手数フィールドがあればそれを次の手数とし、手番と偶奇が合わなければエラー。
    pub fn from_sfen(sfen: &str) -> Result<Self> {
        let sfen = sfen.trim();
        if sfen == "startpos" {
            return Ok(Self::new());
        }
        let sfen = sfen.strip_prefix("sfen ").unwrap_or(sfen);
        let fields: Vec<&str> = sfen.split_whitespace().collect();
        if fields.len() < 2 || fields.len() > 4 {
            return Err(ShogiError::InvalidSfen(sfen.to_string()));
        }

        let board = Board::from_sfen_board(fields[0])?;
        let side_to_move = match fields[1] {
            "b" => Side::Black,
            "w" => Side::White,
            other => return Err(ShogiError::InvalidSfen(format!("unknown side {other:?}"))),
        };
        let hands = parse_hands(fields.get(2).copied().unwrap_or("-"))?;
        let first_number = match fields.get(3) {
            Some(n) => n
                .parse::<u32>()
                .ok()
                .filter(|&n| n > 0 && Side::from_move_number(n) == side_to_move)
                .ok_or_else(|| ShogiError::InvalidSfen(format!("bad move number {n:?}")))?,
            None => match side_to_move {
                Side::Black => 1,
                Side::White => 2,
            },
        };

        Ok(Game {
            board,
            hands,
            side_to_move,
            kifu: Kifu::starting_at(first_number),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn hand(&self, side: Side) -> &Hand {
        &self.hands[side.index()]
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    pub fn kifu(&self) -> &Kifu {
        &self.kifu
    }

    /// 手番側の玉に王手がかかっているか。
    pub fn is_in_check(&self) -> bool {
        is_in_check(self.side_to_move, &self.board)
    }

    pub fn legal_moves(&mut self, from: Square) -> Result<MoveList> {
        legal_moves(from, &mut self.board)
    }

    /// 手番側が `kind` を打てるマス（持ち駒の有無は問わない）。
    ///
    /// 空きマスで、行き所のない段でなく、二歩にならず、自玉に王手が残らないこと。
    /// 打ち歩詰めは判定しない。
    pub fn drop_targets(&mut self, kind: PieceKind) -> Result<Vec<Square>> {
        let side = self.side_to_move;
        if kind == PieceKind::King {
            return Err(ShogiError::NotInHand { side, kind });
        }
        let piece = Piece::new(kind, side);

        let mut targets = Vec::new();
        for sq in Square::iter() {
            if self.board.piece_at(sq).is_some()
                || sq.relative_rank(side) < kind.dead_ranks()
                || (kind == PieceKind::Pawn && self.has_pawn_on_file(side, sq.file()))
            {
                continue;
            }
            let safe = {
                let mut sim = Simulation::new(&mut self.board);
                sim.put(sq, piece);
                !is_in_check(side, sim.board())
            };
            if safe {
                targets.push(sq);
            }
        }
        Ok(targets)
    }

    fn has_pawn_on_file(&self, side: Side, file: u8) -> bool {
        self.board.pieces().any(|(sq, p)| {
            sq.file() == file && p.side == side && p.kind == PieceKind::Pawn && !p.promoted
        })
    }

    pub fn position_key(&self) -> PositionKey {
        PositionKey::new(&self.board, self.side_to_move, &self.hands)
    }

    pub fn digest(&self) -> u64 {
        position_key::digest(&self.board, self.side_to_move, &self.hands)
    }

    pub fn to_sfen(&self) -> String {
        format!("{} {}", self.position_key(), self.kifu.next_number())
    }

    /// USI の指し手を、現局面に合わせた `Selection` にする。
    ///
    /// `+` のない手は、成れる手なら不成、成れない手なら `NotApplicable` になる。
    pub fn selection_for(&self, mv: UsiMove) -> Result<Selection> {
        match mv {
            UsiMove::Normal { from, to, promote } => {
                let piece = self.board.piece_at(from).ok_or(ShogiError::NoPieceAt(from))?;
                let promotion = if promote {
                    Promotion::Promote
                } else if promotion_applies(piece, from, to) {
                    Promotion::Decline
                } else {
                    Promotion::NotApplicable
                };
                Ok(Selection::normal(from, to, promotion))
            }
            UsiMove::Drop { kind, to } => Ok(Selection::drop(kind, to)),
        }
    }

    pub fn apply_usi(&mut self, s: &str) -> Result<&MoveRecord> {
        let mv = parse_usi_move(s)?;
        let selection = self.selection_for(mv)?;
        self.apply(selection)
    }

    /// 指し手を検証して局面を進め、棋譜に追加した記録を返す。
    ///
    /// エラーのときは局面も棋譜も変わらない。
    pub fn apply(&mut self, selection: Selection) -> Result<&MoveRecord> {
        match selection.origin {
            Origin::Board(from) => self.apply_normal(selection, from),
            Origin::Hand(kind) => self.apply_drop(selection, kind),
        }
    }

    fn apply_normal(&mut self, selection: Selection, from: Square) -> Result<&MoveRecord> {
        let to = selection.destination;
        let side = self.side_to_move;
        let piece = self.board.piece_at(from).ok_or(ShogiError::NoPieceAt(from))?;
        if piece.side != side {
            return Err(ShogiError::NotSideToMove { square: from, side });
        }
        if !legal_moves(from, &mut self.board)?.contains(&to) {
            return Err(ShogiError::IllegalMove { from, to });
        }

        let promote = match selection.promotion {
            Promotion::Promote => {
                if !promotion_applies(piece, from, to) {
                    return Err(ShogiError::PromotionNotAllowed { from, to });
                }
                true
            }
            Promotion::Decline | Promotion::NotApplicable => {
                if !piece.promoted && to.relative_rank(side) < piece.kind.dead_ranks() {
                    return Err(ShogiError::PromotionRequired { from, to });
                }
                false
            }
        };

        let record = self.kifu.record(&selection, piece, &self.board)?;

        if let Some(captured) = self.board.piece_at(to) {
            self.hands[side.index()].add(captured.kind);
        }
        self.board.clear(from);
        self.board.place(to, if promote { piece.promote() } else { piece });
        self.side_to_move = side.flip();

        debug!("{}: {}{}{}", record.notation(), from, to, if promote { "+" } else { "" });
        Ok(record)
    }

    fn apply_drop(&mut self, selection: Selection, kind: PieceKind) -> Result<&MoveRecord> {
        let to = selection.destination;
        let side = self.side_to_move;
        if self.hands[side.index()].count(kind) == 0 {
            return Err(ShogiError::NotInHand { side, kind });
        }
        if self.board.piece_at(to).is_some() {
            return Err(ShogiError::DropOnOccupied(to));
        }
        if !self.drop_targets(kind)?.contains(&to) {
            return Err(ShogiError::IllegalDrop { kind, to });
        }

        let piece = Piece::new(kind, side);
        let record = self.kifu.record(&selection, piece, &self.board)?;

        self.hands[side.index()].take(kind);
        self.board.place(to, piece);
        self.side_to_move = side.flip();

        debug!("{}: {}*{}", record.notation(), kind.sfen_char(), to);
        Ok(record)
    }
}
