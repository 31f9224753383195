use arrayvec::ArrayVec;
use log::trace;

use crate::board::{Board, Piece, Square};
use crate::check::is_in_check;
use crate::error::{Result, ShogiError};
use crate::movegen::{piece_moves, MoveList};

const MAX_SAVED_SQUARES: usize = 4;

/// 盤面を一時的に書き換えるためのガード。
///
/// 書き換えたマスの元の中身を覚えておき、ガードが破棄されるときに逆順で書き戻す。
/// 途中で `?` やパニックで抜けても盤面は元に戻る。
///
/// 覚えられるのは 4 マスまで（`relocate` なら 2 回、`put` なら 4 回）。
pub(crate) struct Simulation<'a> {
    board: &'a mut Board,
    saved: ArrayVec<(Square, Option<Piece>), MAX_SAVED_SQUARES>,
}

impl<'a> Simulation<'a> {
    pub(crate) fn new(board: &'a mut Board) -> Self {
        Simulation {
            board,
            saved: ArrayVec::new(),
        }
    }

    fn save(&mut self, sq: Square) {
        debug_assert!(
            !self.saved.is_full(),
            "Simulation can remember at most {MAX_SAVED_SQUARES} squares"
        );
        let slot = self.board.piece_at(sq);
        self.saved.push((sq, slot));
    }

    /// `from` の駒を `to` へ動かす（`to` の駒は取られたものとして消える）。
    pub(crate) fn relocate(&mut self, from: Square, to: Square) {
        self.save(from);
        self.save(to);
        let moving = self.board.piece_at(from);
        self.board.clear(from);
        self.board.set(to, moving);
    }

    /// 駒を打つ。
    pub(crate) fn put(&mut self, sq: Square, piece: Piece) {
        self.save(sq);
        self.board.place(sq, piece);
    }

    pub(crate) fn board(&self) -> &Board {
        &*self.board
    }
}

impl Drop for Simulation<'_> {
    fn drop(&mut self) {
        while let Some((sq, slot)) = self.saved.pop() {
            self.board.set(sq, slot);
        }
    }
}

/// `sq` の駒の合法な行き先。自玉に王手がかかったままになる手を除く。
///
/// 盤面は各候補ごとに書き換えて戻すため、呼び出し前後で完全に一致する。
pub fn legal_moves(sq: Square, board: &mut Board) -> Result<MoveList> {
    let piece = board.piece_at(sq).ok_or(ShogiError::NoPieceAt(sq))?;
    let raw = piece_moves(sq, piece, board);

    let mut legal = MoveList::new();
    for to in raw {
        let exposes_king = {
            let mut sim = Simulation::new(board);
            sim.relocate(sq, to);
            is_in_check(piece.side, sim.board())
        };
        if exposes_king {
            trace!("{sq}{to} leaves {:?} king in check", piece.side);
        } else {
            legal.push(to);
        }
    }
    Ok(legal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{PieceKind, Side};
    use crate::movegen::raw_moves;

    fn board(field: &str) -> Board {
        Board::from_sfen_board(field).unwrap()
    }

    fn usi(s: &str) -> Square {
        Square::from_usi(s).unwrap()
    }

    #[test]
    fn test_board_is_restored_after_every_call() {
        let fields = [
            crate::board::STARTPOS_BOARD,
            "4k4/9/4r4/9/9/9/4B4/4K4/9",
            "l3k3l/1r5b1/p1pp1pppp/4p4/1p7/2P6/PP1PPPPPP/1B5R1/L3K3L",
        ];
        for field in fields {
            let mut b = board(field);
            let before = b.clone();
            for (from, _) in before.pieces() {
                legal_moves(from, &mut b).unwrap();
                assert_eq!(b, before, "board changed by legal_moves({from})");
            }
        }
    }

    #[test]
    fn test_pinned_piece_keeps_only_line_moves() {
        // ５筋: 後手飛車 - 先手角 - 先手玉
        let mut b = board("4k4/9/4r4/9/9/9/4B4/4K4/9");
        let bishop = usi("5g");
        assert!(!raw_moves(bishop, &b).unwrap().is_empty());
        assert!(legal_moves(bishop, &mut b).unwrap().is_empty());

        // 飛車で縛られた香は縦には動ける
        let mut b = board("4k4/9/4r4/9/9/9/4L4/4K4/9");
        let lance = usi("5g");
        let mut moves: Vec<Square> = legal_moves(lance, &mut b).unwrap().into_iter().collect();
        moves.sort();
        let mut expected = vec![usi("5f"), usi("5e"), usi("5d"), usi("5c")];
        expected.sort();
        assert_eq!(moves, expected);
    }

    #[test]
    fn test_pin_allows_capture_of_pinner() {
        let mut b = board("4k4/9/9/9/4r4/4R4/9/9/4K4");
        let rook = usi("5f");
        let moves = legal_moves(rook, &mut b).unwrap();
        assert!(moves.contains(&usi("5e")));
        assert!(moves.contains(&usi("5g")));
        assert!(!moves.contains(&usi("4f")));
        assert!(!moves.contains(&usi("6f")));
    }

    #[test]
    fn test_king_cannot_step_into_attack() {
        let mut b = board("4k4/9/9/9/9/9/9/3r5/4K4");
        let moves = legal_moves(usi("5i"), &mut b).unwrap();
        // ６八の飛車は取れるが、６筋・八段へは逃げられない
        assert!(moves.contains(&usi("6h")));
        assert!(!moves.contains(&usi("5h")));
        assert!(!moves.contains(&usi("4h")));
        assert!(!moves.contains(&usi("6i")));
        assert!(moves.contains(&usi("4i")));
    }

    #[test]
    fn test_every_legal_move_avoids_self_check() {
        let mut b = board("l3k3l/1r5b1/p1pp1pppp/4p4/1p7/2P6/PP1PPPPPP/1B5R1/L3K3L");
        let pieces: Vec<(Square, Piece)> = b.pieces().collect();
        for (from, piece) in pieces {
            for to in legal_moves(from, &mut b).unwrap() {
                let mut sim = Simulation::new(&mut b);
                sim.relocate(from, to);
                assert!(!is_in_check(piece.side, sim.board()), "{from}{to}");
            }
        }
    }

    #[test]
    fn test_simulation_restores_on_drop() {
        let mut b = Board::startpos();
        let before = b.clone();
        {
            let mut sim = Simulation::new(&mut b);
            sim.relocate(usi("7g"), usi("7f"));
            sim.put(usi("5e"), Piece::new(PieceKind::Gold, Side::Black));
            assert_eq!(sim.board().piece_at(usi("7g")), None);
        }
        assert_eq!(b, before);
    }

    #[test]
    fn test_simulation_restores_two_relocations() {
        let mut b = Board::startpos();
        let before = b.clone();
        {
            let mut sim = Simulation::new(&mut b);
            sim.relocate(usi("7g"), usi("7f"));
            sim.relocate(usi("3c"), usi("3d"));
            assert_eq!(sim.board().piece_at(usi("3c")), None);
        }
        assert_eq!(b, before);
    }

    #[test]
    #[should_panic]
    fn test_simulation_rejects_third_relocation() {
        let mut b = Board::startpos();
        let mut sim = Simulation::new(&mut b);
        sim.relocate(usi("7g"), usi("7f"));
        sim.relocate(usi("3c"), usi("3d"));
        sim.relocate(usi("2g"), usi("2f"));
    }

    #[test]
    fn test_empty_square_is_error() {
        let mut b = Board::empty();
        assert_eq!(
            legal_moves(usi("5e"), &mut b),
            Err(ShogiError::NoPieceAt(usi("5e")))
        );
    }
}
