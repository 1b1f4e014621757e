//! UIやストアから使われるエンジンの窓口
//! 盤面を1つ所有し、座標 (x, y) = (row, col) 形式の単純なAPIを提供する。
//! 拒否された操作は空の結果や `false` で表し、パニックしない。

use super::board::Board;
use super::rules::ReversiRules;
use super::types::{Player, Position, Score, Winner};
use crate::replay::{self, ReplayMove};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReversiEngine {
    board: Board,
}

impl ReversiEngine {
    pub fn new() -> Self {
        Self { board: Board::new() }
    }

    pub fn with_board(board: Board) -> Self {
        Self { board }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_valid_move(&self, x: usize, y: usize, player: Player) -> bool {
        Position::new(x, y).is_some_and(|pos| ReversiRules::is_legal(&self.board, pos, player))
    }

    /// 手を適用して裏返した石の位置を返す
    /// 空のVecは着手が拒否されたことを表す（盤面は変わらない）
    pub fn make_move(&mut self, x: usize, y: usize, player: Player) -> Vec<Position> {
        let Some(position) = Position::new(x, y) else {
            return Vec::new();
        };

        match ReversiRules::apply(&mut self.board, position, player) {
            Ok(flipped) => flipped,
            Err(err) => {
                tracing::debug!(%err, "engine rejected move");
                Vec::new()
            }
        }
    }

    pub fn get_valid_moves(&self, player: Player) -> Vec<Position> {
        ReversiRules::legal_moves(&self.board, player)
    }

    pub fn is_game_over(board: &Board) -> bool {
        ReversiRules::is_game_over(board)
    }

    pub fn get_score(board: &Board) -> Score {
        ReversiRules::score(board)
    }

    /// 終局前はNone
    pub fn get_winner(board: &Board) -> Option<Winner> {
        ReversiRules::winner(board)
    }

    pub fn reconstruct_game_from_moves(moves: &[ReplayMove]) -> Vec<Board> {
        replay::reconstruct_game_from_moves(moves)
    }
}
