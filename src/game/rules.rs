//! リバーシのルール実装モジュール
//! 合法手の判定、石のフリップ処理、終局判定を担当する。

use super::board::Board;
use super::types::{Player, Position, Score, Winner, BOARD_SIZE};
use crate::error::{GameError, Result};

/// 盤面上の8方向への移動ベクトル
const DIRECTIONS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// リバーシのルールを実装する構造体
/// スタティックメソッドのみを提供する
pub struct ReversiRules;

impl ReversiRules {
    /// 指定した位置にプレイヤーが置けるかチェックする
    /// 盤外・既に石がある位置はレイ走査の前に弾く
    pub fn is_legal(board: &Board, position: Position, player: Player) -> bool {
        if !position.is_valid() || !board.is_empty(position) {
            return false;
        }

        DIRECTIONS
            .iter()
            .any(|&(dr, dc)| !Self::bracketed_run(board, position, player, dr, dc).is_empty())
    }

    /// 指定した位置に石を置いた場合にフリップされる石の位置を返す
    /// 各方向を独立に走査し、自分の石で挟めた連続した相手の石だけを集める
    pub fn flips(board: &Board, position: Position, player: Player) -> Vec<Position> {
        if !position.is_valid() || !board.is_empty(position) {
            return Vec::new();
        }

        DIRECTIONS
            .iter()
            .flat_map(|&(dr, dc)| Self::bracketed_run(board, position, player, dr, dc))
            .collect()
    }

    /// 1方向の走査
    /// 相手の石の連続が自分の石で終わればその連続を、空マスか盤端で終われば空を返す
    fn bracketed_run(board: &Board, position: Position, player: Player, dr: i8, dc: i8) -> Vec<Position> {
        let player_cell = player.to_cell();
        let opponent_cell = player.opposite().to_cell();
        let mut run = Vec::new();
        let mut current = position.offset(dr, dc);

        while let Some(pos) = current {
            match board.get_cell(pos) {
                Some(cell) if cell == opponent_cell => run.push(pos),
                Some(cell) if cell == player_cell => return run,
                _ => break,
            }
            current = pos.offset(dr, dc);
        }

        Vec::new()
    }

    /// 手を盤面に適用し、裏返した石の位置を返す
    /// 非合法手の場合は盤面を変更せずにエラーを返す
    pub fn apply(board: &mut Board, position: Position, player: Player) -> Result<Vec<Position>> {
        if !position.is_valid() {
            return Err(GameError::OutOfBounds { row: position.row, col: position.col });
        }
        if !board.is_empty(position) {
            return Err(GameError::Occupied { position });
        }

        let flipped = Self::flips(board, position, player);
        if flipped.is_empty() {
            return Err(GameError::IllegalMove { position, player });
        }

        board.place_disc(position, player);
        for &pos in &flipped {
            board.place_disc(pos, player);
        }

        debug_assert!(!flipped.is_empty(), "applied move {} flipped nothing", position);
        Ok(flipped)
    }

    /// 指定したプレイヤーの合法手を全て取得する
    /// 行優先で64マスを走査するので、同じ入力には常に同じ順序を返す
    pub fn legal_moves(board: &Board, player: Player) -> Vec<Position> {
        (0..BOARD_SIZE)
            .flat_map(|row| (0..BOARD_SIZE).map(move |col| Position { row, col }))
            .filter(|&pos| Self::is_legal(board, pos, player))
            .collect()
    }

    /// 指定したプレイヤーに合法手があるかチェックする
    pub fn has_legal_moves(board: &Board, player: Player) -> bool {
        (0..BOARD_SIZE)
            .flat_map(|row| (0..BOARD_SIZE).map(move |col| Position { row, col }))
            .any(|pos| Self::is_legal(board, pos, player))
    }

    /// 終局判定（両プレイヤーとも合法手がない）
    pub fn is_game_over(board: &Board) -> bool {
        !Self::has_legal_moves(board, Player::Black) && !Self::has_legal_moves(board, Player::White)
    }

    pub fn score(board: &Board) -> Score {
        board.count_pieces()
    }

    /// 終局している場合のみ勝者を返す
    pub fn winner(board: &Board) -> Option<Winner> {
        if Self::is_game_over(board) {
            Some(board.count_pieces().leader())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Cell;

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col).unwrap()
    }

    #[test]
    fn test_is_legal_initial_board() {
        let board = Board::new();

        assert!(ReversiRules::is_legal(&board, pos(2, 3), Player::Black));
        assert!(ReversiRules::is_legal(&board, pos(3, 2), Player::Black));
        assert!(ReversiRules::is_legal(&board, pos(4, 5), Player::Black));
        assert!(ReversiRules::is_legal(&board, pos(5, 4), Player::Black));

        assert!(!ReversiRules::is_legal(&board, pos(0, 0), Player::Black));
        assert!(!ReversiRules::is_legal(&board, pos(3, 3), Player::Black));
        assert!(!ReversiRules::is_legal(&board, Position { row: 8, col: 3 }, Player::Black));
    }

    #[test]
    fn test_flips_single_direction() {
        let board = Board::new();

        let flipped = ReversiRules::flips(&board, pos(2, 3), Player::Black);
        assert_eq!(flipped, vec![pos(3, 3)]);
    }

    #[test]
    fn test_flips_multiple_directions() {
        let board = Board::from_rows(&[
            "........",
            "........",
            "..B.B...",
            "...W....",
            "..BW.WB.",
            "........",
            "........",
            "........",
        ])
        .unwrap();

        let mut flipped = ReversiRules::flips(&board, pos(4, 4), Player::Black);
        flipped.sort();
        // 左(4,3)、右(4,5)、左上(3,3)。真上は(3,4)が空なので挟めない
        assert_eq!(flipped, vec![pos(3, 3), pos(4, 3), pos(4, 5)]);
    }

    #[test]
    fn test_unbounded_run_is_not_flipped() {
        let board = Board::from_rows(&[
            "........",
            "........",
            "........",
            "...WWWW.",
            "........",
            "........",
            "........",
            "........",
        ])
        .unwrap();

        assert!(ReversiRules::flips(&board, pos(3, 2), Player::Black).is_empty());
        assert!(!ReversiRules::is_legal(&board, pos(3, 2), Player::Black));
    }

    #[test]
    fn test_legal_moves_initial() {
        let board = Board::new();
        let moves = ReversiRules::legal_moves(&board, Player::Black);

        assert_eq!(moves, vec![pos(2, 3), pos(3, 2), pos(4, 5), pos(5, 4)]);
        assert_eq!(moves, ReversiRules::legal_moves(&board, Player::Black));
    }

    #[test]
    fn test_apply_move() {
        let mut board = Board::new();

        let flipped = ReversiRules::apply(&mut board, pos(2, 3), Player::Black).unwrap();
        assert_eq!(flipped, vec![pos(3, 3)]);
        assert_eq!(board.get_cell(pos(2, 3)), Some(Cell::Black));
        assert_eq!(board.get_cell(pos(3, 3)), Some(Cell::Black));
        assert_eq!(board.count_pieces(), Score { black: 4, white: 1 });
    }

    #[test]
    fn test_apply_illegal_move_leaves_board_untouched() {
        let mut board = Board::new();
        let before = board;

        let result = ReversiRules::apply(&mut board, pos(0, 0), Player::Black);
        assert!(matches!(result, Err(GameError::IllegalMove { .. })));

        let result = ReversiRules::apply(&mut board, pos(3, 3), Player::Black);
        assert!(matches!(result, Err(GameError::Occupied { .. })));

        let result = ReversiRules::apply(&mut board, Position { row: 0, col: 9 }, Player::Black);
        assert!(matches!(result, Err(GameError::OutOfBounds { .. })));

        assert_eq!(board, before);
    }

    #[test]
    fn test_has_legal_moves() {
        let board = Board::new();

        assert!(ReversiRules::has_legal_moves(&board, Player::Black));
        assert!(ReversiRules::has_legal_moves(&board, Player::White));
        assert!(!ReversiRules::is_game_over(&board));
        assert_eq!(ReversiRules::winner(&board), None);
    }

    #[test]
    fn test_winner_when_no_moves_remain() {
        let board = Board::from_rows(&[
            "BBBB....",
            "........",
            "........",
            "........",
            "........",
            "........",
            "........",
            "....WWWW",
        ])
        .unwrap();

        assert!(ReversiRules::is_game_over(&board));
        assert_eq!(ReversiRules::winner(&board), Some(Winner::Tie));
        assert_eq!(ReversiRules::score(&board), Score { black: 4, white: 4 });
    }
}
