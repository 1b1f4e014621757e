//! アプリケーション全体のエラー定義モジュール
//! エンジン、セッション操作、棋譜レコードのエラーを統一管理。

use thiserror::Error;

use crate::game::{Player, Position};

/// エンジン（盤面・ルール）に関連するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Position ({row}, {col}) is out of bounds")]
    OutOfBounds { row: usize, col: usize },

    #[error("Position {position} is already occupied")]
    Occupied { position: Position },

    #[error("Move {position} flips nothing for {player}")]
    IllegalMove { position: Position, player: Player },

    #[error("Invalid board layout: {reason}")]
    InvalidLayout { reason: String },
}

/// セッション操作が拒否された理由
/// `Err` が返ったときセッションの状態は一切変わっていない
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionRejected {
    #[error("Game is not in progress")]
    NotPlaying,

    #[error("AI is currently thinking")]
    AiThinking,

    #[error("It is the AI's turn")]
    AiTurn,

    #[error("Move {position} is not legal for {player}")]
    IllegalMove { position: Position, player: Player },

    #[error("No move to undo")]
    NothingToUndo,

    #[error("Pass is only allowed when the current player has no legal move")]
    PassNotAllowed,

    #[error("AI has no move to play")]
    NoAiMove,

    #[error("Game already finished")]
    Finished,
}

/// 永続化レコードの解釈に関連するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Coordinate ({x}, {y}) is out of bounds")]
    OutOfBounds { x: usize, y: usize },

    #[error("Unknown player: {value}")]
    UnknownPlayer { value: String },

    #[error("Invalid move notation: {value}")]
    InvalidNotation { value: String },
}

/// ゲームエラーをベースとした結果型
pub type Result<T> = std::result::Result<T, GameError>;
