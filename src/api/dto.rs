//! HTTP API データ転送オブジェクト (DTO)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ActionRejected, RecordError};
use crate::game::{Board, Cell, Move, Player, Position, Score, Winner, BOARD_SIZE};
use crate::replay::{MoveRecord, Reconstruction};
use crate::session::{GameSettings, ManagedSession, ManagerError, MoveOutcome, SessionStatus};

/// 盤面を 0: 空, 1: 黒, 2: 白 の2次元配列で表す
pub fn board_to_grid(board: &Board) -> [[u8; BOARD_SIZE]; BOARD_SIZE] {
    let mut grid = [[0u8; BOARD_SIZE]; BOARD_SIZE];
    for (row, cells) in board.cells().iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            grid[row][col] = match cell {
                Cell::Empty => 0,
                Cell::Black => 1,
                Cell::White => 2,
            };
        }
    }
    grid
}

/// 対局の現在状態
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResponse {
    pub id: Uuid,
    pub board: [[u8; BOARD_SIZE]; BOARD_SIZE],
    pub current_player: Player,
    pub valid_moves: Vec<Position>,
    pub must_pass: bool,
    pub status: SessionStatus,
    pub score: Score,
    pub winner: Option<Winner>,
    pub move_count: usize,
    pub ai_thinking: bool,
    pub settings: GameSettings,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl GameResponse {
    pub fn from_managed(managed: &ManagedSession) -> Self {
        let session = &managed.session;
        Self {
            id: managed.id,
            board: board_to_grid(session.board()),
            current_player: session.current_player(),
            valid_moves: session.legal_moves().to_vec(),
            must_pass: session.must_pass(),
            status: session.status(),
            score: session.score(),
            winner: session.winner(),
            move_count: session.move_count(),
            ai_thinking: session.ai_thinking(),
            settings: session.settings().clone(),
            created_at: managed.created_at,
            last_activity: managed.last_activity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakeMoveRequest {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveResponse {
    pub outcome: MoveOutcome,
    pub game: GameResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoResponse {
    /// 新しい順。AIモードではAIの応手も含む
    pub undone: Vec<Move>,
    pub game: GameResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub game_id: Uuid,
    pub moves: Vec<MoveRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayRequest {
    pub moves: Vec<MoveRecord>,
}

/// 再生結果。`snapshots[0]` は初期盤面で、`snapshots[i]` は i 手目の後の盤面
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayResponse {
    pub snapshots: Vec<[[u8; BOARD_SIZE]; BOARD_SIZE]>,
    pub invalid_steps: Vec<usize>,
    pub final_score: Score,
}

impl From<&Reconstruction> for ReplayResponse {
    fn from(reconstruction: &Reconstruction) -> Self {
        Self {
            snapshots: reconstruction.snapshots.iter().map(board_to_grid).collect(),
            invalid_steps: reconstruction.invalid_steps.clone(),
            final_score: reconstruction.final_board().map(Board::count_pieces).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub active_sessions: usize,
    pub max_sessions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("ゲームセッションが見つかりません: {game_id}")]
    GameNotFound { game_id: Uuid },

    #[error("セッション制限に達しています (最大: {max})")]
    MaxSessionsReached { max: usize },

    #[error("操作が拒否されました: {0}")]
    Rejected(ActionRejected),

    #[error("無効な棋譜です: {0}")]
    InvalidRecord(#[from] RecordError),

    #[error("無効なリクエストです: {details}")]
    BadRequest { details: String },
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::GameNotFound { .. } => "GAME_NOT_FOUND",
            ApiError::MaxSessionsReached { .. } => "MAX_SESSIONS_REACHED",
            ApiError::Rejected(ActionRejected::IllegalMove { .. }) => "ILLEGAL_MOVE",
            ApiError::Rejected(ActionRejected::AiThinking) => "AI_THINKING",
            ApiError::Rejected(ActionRejected::AiTurn) => "AI_TURN",
            ApiError::Rejected(ActionRejected::Finished) => "GAME_ALREADY_FINISHED",
            ApiError::Rejected(_) => "ACTION_REJECTED",
            ApiError::InvalidRecord(_) => "INVALID_RECORD",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::GameNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::MaxSessionsReached { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Rejected(ActionRejected::IllegalMove { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(_) => StatusCode::CONFLICT,
            ApiError::InvalidRecord(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<ManagerError> for ApiError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::NotFound { game_id } => ApiError::GameNotFound { game_id },
            ManagerError::MaxSessionsReached { max } => ApiError::MaxSessionsReached { max },
            ManagerError::Rejected(reason) => ApiError::Rejected(reason),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.error_code().to_string(),
            message: self.to_string(),
            timestamp: Utc::now(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;
