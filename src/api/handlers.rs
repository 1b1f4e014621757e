use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::dto::{
    ApiError, ApiResult, GameResponse, HealthResponse, HistoryResponse, MakeMoveRequest, MoveResponse,
    ReplayRequest, ReplayResponse, UndoResponse,
};
use crate::game::Position;
use crate::replay::{reconstruct, records_to_replay, MoveRecord};
use crate::session::{GameSessionManager, GameSettings, SettingsUpdate};

#[derive(Debug, Clone)]
pub struct AppState {
    pub manager: Arc<GameSessionManager>,
    /// 新規対局で未指定の項目に使う既定値
    pub defaults: GameSettings,
}

impl AppState {
    pub fn new(manager: Arc<GameSessionManager>, defaults: GameSettings) -> Self {
        Self { manager, defaults }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(GameSessionManager::default()), GameSettings::default())
    }
}

fn game_response(state: &AppState, id: &Uuid) -> Result<GameResponse, ApiError> {
    Ok(state.manager.with_session(id, GameResponse::from_managed)?)
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.manager.get_stats();
    Json(HealthResponse {
        status: "ok".to_string(),
        active_sessions: stats.total_sessions,
        max_sessions: stats.max_sessions,
    })
}

pub async fn create_game(
    State(state): State<AppState>,
    Json(payload): Json<SettingsUpdate>,
) -> Result<(StatusCode, Json<GameResponse>), ApiError> {
    let mut settings = state.defaults.clone();
    settings.apply(&payload);

    let id = state.manager.create_session(settings)?;
    info!(game_id = %id, "game created via api");
    Ok((StatusCode::CREATED, Json(game_response(&state, &id)?)))
}

pub async fn get_game(State(state): State<AppState>, Path(game_id): Path<Uuid>) -> ApiResult<GameResponse> {
    Ok(Json(game_response(&state, &game_id)?))
}

pub async fn delete_game(State(state): State<AppState>, Path(game_id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    state.manager.remove_session(&game_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn make_move(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    Json(payload): Json<MakeMoveRequest>,
) -> ApiResult<MoveResponse> {
    let position = Position::new(payload.row, payload.col).ok_or_else(|| ApiError::BadRequest {
        details: format!("座標が範囲外です: ({}, {})", payload.row, payload.col),
    })?;

    let outcome = state.manager.make_move(&game_id, position.row, position.col)?;
    Ok(Json(MoveResponse {
        outcome,
        game: game_response(&state, &game_id)?,
    }))
}

pub async fn pass_move(State(state): State<AppState>, Path(game_id): Path<Uuid>) -> ApiResult<GameResponse> {
    state.manager.pass_move(&game_id)?;
    Ok(Json(game_response(&state, &game_id)?))
}

pub async fn undo_move(State(state): State<AppState>, Path(game_id): Path<Uuid>) -> ApiResult<UndoResponse> {
    let undone = state.manager.undo_move(&game_id)?;
    Ok(Json(UndoResponse {
        undone,
        game: game_response(&state, &game_id)?,
    }))
}

pub async fn pause_game(State(state): State<AppState>, Path(game_id): Path<Uuid>) -> ApiResult<GameResponse> {
    state.manager.pause_game(&game_id)?;
    Ok(Json(game_response(&state, &game_id)?))
}

pub async fn resume_game(State(state): State<AppState>, Path(game_id): Path<Uuid>) -> ApiResult<GameResponse> {
    state.manager.resume_game(&game_id)?;
    Ok(Json(game_response(&state, &game_id)?))
}

pub async fn finish_game(State(state): State<AppState>, Path(game_id): Path<Uuid>) -> ApiResult<GameResponse> {
    state.manager.finish_game(&game_id)?;
    Ok(Json(game_response(&state, &game_id)?))
}

pub async fn reset_game(State(state): State<AppState>, Path(game_id): Path<Uuid>) -> ApiResult<GameResponse> {
    state.manager.reset_game(&game_id)?;
    Ok(Json(game_response(&state, &game_id)?))
}

pub async fn start_game(State(state): State<AppState>, Path(game_id): Path<Uuid>) -> ApiResult<GameResponse> {
    state.manager.start_game(&game_id)?;
    Ok(Json(game_response(&state, &game_id)?))
}

/// AIに現在の手番を打たせる。着手は演出時間後に非同期で行われる
pub async fn request_ai_move(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> Result<(StatusCode, Json<GameResponse>), ApiError> {
    state.manager.schedule_ai_move(&game_id)?;
    Ok((StatusCode::ACCEPTED, Json(game_response(&state, &game_id)?)))
}

pub async fn cancel_ai_move(State(state): State<AppState>, Path(game_id): Path<Uuid>) -> ApiResult<GameResponse> {
    state.manager.cancel_ai_move(&game_id)?;
    Ok(Json(game_response(&state, &game_id)?))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    Json(payload): Json<SettingsUpdate>,
) -> ApiResult<GameResponse> {
    state.manager.update_settings(&game_id, &payload)?;
    Ok(Json(game_response(&state, &game_id)?))
}

pub async fn get_history(State(state): State<AppState>, Path(game_id): Path<Uuid>) -> ApiResult<HistoryResponse> {
    let moves = state
        .manager
        .with_session(&game_id, |managed| managed.session.moves().map(MoveRecord::from).collect())?;
    Ok(Json(HistoryResponse { game_id, moves }))
}

/// 保存済みの棋譜を初期盤面から再生する
/// 非合法な手は盤面を変えずに `invalid_steps` に記録される
pub async fn replay_moves(Json(payload): Json<ReplayRequest>) -> ApiResult<ReplayResponse> {
    let moves = records_to_replay(&payload.moves)?;
    let reconstruction = reconstruct(&moves);
    Ok(Json(ReplayResponse::from(&reconstruction)))
}
