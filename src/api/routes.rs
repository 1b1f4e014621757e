use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use super::{
    handlers::{
        cancel_ai_move, create_game, delete_game, finish_game, get_game, get_history, health_check, make_move,
        pass_move, pause_game, replay_moves, request_ai_move, reset_game, resume_game, start_game, undo_move,
        update_settings, AppState,
    },
    middleware::{cors, logging},
};
use crate::config::ServerConfig;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/games", post(create_game))
        .route("/api/games/:id", get(get_game).delete(delete_game))
        .route("/api/games/:id/move", post(make_move))
        .route("/api/games/:id/pass", post(pass_move))
        .route("/api/games/:id/undo", post(undo_move))
        .route("/api/games/:id/pause", post(pause_game))
        .route("/api/games/:id/resume", post(resume_game))
        .route("/api/games/:id/finish", post(finish_game))
        .route("/api/games/:id/reset", post(reset_game))
        .route("/api/games/:id/start", post(start_game))
        .route("/api/games/:id/ai-move", post(request_ai_move).delete(cancel_ai_move))
        .route("/api/games/:id/settings", put(update_settings))
        .route("/api/games/:id/history", get(get_history))
        .route("/api/replay", post(replay_moves))
        .with_state(state)
}

/// サーバー設定に応じてミドルウェアを付けたルーター
pub fn create_app(state: AppState, server: &ServerConfig) -> Router {
    let mut router = create_router(state);
    if server.enable_cors {
        router = router.layer(middleware::from_fn(cors));
    }
    if server.enable_logging {
        router = router.layer(middleware::from_fn(logging));
    }
    router
}
