//! Reversi APIサーバーのエントリポイント
//! 設定読み込み、ログ初期化、HTTPサーバー起動を行う。

use std::sync::Arc;
use std::time::Duration;

use reversi_engine::{
    api::{create_app, AppState},
    config::Config,
    session::GameSessionManager,
    telemetry,
};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // 設定ファイルと環境変数から統合設定を読み込み
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("設定読み込みエラー: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("設定エラー: {}", e);
        std::process::exit(1);
    }

    telemetry::init_tracing(&config.logging);
    info!(
        host = %config.server.host,
        port = config.server.port,
        max_sessions = config.sessions.max_sessions,
        difficulty = ?config.game.default_difficulty,
        "configuration loaded"
    );

    let manager = Arc::new(GameSessionManager::with_timeout(
        config.sessions.max_sessions,
        config.sessions.session_timeout_minutes,
    ));

    // 放置されたセッションを定期的に掃除する
    let cleanup_manager = Arc::clone(&manager);
    let cleanup_interval = Duration::from_secs(config.sessions.cleanup_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(cleanup_interval);
        loop {
            ticker.tick().await;
            cleanup_manager.cleanup_inactive_sessions();
        }
    });

    let state = AppState::new(manager, config.default_game_settings());
    let app = create_app(state, &config.server);

    let bind_address = config.bind_address();
    let listener = match TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%bind_address, %e, "failed to bind address");
            std::process::exit(1);
        }
    };

    info!(%bind_address, "Reversi APIサーバー開始");

    if let Err(e) = axum::serve(listener, app).await {
        error!(%e, "server error");
        std::process::exit(1);
    }
}
