//! HTTP APIの統合テストモジュール
//! 実際のHTTPリクエストをシミュレートしてAPIの動作を確認し、
//! エンドポイント間の連携やエラーハンドリングをテストする。

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::Response,
};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;
use uuid::Uuid;

use reversi_engine::{
    api::{create_router, AppState},
    session::{GameMode, GameSessionManager, GameSettings},
};

fn create_test_app() -> axum::Router {
    let defaults = GameSettings {
        mode: GameMode::Local,
        ai_move_delay: Duration::from_millis(1),
        ..Default::default()
    };
    create_router(AppState::new(Arc::new(GameSessionManager::new(10)), defaults))
}

async fn parse_response_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send_request(app: &axum::Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    let request = match body {
        Some(body) => request.body(Body::from(serde_json::to_vec(&body).unwrap())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

async fn create_game(app: &axum::Router, settings: Value) -> String {
    let response = send_request(app, Method::POST, "/api/games", Some(settings)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_json(response).await;
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let response = send_request(&app, Method::GET, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["active_sessions"], 0);
}

#[tokio::test]
async fn test_create_and_get_game() {
    let app = create_test_app();
    let game_id = create_game(&app, json!({})).await;

    let response = send_request(&app, Method::GET, &format!("/api/games/{}", game_id), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let game = parse_response_json(response).await;
    assert_eq!(game["id"], game_id.as_str());
    assert_eq!(game["current_player"], "black");
    assert_eq!(game["status"], "playing");
    assert_eq!(game["score"]["black"], 2);
    assert_eq!(game["score"]["white"], 2);
    assert_eq!(game["valid_moves"].as_array().unwrap().len(), 4);
    assert_eq!(game["settings"]["mode"], "local");
}

#[tokio::test]
async fn test_move_flow() {
    let app = create_test_app();
    let game_id = create_game(&app, json!({})).await;

    let response = send_request(
        &app,
        Method::POST,
        &format!("/api/games/{}/move", game_id),
        Some(json!({"row": 2, "col": 3})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_json(response).await;
    assert_eq!(body["outcome"]["next_player"], "white");
    assert_eq!(body["outcome"]["mv"]["flipped"].as_array().unwrap().len(), 1);
    assert_eq!(body["game"]["score"]["black"], 4);
    assert_eq!(body["game"]["score"]["white"], 1);
    assert_eq!(body["game"]["board"][3][3], 1);

    let history = send_request(&app, Method::GET, &format!("/api/games/{}/history", game_id), None).await;
    assert_eq!(history.status(), StatusCode::OK);
    let history = parse_response_json(history).await;
    let moves = history["moves"].as_array().unwrap();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0]["x"], 2);
    assert_eq!(moves[0]["y"], 3);
    assert_eq!(moves[0]["player"], "black");
    assert_eq!(moves[0]["flippedDiscs"][0]["x"], 3);
}

#[tokio::test]
async fn test_illegal_move_is_rejected() {
    let app = create_test_app();
    let game_id = create_game(&app, json!({})).await;

    let response = send_request(
        &app,
        Method::POST,
        &format!("/api/games/{}/move", game_id),
        Some(json!({"row": 0, "col": 0})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_json(response).await;
    assert_eq!(body["error"], "ILLEGAL_MOVE");

    let response = send_request(
        &app,
        Method::POST,
        &format!("/api/games/{}/move", game_id),
        Some(json!({"row": 8, "col": 0})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // 状態は変わっていない
    let game = parse_response_json(send_request(&app, Method::GET, &format!("/api/games/{}", game_id), None).await).await;
    assert_eq!(game["move_count"], 0);
    assert_eq!(game["current_player"], "black");
}

#[tokio::test]
async fn test_pass_not_allowed_with_legal_moves() {
    let app = create_test_app();
    let game_id = create_game(&app, json!({})).await;

    let response = send_request(&app, Method::POST, &format!("/api/games/{}/pass", game_id), None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_undo_flow() {
    let app = create_test_app();
    let game_id = create_game(&app, json!({})).await;

    let response = send_request(&app, Method::POST, &format!("/api/games/{}/undo", game_id), None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    send_request(
        &app,
        Method::POST,
        &format!("/api/games/{}/move", game_id),
        Some(json!({"row": 2, "col": 3})),
    )
    .await;

    let response = send_request(&app, Method::POST, &format!("/api/games/{}/undo", game_id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_json(response).await;
    assert_eq!(body["undone"][0]["position"]["row"], 2);
    assert_eq!(body["game"]["current_player"], "black");
    assert_eq!(body["game"]["score"]["black"], 2);
    assert_eq!(body["game"]["move_count"], 0);
}

#[tokio::test]
async fn test_undo_in_ai_mode_returns_to_human_turn() {
    let app = create_test_app();
    let game_id = create_game(&app, json!({"mode": "ai"})).await;

    send_request(
        &app,
        Method::POST,
        &format!("/api/games/{}/move", game_id),
        Some(json!({"row": 2, "col": 3})),
    )
    .await;

    let mut game = Value::Null;
    for _ in 0..200 {
        game = parse_response_json(send_request(&app, Method::GET, &format!("/api/games/{}", game_id), None).await).await;
        if game["move_count"] == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(game["move_count"], 2);

    let response = send_request(&app, Method::POST, &format!("/api/games/{}/undo", game_id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_json(response).await;
    assert_eq!(body["undone"].as_array().unwrap().len(), 2);
    assert_eq!(body["game"]["current_player"], "black");
    assert_eq!(body["game"]["move_count"], 0);
    assert_eq!(body["game"]["ai_thinking"], false);
}

#[tokio::test]
async fn test_human_move_on_ai_turn_is_rejected() {
    let app = create_test_app();
    let game_id = create_game(&app, json!({"mode": "ai", "ai_move_delay_ms": 60000})).await;

    send_request(
        &app,
        Method::POST,
        &format!("/api/games/{}/move", game_id),
        Some(json!({"row": 2, "col": 3})),
    )
    .await;
    send_request(&app, Method::DELETE, &format!("/api/games/{}/ai-move", game_id), None).await;

    let response = send_request(
        &app,
        Method::POST,
        &format!("/api/games/{}/move", game_id),
        Some(json!({"row": 2, "col": 2})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(parse_response_json(response).await["error"], "AI_TURN");
}

#[tokio::test]
async fn test_pause_resume_and_finish() {
    let app = create_test_app();
    let game_id = create_game(&app, json!({})).await;

    let paused = send_request(&app, Method::POST, &format!("/api/games/{}/pause", game_id), None).await;
    assert_eq!(paused.status(), StatusCode::OK);
    assert_eq!(parse_response_json(paused).await["status"], "paused");

    let blocked = send_request(
        &app,
        Method::POST,
        &format!("/api/games/{}/move", game_id),
        Some(json!({"row": 2, "col": 3})),
    )
    .await;
    assert_eq!(blocked.status(), StatusCode::CONFLICT);

    let resumed = send_request(&app, Method::POST, &format!("/api/games/{}/resume", game_id), None).await;
    assert_eq!(parse_response_json(resumed).await["status"], "playing");

    let finished = send_request(&app, Method::POST, &format!("/api/games/{}/finish", game_id), None).await;
    let finished = parse_response_json(finished).await;
    assert_eq!(finished["status"], "finished");
    assert_eq!(finished["winner"], Value::Null);

    let again = send_request(&app, Method::POST, &format!("/api/games/{}/finish", game_id), None).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
    assert_eq!(parse_response_json(again).await["error"], "GAME_ALREADY_FINISHED");
}

#[tokio::test]
async fn test_reset_and_start() {
    let app = create_test_app();
    let game_id = create_game(&app, json!({})).await;

    send_request(
        &app,
        Method::POST,
        &format!("/api/games/{}/move", game_id),
        Some(json!({"row": 2, "col": 3})),
    )
    .await;

    let reset = send_request(&app, Method::POST, &format!("/api/games/{}/reset", game_id), None).await;
    let reset = parse_response_json(reset).await;
    assert_eq!(reset["status"], "waiting");
    assert_eq!(reset["move_count"], 0);

    let started = send_request(&app, Method::POST, &format!("/api/games/{}/start", game_id), None).await;
    assert_eq!(parse_response_json(started).await["status"], "playing");
}

#[tokio::test]
async fn test_update_settings() {
    let app = create_test_app();
    let game_id = create_game(&app, json!({})).await;

    let response = send_request(
        &app,
        Method::PUT,
        &format!("/api/games/{}/settings", game_id),
        Some(json!({"difficulty": "hard", "time_limit_secs": 600})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let game = parse_response_json(response).await;
    assert_eq!(game["settings"]["difficulty"], "hard");
    assert_eq!(game["settings"]["time_limit_secs"], 600);
    assert_eq!(game["settings"]["mode"], "local");
}

#[tokio::test]
async fn test_ai_move_request() {
    let app = create_test_app();
    let game_id = create_game(&app, json!({"difficulty": "medium"})).await;

    let response = send_request(&app, Method::POST, &format!("/api/games/{}/ai-move", game_id), None).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(parse_response_json(response).await["ai_thinking"], true);

    let mut game = Value::Null;
    for _ in 0..200 {
        game = parse_response_json(send_request(&app, Method::GET, &format!("/api/games/{}", game_id), None).await).await;
        if game["ai_thinking"] == false {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    assert_eq!(game["ai_thinking"], false);
    assert_eq!(game["move_count"], 1);
    assert_eq!(game["current_player"], "white");
}

#[tokio::test]
async fn test_ai_move_can_be_cancelled() {
    let app = create_test_app();
    let game_id = create_game(&app, json!({"ai_move_delay_ms": 60000})).await;

    send_request(&app, Method::POST, &format!("/api/games/{}/ai-move", game_id), None).await;
    let busy = send_request(
        &app,
        Method::POST,
        &format!("/api/games/{}/move", game_id),
        Some(json!({"row": 2, "col": 3})),
    )
    .await;
    assert_eq!(busy.status(), StatusCode::CONFLICT);
    assert_eq!(parse_response_json(busy).await["error"], "AI_THINKING");

    let cancelled = send_request(&app, Method::DELETE, &format!("/api/games/{}/ai-move", game_id), None).await;
    let cancelled = parse_response_json(cancelled).await;
    assert_eq!(cancelled["ai_thinking"], false);
    assert_eq!(cancelled["move_count"], 0);
}

#[tokio::test]
async fn test_delete_game() {
    let app = create_test_app();
    let game_id = create_game(&app, json!({})).await;

    let response = send_request(&app, Method::DELETE, &format!("/api/games/{}", game_id), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send_request(&app, Method::GET, &format!("/api/games/{}", game_id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(parse_response_json(response).await["error"], "GAME_NOT_FOUND");
}

#[tokio::test]
async fn test_unknown_game() {
    let app = create_test_app();
    let response = send_request(&app, Method::GET, &format!("/api/games/{}", Uuid::new_v4()), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_session_limit() {
    let app = create_router(AppState::new(Arc::new(GameSessionManager::new(1)), GameSettings::default()));
    create_game(&app, json!({"mode": "local"})).await;

    let response = send_request(&app, Method::POST, "/api/games", Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_replay_endpoint() {
    let app = create_test_app();
    let timestamp = "2024-01-01T00:00:00Z";
    let body = json!({
        "moves": [
            {"x": 2, "y": 3, "player": "black", "timestamp": timestamp},
            {"x": 0, "y": 0, "player": "white", "timestamp": timestamp},
            {"x": 2, "y": 2, "player": "white", "timestamp": timestamp, "flippedDiscs": [{"x": 3, "y": 3}]}
        ]
    });

    let response = send_request(&app, Method::POST, "/api/replay", Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let replay = parse_response_json(response).await;
    assert_eq!(replay["snapshots"].as_array().unwrap().len(), 4);
    assert_eq!(replay["invalid_steps"], json!([1]));
    assert_eq!(replay["snapshots"][1], replay["snapshots"][2]);
    assert_eq!(replay["final_score"]["black"], 3);
    assert_eq!(replay["final_score"]["white"], 3);
}

#[tokio::test]
async fn test_replay_rejects_out_of_bounds_record() {
    let app = create_test_app();
    let body = json!({
        "moves": [{"x": 9, "y": 3, "player": "black", "timestamp": "2024-01-01T00:00:00Z"}]
    });

    let response = send_request(&app, Method::POST, "/api/replay", Some(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_response_json(response).await["error"], "INVALID_RECORD");
}
