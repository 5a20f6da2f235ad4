use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::protocol::HighScoreEntry;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

use super::*;
use crate::fixtures::{snapshot, TOKEN};

#[derive(Clone)]
struct ServerState {
    tx: Arc<Mutex<Option<oneshot::Sender<(String, serde_json::Value)>>>>,
}

async fn handle_new_game(Json(body): Json<NewGameRequest>) -> Json<GameSnapshot> {
    let mut game = snapshot(TOKEN);
    game.player.name = body.player_name;
    Json(game)
}

async fn handle_capture(
    State(state): State<ServerState>,
    Path(token): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Json<GameSnapshot> {
    if let Some(tx) = state.tx.lock().await.take() {
        let _ = tx.send((token.clone(), body));
    }
    Json(snapshot(&token))
}

async fn handle_rejected_sell() -> (StatusCode, Json<ApiErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorBody::new("You don't have enough shares to sell")),
    )
}

async fn handle_broken_hospital() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>upstream exploded</html>")
}

async fn handle_blank_error() -> (StatusCode, Json<ApiErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ApiErrorBody::new("   ")))
}

async fn handle_slow_next_day(Path(token): Path<String>) -> Json<GameSnapshot> {
    tokio::time::sleep(Duration::from_millis(800)).await;
    Json(snapshot(&token))
}

async fn handle_garbled_game() -> &'static str {
    "{\"not\": \"a game\"}"
}

async fn handle_high_scores() -> Json<Vec<HighScoreEntry>> {
    Json(vec![HighScoreEntry {
        name: "Ada".to_string(),
        score: 91_000,
        health: 100,
        fame: 20,
    }])
}

async fn spawn_game_server(
) -> std::io::Result<(String, oneshot::Receiver<(String, serde_json::Value)>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (tx, rx) = oneshot::channel();
    let state = ServerState {
        tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/api/new_game", post(handle_new_game))
        .route("/api/game/:token", get(handle_garbled_game))
        .route("/api/game/:token/buy", post(handle_capture))
        .route("/api/game/:token/bank", post(handle_capture))
        .route("/api/game/:token/sell", post(handle_rejected_sell))
        .route("/api/game/:token/hospital", post(handle_broken_hospital))
        .route("/api/game/:token/darkweb", post(handle_blank_error))
        .route("/api/game/:token/next_day", post(handle_slow_next_day))
        .route("/api/high_scores", get(handle_high_scores))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), rx))
}

fn token() -> SessionToken {
    SessionToken::new(TOKEN)
}

#[tokio::test]
async fn new_game_posts_player_name_and_decodes_snapshot() {
    let (server_url, _rx) = spawn_game_server().await.expect("spawn server");
    let api = HttpGameApi::new(&server_url, DEFAULT_REQUEST_TIMEOUT).expect("gateway");

    let game = api.new_game("Ada").await.expect("new game");

    assert_eq!(game.player.name, "Ada");
    assert_eq!(game.token, token());
}

#[tokio::test]
async fn buy_sends_stock_id_and_amount_to_token_route() {
    let (server_url, payload_rx) = spawn_game_server().await.expect("spawn server");
    let api = HttpGameApi::new(&server_url, DEFAULT_REQUEST_TIMEOUT).expect("gateway");

    api.buy(&token(), StockId(3), 4).await.expect("buy");

    let (path_token, body) = payload_rx.await.expect("captured payload");
    assert_eq!(path_token, TOKEN);
    assert_eq!(body, serde_json::json!({ "stock_id": 3, "amount": 4 }));
}

#[tokio::test]
async fn bank_sends_action_name() {
    let (server_url, payload_rx) = spawn_game_server().await.expect("spawn server");
    let api = HttpGameApi::new(&server_url, DEFAULT_REQUEST_TIMEOUT).expect("gateway");

    api.bank(&token(), BankAction::Repay, 250)
        .await
        .expect("bank");

    let (_, body) = payload_rx.await.expect("captured payload");
    assert_eq!(body, serde_json::json!({ "action": "repay", "amount": 250 }));
}

#[tokio::test]
async fn server_error_message_is_surfaced() {
    let (server_url, _rx) = spawn_game_server().await.expect("spawn server");
    let api = HttpGameApi::new(&server_url, DEFAULT_REQUEST_TIMEOUT).expect("gateway");

    let err = api
        .sell(&token(), StockId(3), 10)
        .await
        .expect_err("sell should fail");

    assert_eq!(
        err,
        ClientError::request_failed(Operation::Sell, "You don't have enough shares to sell")
    );
    assert_eq!(
        err.to_string(),
        "Error selling stocks: You don't have enough shares to sell"
    );
}

#[tokio::test]
async fn non_json_error_body_uses_fallback_message() {
    let (server_url, _rx) = spawn_game_server().await.expect("spawn server");
    let api = HttpGameApi::new(&server_url, DEFAULT_REQUEST_TIMEOUT).expect("gateway");

    let err = api.hospital(&token()).await.expect_err("hospital fails");

    assert_eq!(
        err,
        ClientError::request_failed(Operation::Hospital, "Failed to visit hospital")
    );
}

#[tokio::test]
async fn blank_error_message_uses_fallback_message() {
    let (server_url, _rx) = spawn_game_server().await.expect("spawn server");
    let api = HttpGameApi::new(&server_url, DEFAULT_REQUEST_TIMEOUT).expect("gateway");

    let err = api.darkweb(&token()).await.expect_err("darkweb fails");

    assert_eq!(
        err,
        ClientError::request_failed(Operation::Darkweb, "Failed to visit darkweb")
    );
}

#[tokio::test]
async fn slow_server_times_out() {
    let (server_url, _rx) = spawn_game_server().await.expect("spawn server");
    let api = HttpGameApi::new(&server_url, Duration::from_millis(100)).expect("gateway");

    let err = api.next_day(&token()).await.expect_err("next day times out");

    assert_eq!(
        err,
        ClientError::request_failed(Operation::NextDay, "request timed out")
    );
}

#[tokio::test]
async fn undecodable_success_body_is_a_request_failure() {
    let (server_url, _rx) = spawn_game_server().await.expect("spawn server");
    let api = HttpGameApi::new(&server_url, DEFAULT_REQUEST_TIMEOUT).expect("gateway");

    let err = api.get_game(&token()).await.expect_err("garbled body");

    match err {
        ClientError::RequestFailed { operation, message } => {
            assert_eq!(operation, Operation::GetGame);
            assert!(message.starts_with("unexpected response from server"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_reports_connect_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let api = HttpGameApi::new(&format!("http://{addr}"), DEFAULT_REQUEST_TIMEOUT)
        .expect("gateway");

    let err = api.high_scores().await.expect_err("nothing listening");

    assert_eq!(
        err,
        ClientError::request_failed(Operation::HighScores, "could not reach the game server")
    );
}

#[tokio::test]
async fn trailing_slash_base_builds_clean_paths() {
    let (server_url, _rx) = spawn_game_server().await.expect("spawn server");
    let api = HttpGameApi::new(&format!("{server_url}/"), DEFAULT_REQUEST_TIMEOUT)
        .expect("gateway");

    let scores = api.high_scores().await.expect("high scores");

    assert_eq!(scores.len(), 1);
    assert_eq!(
        api.endpoint(&["api", "game", TOKEN]).path(),
        format!("/api/game/{TOKEN}")
    );
}

#[test]
fn rejects_non_http_server_urls() {
    assert!(matches!(
        HttpGameApi::new("ftp://example.com", DEFAULT_REQUEST_TIMEOUT),
        Err(GatewaySetupError::InvalidServerUrl { .. })
    ));
    assert!(matches!(
        HttpGameApi::new("not a url", DEFAULT_REQUEST_TIMEOUT),
        Err(GatewaySetupError::InvalidServerUrl { .. })
    ));
}
