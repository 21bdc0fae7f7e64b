//! HttpAiGateway against a local chat-completions stub

use axum::{Json, Router, http::StatusCode, routing::post};
use serde_json::{Value, json};
use std::time::Duration;

use food_scan_gateway::{
    ai::{AiGateway, ChatMessage, ChatPrompt, HttpAiGateway},
    errors::AppError,
};

async fn spawn_stub() -> String {
    let app = Router::new()
        .route(
            "/ok",
            post(|Json(body): Json<Value>| async move {
                let model = body["model"].as_str().unwrap_or_default().to_string();
                Json(json!({
                    "choices": [{ "message": { "role": "assistant", "content": format!("model={model}") } }]
                }))
            }),
        )
        .route(
            "/rate-limited",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        )
        .route(
            "/no-credits",
            post(|| async { (StatusCode::PAYMENT_REQUIRED, "pay up") }),
        )
        .route(
            "/broken",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
        )
        .route("/empty", post(|| async { Json(json!({ "choices": [] })) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn gateway(base: &str, path: &str) -> HttpAiGateway {
    HttpAiGateway::new(
        format!("{base}{path}"),
        Some("test-key".to_string()),
        "vision-model".to_string(),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn prompt() -> ChatPrompt {
    ChatPrompt::new(vec![ChatMessage::user("hello")])
}

#[tokio::test]
async fn returns_first_choice_content() {
    let base = spawn_stub().await;
    let text = gateway(&base, "/ok").complete(prompt()).await.unwrap();
    assert_eq!(text, "model=vision-model");
}

#[tokio::test]
async fn maps_coded_statuses() {
    let base = spawn_stub().await;

    let err = gateway(&base, "/rate-limited").complete(prompt()).await.unwrap_err();
    assert!(matches!(err, AppError::RateLimited));

    let err = gateway(&base, "/no-credits").complete(prompt()).await.unwrap_err();
    assert!(matches!(err, AppError::CreditsExhausted));

    let err = gateway(&base, "/broken").complete(prompt()).await.unwrap_err();
    match err {
        AppError::ExternalService { message, .. } => {
            assert!(message.contains("500"));
            assert!(message.contains("upstream exploded"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_completion_is_an_error() {
    let base = spawn_stub().await;
    let err = gateway(&base, "/empty").complete(prompt()).await.unwrap_err();
    assert!(matches!(err, AppError::ExternalService { .. }));
}
