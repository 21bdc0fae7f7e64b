//! Shared harness for the HTTP integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use food_scan_gateway::{
    ai::{AiGateway, ChatPrompt},
    config::Config,
    database::Database,
    errors::{AppError, AppResult},
    web::{AppState, create_router},
};

pub const PNG_IMAGE: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";
pub const JPEG_IMAGE: &str = "/9j/4AAQSkZJRgABAQEASABIAAD/2wBDAAMCAgMCAgMDAwMEAwMEBQgFBQQEBQoHBwYIDAoMDAsKCwsNDhIQDQ4RDgsLEBYQERMUFRUVDA8XGBYUGBIUFRT/";

pub const ANALYSIS_JSON: &str = r#"Here is the analysis:
{"dish_name": "Arroz com feijão", "foods_identified": ["arroz", "feijão"],
 "portion_estimate": "1 prato", "calories": 450, "protein": 15.5, "carbs": 80,
 "fat": 6, "fiber": 9, "confidence": "high", "notes": "Refeição equilibrada"}"#;

/// One scripted answer of the fake gateway
pub enum Scripted {
    Text(String),
    RateLimited,
    CreditsExhausted,
}

/// AI gateway fake that replays queued answers and counts calls
///
/// With an empty queue it answers with [`ANALYSIS_JSON`].
#[derive(Default)]
pub struct ScriptedAiGateway {
    answers: Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<ChatPrompt>>,
}

impl ScriptedAiGateway {
    pub fn push(&self, answer: Scripted) {
        self.answers.lock().unwrap().push_back(answer);
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.push(Scripted::Text(text.into()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<ChatPrompt> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AiGateway for ScriptedAiGateway {
    async fn complete(&self, prompt: ChatPrompt) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt);

        match self.answers.lock().unwrap().pop_front() {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::RateLimited) => Err(AppError::RateLimited),
            Some(Scripted::CreditsExhausted) => Err(AppError::CreditsExhausted),
            None => Ok(ANALYSIS_JSON.to_string()),
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub gateway: Arc<ScriptedAiGateway>,
}

impl TestApp {
    /// Wait for detached usage writes to land
    pub async fn flush_usage(&self) {
        self.state.usage_recorder.flush().await;
    }
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with(Config::default()).await
}

pub async fn create_test_app_with(config: Config) -> TestApp {
    let database = Database::new_in_memory()
        .await
        .expect("Failed to create test database");
    database.migrate().await.expect("Failed to run migrations");

    let gateway = Arc::new(ScriptedAiGateway::default());
    let state = AppState::new(config, database, gateway.clone());
    let router = create_router(state.clone()).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        state,
        gateway,
    }
}
