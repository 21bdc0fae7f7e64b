use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::warn;

use crate::web::{AppState, responses::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
    pub uptime_seconds: i64,
    pub pending_usage_writes: usize,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub status: &'static str,
    pub backend: String,
}

/// Liveness plus a database round trip; 503 when the database is down
pub async fn health_check(State(state): State<AppState>) -> Response {
    let connected = match state.database.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check database ping failed: {}", e);
            false
        }
    };

    let response = HealthResponse {
        status: if connected { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        database: DatabaseHealth {
            status: if connected { "connected" } else { "disconnected" },
            backend: state.database.database_type().to_string(),
        },
        uptime_seconds: (chrono::Utc::now() - state.start_time).num_seconds(),
        pending_usage_writes: state.usage_recorder.pending(),
    };

    let status = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ApiResponse::success(response))).into_response()
}
