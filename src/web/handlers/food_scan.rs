use axum::{extract::State, response::Response};

use crate::models::FoodScanRequest;
use crate::web::{
    AppState,
    extractors::JsonBody,
    responses::{handle_error, ok},
};

/// Analyze one food photo
///
/// Served both at the function-style path used by existing clients and
/// under `/api/v1`.
pub async fn analyze_food(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<FoodScanRequest>,
) -> Response {
    let language = request.language;
    match state.food_scan_service.analyze(request).await {
        Ok(outcome) => ok(outcome),
        Err(e) => handle_error(e, language),
    }
}
