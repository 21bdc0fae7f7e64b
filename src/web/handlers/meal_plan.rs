use axum::{extract::State, response::Response};

use crate::models::FamilyMealPlanRequest;
use crate::web::{
    AppState,
    extractors::JsonBody,
    responses::{handle_error, ok},
};

/// Generate a shared meal plan adapted to every family member
pub async fn create_family_meal_plan(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<FamilyMealPlanRequest>,
) -> Response {
    let language = request.language;
    match state.meal_plan_service.generate(request).await {
        Ok(plan) => ok(plan),
        Err(e) => handle_error(e, language),
    }
}
