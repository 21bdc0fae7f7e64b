//! Read-only views over usage accounting and the scan cache

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{BillingPeriod, Language, UsageRecord};
use crate::web::{
    AppState,
    responses::{handle_error, ok},
};

#[derive(Debug, Default, Deserialize)]
pub struct UsageQuery {
    pub month: Option<i32>,
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct UsageSummary {
    #[serde(flatten)]
    pub record: UsageRecord,
    pub remaining_cents: i64,
}

/// Usage of one user for a month, the current one unless given
pub async fn get_usage(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<UsageQuery>,
) -> Response {
    let current = BillingPeriod::current();
    let period = BillingPeriod::new(
        query.month.unwrap_or(current.month),
        query.year.unwrap_or(current.year),
    );
    if !(1..=12).contains(&period.month) {
        return handle_error(
            AppError::validation("month must be between 1 and 12"),
            Language::default(),
        );
    }

    match state.usage_repository.find(&user_id, period).await {
        Ok(Some(record)) => ok(UsageSummary {
            remaining_cents: record.remaining_cents(),
            record,
        }),
        Ok(None) => handle_error(
            AppError::not_found(
                "usage",
                format!("{user_id} ({}/{})", period.month, period.year),
            ),
            Language::default(),
        ),
        Err(e) => handle_error(e.into(), Language::default()),
    }
}

pub async fn get_cache_stats(State(state): State<AppState>) -> Response {
    match state.cache_repository.stats().await {
        Ok(stats) => ok(stats),
        Err(e) => handle_error(e.into(), Language::default()),
    }
}
