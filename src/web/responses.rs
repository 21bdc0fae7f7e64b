//! HTTP response types and error mapping
//!
//! Every endpoint answers with [`ApiResponse`]. Errors that clients handle
//! specially carry a machine-readable `code`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;

use crate::errors::AppError;
use crate::models::Language;

pub const CODE_VALIDATION: &str = "VALIDATION_ERROR";
pub const CODE_NOT_FOUND: &str = "NOT_FOUND";
pub const CODE_PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";
pub const CODE_RATE_LIMITED: &str = "RATE_LIMITED";
pub const CODE_CREDITS_EXHAUSTED: &str = "CREDITS_EXHAUSTED";
pub const CODE_BUDGET_EXCEEDED: &str = "BUDGET_EXCEEDED";
pub const CODE_INVALID_AI_RESPONSE: &str = "INVALID_AI_RESPONSE";
pub const CODE_INTERNAL: &str = "INTERNAL_ERROR";

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable error code for client-side handling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Unparseable completion text, returned for diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, String>>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
            raw_response: None,
            details: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            code: None,
            raw_response: None,
            details: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn with_raw_response(mut self, raw: impl Into<String>) -> Self {
        self.raw_response = Some(raw.into());
        self
    }

    pub fn with_details(mut self, details: HashMap<String, String>) -> Self {
        self.details = Some(details);
        self
    }
}

/// Convert an [`AppError`] to its HTTP response
///
/// `language` selects the user-facing text for errors that have one.
pub fn handle_error(error: AppError, language: Language) -> Response {
    let (status, body) = match error {
        AppError::Validation { message } => (
            StatusCode::BAD_REQUEST,
            ApiResponse::error(message).with_code(CODE_VALIDATION),
        ),
        AppError::NotFound { resource, id } => (
            StatusCode::NOT_FOUND,
            ApiResponse::error(format!("{resource} with id '{id}' not found"))
                .with_code(CODE_NOT_FOUND),
        ),
        AppError::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            ApiResponse::error(language.pick(
                "Muitas requisições. Tente novamente em alguns instantes.",
                "Too many requests. Please try again shortly.",
            ))
            .with_code(CODE_RATE_LIMITED),
        ),
        AppError::CreditsExhausted => (
            StatusCode::PAYMENT_REQUIRED,
            ApiResponse::error(language.pick(
                "Créditos de IA esgotados.",
                "AI credits exhausted.",
            ))
            .with_code(CODE_CREDITS_EXHAUSTED),
        ),
        AppError::BudgetExceeded(denial) => {
            let details = HashMap::from([
                ("message_pt".to_string(), denial.message_pt.clone()),
                ("message_en".to_string(), denial.message_en.clone()),
                (
                    "total_cost_cents".to_string(),
                    denial.total_cost_cents.to_string(),
                ),
                (
                    "monthly_limit_cents".to_string(),
                    denial.monthly_limit_cents.to_string(),
                ),
            ]);
            (
                StatusCode::FORBIDDEN,
                ApiResponse::error(denial.message(language))
                    .with_code(CODE_BUDGET_EXCEEDED)
                    .with_details(details),
            )
        }
        // Soft failure: the call went through but the answer was unusable
        AppError::InvalidAiResponse { message, raw } => (
            StatusCode::OK,
            ApiResponse::error(message)
                .with_code(CODE_INVALID_AI_RESPONSE)
                .with_raw_response(raw),
        ),
        other => {
            error!("Request failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiResponse::error(other.to_string()).with_code(CODE_INTERNAL),
            )
        }
    };

    (status, Json(body)).into_response()
}

pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BudgetDenial;

    #[test]
    fn budget_denial_is_forbidden_with_both_messages() {
        let denial = BudgetDenial {
            user_id: "user-1".to_string(),
            total_cost_cents: 100,
            monthly_limit_cents: 100,
            message_pt: "limite".to_string(),
            message_en: "limit".to_string(),
        };
        let response = handle_error(AppError::BudgetExceeded(denial), Language::En);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn gateway_errors_keep_their_status() {
        assert_eq!(
            handle_error(AppError::RateLimited, Language::Pt).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            handle_error(AppError::CreditsExhausted, Language::Pt).status(),
            StatusCode::PAYMENT_REQUIRED
        );
    }

    #[test]
    fn unparseable_completion_is_a_soft_failure() {
        let response = handle_error(
            AppError::invalid_ai_response("no JSON object", "sorry"),
            Language::Pt,
        );
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn everything_else_is_internal() {
        let response = handle_error(AppError::internal("boom"), Language::Pt);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_omits_empty_fields() {
        let body = serde_json::to_value(ApiResponse::error("bad").with_code(CODE_VALIDATION))
            .unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], CODE_VALIDATION);
        assert!(body.get("data").is_none());
        assert!(body.get("raw_response").is_none());
    }
}
