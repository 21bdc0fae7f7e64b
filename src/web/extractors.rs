//! Request extractors

use axum::{
    Json,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::errors::AppError;
use crate::models::Language;

use super::responses::{ApiResponse, CODE_PAYLOAD_TOO_LARGE, handle_error};

/// JSON body whose rejections are reported as validation errors
///
/// A missing or malformed body answers 400 and a body over the configured
/// limit answers 413, both in the standard response shape instead of axum's
/// plain-text rejection.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(request, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => Err((
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ApiResponse::error(rejection.body_text()).with_code(CODE_PAYLOAD_TOO_LARGE)),
            )
                .into_response()),
            Err(rejection) => Err(handle_error(
                AppError::validation(rejection.body_text()),
                Language::default(),
            )),
        }
    }
}
