use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use capcompare_core::{ProviderError, ProviderErrorKind};
use serde_json::json;

/// Error surfaced to dashboard clients. Upstream rate limiting passes
/// through verbatim as 429 so the UI can show its retry-later message;
/// everything else collapses to a generic failure.
#[derive(Debug, PartialEq, Eq)]
pub enum ApiError {
    NotFound(&'static str),
    BadRequest(String),
    RateLimited,
    Internal,
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err.kind() {
            ProviderErrorKind::RateLimited => Self::RateLimited,
            _ => {
                tracing::error!(error = %err, "upstream request failed");
                Self::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            Self::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": "rate_limit" })),
            )
                .into_response(),
            Self::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Request failed" })),
            )
                .into_response(),
        }
    }
}
