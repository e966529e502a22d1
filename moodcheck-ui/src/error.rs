//! HTTP error mapping for moodcheck-ui
//!
//! Remote-store failures never reach the user verbatim: the detail is logged
//! and the response carries one generic message. Sign-in failures are
//! likewise collapsed into a single message regardless of cause.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// Message shown for any remote-store failure
const STORE_MESSAGE: &str = "A storage error occurred. Please try again.";

/// Message shown for any sign-in failure, regardless of cause
pub const AUTH_MESSAGE: &str = "Invalid email or password";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or failed authentication (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Remote store failure (502), generic message only
    #[error("Store unavailable")]
    Store,

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<moodcheck_common::Error> for ApiError {
    fn from(err: moodcheck_common::Error) -> Self {
        use moodcheck_common::Error;
        match err {
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            // Canvas payload problems are client input problems
            Error::Image(msg) => ApiError::BadRequest(msg),
            Error::Auth => ApiError::Unauthorized(AUTH_MESSAGE.to_string()),
            Error::Store(detail) => {
                warn!("Store operation failed: {}", detail);
                ApiError::Store
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            ApiError::Store => (
                StatusCode::BAD_GATEWAY,
                "STORE_ERROR",
                STORE_MESSAGE.to_string(),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
