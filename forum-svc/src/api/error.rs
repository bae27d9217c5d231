//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Handler error, rendered as `{"error": message}`
#[derive(Debug)]
pub enum ApiError {
    /// No or unknown `X-User-Id`
    Unauthorized(String),
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    Internal(String),
}

impl From<forum_common::Error> for ApiError {
    fn from(err: forum_common::Error) -> Self {
        use forum_common::Error;
        match err {
            Error::NotFound(_) => ApiError::NotFound(err.to_string()),
            Error::InvalidInput(_) | Error::UnknownThreadType(_) | Error::Serialization(_) => {
                ApiError::BadRequest(err.to_string())
            }
            Error::PermissionDenied(_) => ApiError::Forbidden(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => {
                error!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
