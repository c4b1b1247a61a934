//! API Error Types
//!
//! Defines error types for the API layer and implements conversion to HTTP
//! responses. The `error` field of the JSON body carries a stable code
//! string that programmatic callers key on.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::bus::CommandError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing, expired or forged session token
    #[error("unauthorized")]
    Unauthorized,

    /// Login attempt with wrong credentials
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A device identifier is required but was empty
    #[error("device required")]
    DeviceRequired,

    /// The bus rejected or could not complete a command publish
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    /// Stable code string: `unauthorized`, `publish_failed`, ...
    pub error: String,
    pub message: String,
    pub request_id: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            ApiError::DeviceRequired => (StatusCode::BAD_REQUEST, "device required"),
            ApiError::Command(CommandError::PublishFailed(_)) => {
                (StatusCode::BAD_GATEWAY, "publish_failed")
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::warn!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API request failed"
        );

        let body = ErrorResponse {
            error: code.to_string(),
            message: self.to_string(),
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_error_codes() {
        assert_eq!(
            ApiError::Unauthorized.status_and_code(),
            (StatusCode::UNAUTHORIZED, "unauthorized")
        );
        assert_eq!(
            ApiError::DeviceRequired.status_and_code(),
            (StatusCode::BAD_REQUEST, "device required")
        );
        let publish = ApiError::Command(CommandError::PublishFailed("down".to_string()));
        assert_eq!(
            publish.status_and_code(),
            (StatusCode::BAD_GATEWAY, "publish_failed")
        );
    }
}
