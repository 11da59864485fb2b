//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quill_core::StoreError;
use serde::{Deserialize, Serialize};

/// API error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new("NOT_FOUND", format!("{resource} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type.
///
/// The status mapping is part of the external contract: wrong credentials
/// and rotated-out tokens are client errors (400), a bad signature or an
/// expired token is 401, an unknown subject is 404, and configuration or
/// storage faults are opaque 500s.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or missing input, including uniqueness violations
    Validation(String),
    /// Unknown email or wrong password; never says which
    InvalidCredentials,
    /// No refresh token in the request body
    MissingToken,
    /// Signature checks out but the token is not in the stored set
    StaleToken,
    /// Bad signature, malformed token, or past expiry
    InvalidToken,
    /// Referenced subject does not exist
    NotFound(String),
    /// Server misconfigured (e.g. signing secret unset)
    Configuration(String),
    /// Persistence layer failure
    Storage(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_CREDENTIALS", "Wrong email or password"),
            ),
            AppError::MissingToken => (
                StatusCode::BAD_REQUEST,
                ApiError::new("MISSING_TOKEN", "Missing refresh token"),
            ),
            AppError::StaleToken => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_TOKEN", "Invalid refresh token"),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ApiError::new("INVALID_TOKEN", "Invalid or expired token"),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::not_found(&msg)),
            AppError::Configuration(msg) => {
                // The detail stays in the log; the client gets an opaque error.
                tracing::error!(error = %msg, "configuration error");
                (StatusCode::INTERNAL_SERVER_ERROR, ApiError::internal_error())
            }
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, ApiError::internal_error())
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserNotFound => AppError::NotFound("User".to_string()),
            StoreError::EmailAlreadyExists => {
                AppError::Validation("Email already registered".to_string())
            }
            StoreError::Backend(msg) => AppError::Storage(msg),
            StoreError::Other(err) => AppError::Storage(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(AppError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::InvalidCredentials), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::MissingToken), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::StaleToken), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::NotFound("User".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AppError::Configuration("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Storage("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_error_conversion() {
        assert!(matches!(
            AppError::from(StoreError::UserNotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(StoreError::EmailAlreadyExists),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(StoreError::Backend("down".into())),
            AppError::Storage(_)
        ));
    }
}
