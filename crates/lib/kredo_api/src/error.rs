//! Application error types.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use kredo_core::error::CoreError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Shown instead of the real message for internal faults.
pub const MASKED_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Malformed request body, path or query.
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Core(e) => match e {
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                CoreError::OtpLocked
                | CoreError::OtpMaxAttempts
                | CoreError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
                CoreError::DuplicateApplication | CoreError::InvalidStatus { .. } => {
                    StatusCode::CONFLICT
                }
                CoreError::Decryption(_) | CoreError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                CoreError::Validation(_)
                | CoreError::OtpExpired
                | CoreError::OtpInvalid
                | CoreError::OtpAlreadyVerified => StatusCode::BAD_REQUEST,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Core(e) => e.code(),
            AppError::BadRequest(_) => "VALIDATION_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, details) = match &self {
            AppError::Core(e) if e.is_masked() => {
                error!(error_code = e.code(), error = %e, "request failed");
                (MASKED_MESSAGE.to_string(), None)
            }
            AppError::Core(CoreError::Validation(fields)) => (
                "Request validation failed".to_string(),
                serde_json::to_value(fields).ok(),
            ),
            other => (other.to_string(), None),
        };
        let body = Json(ErrorResponse {
            error_code: self.code().to_string(),
            message,
            details,
            timestamp: Utc::now(),
        });
        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
