//! Error taxonomy shared by every core component.
//!
//! Each variant maps to exactly one machine-readable code. Business-rule
//! failures carry a message safe to show the caller; `Decryption` and
//! `Internal` carry server-side detail that the transport layer must mask.

use thiserror::Error;

use crate::application::ApplicationStatus;
use crate::validation::FieldErrors;

/// Convenience alias for core results.
pub type CoreResult<T> = Result<T, CoreError>;

/// Core errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("You are not authorized to access this resource: {0}")]
    Unauthorized(String),

    #[error("An active loan application already exists for this phone number")]
    DuplicateApplication,

    #[error("Application is in {actual} status, expected {expected}")]
    InvalidStatus {
        actual: ApplicationStatus,
        expected: ApplicationStatus,
    },

    #[error("Request validation failed")]
    Validation(FieldErrors),

    #[error("Too many requests. Please try again later.")]
    RateLimitExceeded,

    #[error("OTP has expired. Please request a new one.")]
    OtpExpired,

    #[error("Invalid OTP code.")]
    OtpInvalid,

    #[error("Too many failed attempts. Please wait before trying again.")]
    OtpLocked,

    #[error("Maximum OTP verification attempts exceeded.")]
    OtpMaxAttempts,

    #[error("This OTP has already been verified.")]
    OtpAlreadyVerified,

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::Unauthorized(_) => "UNAUTHORIZED",
            CoreError::DuplicateApplication => "DUPLICATE_APPLICATION",
            CoreError::InvalidStatus { .. } => "INVALID_STATUS",
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            CoreError::OtpExpired => "OTP_EXPIRED",
            CoreError::OtpInvalid => "OTP_INVALID",
            CoreError::OtpLocked => "OTP_LOCKED",
            CoreError::OtpMaxAttempts => "OTP_MAX_ATTEMPTS",
            CoreError::OtpAlreadyVerified => "OTP_ALREADY_VERIFIED",
            CoreError::Decryption(_) => "DECRYPTION_ERROR",
            CoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the message carries server-side detail that must not reach the caller.
    pub fn is_masked(&self) -> bool {
        matches!(self, CoreError::Decryption(_) | CoreError::Internal(_))
    }

    /// Single-field validation failure.
    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, reason);
        CoreError::Validation(errors)
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(e: sqlx::Error) -> Self {
        CoreError::Internal(format!("database: {e}"))
    }
}
