//! Error Handling Utilities
//!
//! Application-level error taxonomy and HTTP response mapping. Storage
//! engines never leak their native error objects past the storage layer;
//! everything a handler sees is an `AppError` kind.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

/// Main application error type covering every feature of the service
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or missing input fields
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate resource, primarily a duplicate email on sign-up
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad credentials or missing/invalid token; deliberately uninformative
    /// about which factor failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Entity absent where presence was required
    #[error("Not found: {0}")]
    NotFound(String),

    /// OTP mismatch or expiry; both collapse to this one kind
    #[error("Invalid or expired OTP")]
    InvalidOtp,

    /// Password hashing failure
    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    /// Normalized storage failure that is not a conflict or absence
    #[error("Storage error: {0}")]
    Storage(String),

    /// Upstream HR/ERP system failure
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Anything else
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Duplicate => AppError::Conflict("Resource already exists".to_string()),
            StorageError::NotFound => AppError::NotFound("Record not found".to_string()),
            StorageError::Backend(msg) => AppError::Storage(msg),
        }
    }
}

/// Standard error response structure for API endpoints
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn with_details(error: &str, message: &str, details: serde_json::Value) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            details: Some(details),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::InvalidOtp => (
                StatusCode::BAD_REQUEST,
                "INVALID_OTP",
                "Invalid or expired OTP".to_string(),
            ),
            AppError::Hashing(e) => {
                log::error!("password hashing failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
            AppError::Storage(msg) => {
                log::error!("storage failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::ExternalService(msg) => {
                log::error!("external service failure: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "EXTERNAL_SERVICE_ERROR",
                    "External service unavailable".to_string(),
                )
            }
            AppError::Internal(msg) => {
                log::error!("internal failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let error_response = ErrorResponse::new(error_code, &message);
        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can return AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_creation() {
        let error = ErrorResponse::new("TEST_ERROR", "Test message");
        assert_eq!(error.error, "TEST_ERROR");
        assert_eq!(error.message, "Test message");
        assert!(error.details.is_none());
    }

    #[test]
    fn test_error_response_with_details() {
        let details = serde_json::json!({"field": "email", "value": "invalid"});
        let error =
            ErrorResponse::with_details("VALIDATION_ERROR", "Invalid input", details.clone());
        assert_eq!(error.error, "VALIDATION_ERROR");
        assert_eq!(error.details, Some(details));
    }

    #[test]
    fn test_storage_error_normalization() {
        assert!(matches!(
            AppError::from(StorageError::Duplicate),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(StorageError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(StorageError::Backend("down".into())),
            AppError::Storage(_)
        ));
    }

    #[test]
    fn test_otp_failures_share_one_kind() {
        let err = AppError::InvalidOtp;
        assert_eq!(err.to_string(), "Invalid or expired OTP");
    }
}
