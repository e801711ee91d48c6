//! Error handling module
//!
//! Defines the upstream failure taxonomy and the HTTP-facing application error

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Public message for transport-level failures
pub const UPSTREAM_ERROR_MESSAGE: &str = "Upstream API error";
/// Public message for bodies the normalizer cannot interpret
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response from AI service";
/// Public message for upstream refusals
pub const REFUSED_MESSAGE: &str = "AI refused to answer";

/// Failure class of a single upstream call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    /// Connection error or non-2xx upstream status
    TransportFailure,
    /// 2xx status with a body that cannot be interpreted
    UpstreamMalformed,
    /// The upstream marked its own output as a refusal
    Forbidden,
}

impl StatusClass {
    /// HTTP status a caller should answer with
    pub fn status_code(&self) -> StatusCode {
        match self {
            StatusClass::TransportFailure | StatusClass::UpstreamMalformed => StatusCode::BAD_GATEWAY,
            StatusClass::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    /// Default human-readable message for this class
    pub fn default_message(&self) -> &'static str {
        match self {
            StatusClass::TransportFailure => UPSTREAM_ERROR_MESSAGE,
            StatusClass::UpstreamMalformed => INVALID_RESPONSE_MESSAGE,
            StatusClass::Forbidden => REFUSED_MESSAGE,
        }
    }
}

/// Classified outcome of a failed upstream call
///
/// Never carries the raw upstream payload; that goes to the log only.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ClassifiedError {
    /// Failure class
    #[serde(rename = "statusClass")]
    pub class: StatusClass,
    /// Human-readable message
    pub message: String,
}

impl ClassifiedError {
    /// Create an error with the class's default message
    pub fn new(class: StatusClass) -> Self {
        Self {
            class,
            message: class.default_message().to_string(),
        }
    }

    pub fn transport_failure() -> Self {
        Self::new(StatusClass::TransportFailure)
    }

    pub fn upstream_malformed() -> Self {
        Self::new(StatusClass::UpstreamMalformed)
    }

    pub fn forbidden() -> Self {
        Self::new(StatusClass::Forbidden)
    }

    pub fn status_code(&self) -> StatusCode {
        self.class.status_code()
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Upstream call failed or its body was rejected
    #[error("{0}")]
    Upstream(#[from] ClassifiedError),

    /// Request validation failed
    #[error("{0}")]
    Validation(String),

    /// Server is missing required configuration
    #[error("Server misconfiguration: {0}")]
    Misconfigured(String),

    /// Request body exceeds the configured size limit
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always "error"
    pub status: String,
    /// Public error message
    pub message: String,
}

impl AppError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Upstream(e) => e.status_code(),
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Misconfigured(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the end user
    pub fn public_message(&self) -> String {
        match self {
            AppError::Upstream(e) => e.message.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::PayloadTooLarge => "Request body too large".to_string(),
            AppError::Misconfigured(_) => "Server misconfiguration".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Whether the error should be logged at error level
    pub fn should_log_details(&self) -> bool {
        !matches!(self, AppError::Validation(_) | AppError::PayloadTooLarge)
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            status: "error".to_string(),
            message: self.public_message(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if self.should_log_details() {
            tracing::error!("Application error: {} - Status code: {}", self, status);
        } else {
            tracing::warn!("Client error: {} - Status code: {}", self, status);
        }

        (status, Json(self.to_error_response())).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Error handling helper functions
pub mod helpers {
    use super::*;

    /// Create validation error
    pub fn validation_error(message: impl Into<String>) -> AppError {
        AppError::Validation(message.into())
    }

    /// Create misconfiguration error
    pub fn misconfigured_error(message: impl Into<String>) -> AppError {
        AppError::Misconfigured(message.into())
    }

    /// Create internal error
    pub fn internal_error(message: impl Into<String>) -> AppError {
        AppError::Internal(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_class_codes() {
        assert_eq!(StatusClass::TransportFailure.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(StatusClass::UpstreamMalformed.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(StatusClass::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(AppError::from(ClassifiedError::forbidden()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Validation("test".to_string()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::PayloadTooLarge.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(AppError::Misconfigured("test".to_string()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::Internal("test".to_string()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Internal("socket closed at 0xdeadbeef".to_string());
        let body = err.to_error_response();

        assert_eq!(body.status, "error");
        assert_eq!(body.message, "Internal server error");
    }
}
