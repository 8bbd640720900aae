//! Error handling module.
//!
//! Allocation failures are explicit values: a failed `acquire` is always an
//! `Err`, never an in-band `0`. Errors map onto HTTP status codes and the
//! standard `{code, message, data}` envelope at the API edge.

pub mod codes;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::domain::IdType;

pub use codes::ErrorCode;

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A type configuration is malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A type was registered twice.
    #[error("Type already registered: {0}")]
    ConfigExists(IdType),

    /// No configuration is registered for the requested type.
    #[error("Type not configured: {0}")]
    NotConfigured(IdType),

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// The counter service failed during a refill.
    #[error("Counter error: {0}")]
    Counter(#[from] CounterError),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidConfig(_) => ErrorCode::INVALID_CONFIG,
            Self::ConfigExists(_) => ErrorCode::CONFIG_EXISTS,
            Self::NotConfigured(_) => ErrorCode::CONFIG_NOT_FOUND,
            Self::BadRequest(_) => ErrorCode::BAD_REQUEST,
            Self::Counter(CounterError::Transient(_)) => ErrorCode::COUNTER_UNAVAILABLE,
            Self::Counter(CounterError::Protocol(_)) => ErrorCode::COUNTER_PROTOCOL,
            Self::Internal(_) => ErrorCode::INTERNAL_ERROR,
        }
    }

    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotConfigured(_) => StatusCode::NOT_FOUND,
            Self::ConfigExists(_) => StatusCode::CONFLICT,
            Self::InvalidConfig(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Counter(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether retrying the same operation later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Counter(e) if e.is_transient())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code().as_i32();
        let message = self.to_string();

        tracing::error!(
            error_code = code,
            status = %status,
            message = %message,
            "Request failed"
        );

        let body = Json(json!({
            "code": code,
            "message": message,
            "data": null
        }));

        (status, body).into_response()
    }
}

/// Counter service error type.
#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    /// The counter service could not be reached, timed out, or failed I/O.
    #[error("Counter service unavailable: {0}")]
    Transient(String),

    /// The counter service answered with something that is not a counter value.
    #[error("Malformed counter response: {0}")]
    Protocol(String),
}

impl CounterError {
    /// Whether the failure is worth retrying without intervention.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<std::io::Error> for CounterError {
    fn from(err: std::io::Error) -> Self {
        Self::Transient(err.to_string())
    }
}

impl From<serde_json::Error> for CounterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias using `CounterError`.
pub type CounterResult<T> = std::result::Result<T, CounterError>;
