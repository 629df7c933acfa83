//! Error types for aiXiv services
//!
//! Provides the error taxonomy used across the catalog:
//! - Transport errors from the submission backend (surfaced, never retried)
//! - Caller errors at the HTTP boundary (validation, unknown views)
//! - Internal and configuration errors
//!
//! Malformed upstream records are not errors; they are defaulted during
//! normalization and never reach this module.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidSortKey,

    // Resource errors (4xxx)
    ViewNotFound,

    // Rate limiting (6xxx)
    RateLimited,
    TooManyViews,

    // External service errors (8xxx)
    UpstreamError,
    FetchCancelled,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidSortKey => 1002,

            ErrorCode::ViewNotFound => 4001,

            ErrorCode::RateLimited => 6001,
            ErrorCode::TooManyViews => 6002,

            ErrorCode::UpstreamError => 8001,
            ErrorCode::FetchCancelled => 8002,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Unknown sort key: {value}")]
    InvalidSortKey { value: String },

    #[error("View not found: {id}")]
    ViewNotFound { id: String },

    #[error("Rate limit exceeded: {limit} requests per second")]
    RateLimited { limit: u32 },

    #[error("Too many open views (limit {limit})")]
    TooManyViews { limit: usize },

    /// Non-2xx response, unreachable backend, or an undecodable payload.
    #[error("Failed to load submissions: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("Fetch cancelled")]
    FetchCancelled,

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AppError {
    /// Build a transport error carrying the upstream HTTP status
    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        AppError::Upstream {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Build a transport error for a request that never got a response
    pub fn upstream(message: impl Into<String>) -> Self {
        AppError::Upstream {
            status: None,
            message: message.into(),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InvalidSortKey { .. } => ErrorCode::InvalidSortKey,
            AppError::ViewNotFound { .. } => ErrorCode::ViewNotFound,
            AppError::RateLimited { .. } => ErrorCode::RateLimited,
            AppError::TooManyViews { .. } => ErrorCode::TooManyViews,
            AppError::Upstream { .. } => ErrorCode::UpstreamError,
            AppError::FetchCancelled => ErrorCode::FetchCancelled,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } |
            AppError::InvalidSortKey { .. } => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::ViewNotFound { .. } => StatusCode::NOT_FOUND,

            // 429 Too Many Requests
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            AppError::Internal { .. } |
            AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable
            AppError::TooManyViews { .. } |
            AppError::FetchCancelled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();
        let upstream_status = match &self {
            AppError::Upstream { status, .. } => *status,
            _ => None,
        };

        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                upstream_status,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation {
            message: rejection.body_text(),
            field: None,
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation {
            message: rejection.body_text(),
            field: None,
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation {
            message: rejection.body_text(),
            field: None,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}
