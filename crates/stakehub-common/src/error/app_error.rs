//! Application error types
//!
//! Unified error handling for credentials, configuration, and domain failures.

use serde::Serialize;
use stakehub_core::DomainError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Rate limiting
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    // Internal errors
    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::Validation(_) => 400,

            // 401 Unauthorized
            Self::InvalidCredentials => 401,

            // 403 Forbidden
            Self::InvalidToken | Self::TokenExpired | Self::InsufficientPermissions => 403,

            // 404 Not Found
            Self::NotFound(_) => 404,

            // 429 Too Many Requests
            Self::RateLimitExceeded => 429,

            // 500 Internal Server Error
            Self::Internal(_) | Self::Config(_) => 500,

            // Map domain errors to appropriate status codes
            Self::Domain(e) => match e {
                DomainError::Overloaded | DomainError::Timeout(_) => 503,
                e if e.is_not_found() => 404,
                e if e.is_validation() => 400,
                _ => 500,
            },
        }
    }

    /// Get error code for logs and metrics
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    /// Message safe to show to a client. Server-side detail never leaks.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self.status_code() {
            503 => "Service temporarily unavailable".to_string(),
            500..=599 => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Create an internal error from any error
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Error body returned to HTTP clients: `{"error": "...", ...details}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: serde_json::Map::new(),
        }
    }

    /// Attach a top-level field next to `error`
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self::new(err.public_message())
    }
}

impl From<AppError> for ErrorResponse {
    fn from(err: AppError) -> Self {
        Self::from(&err)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
