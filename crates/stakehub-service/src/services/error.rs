//! Service layer error types
//!
//! Provides a unified error type for all service operations. Every variant
//! knows its HTTP status and the message a client may see.

use std::fmt;

use chrono::{DateTime, Utc};
use stakehub_common::{AppError, ErrorResponse};
use stakehub_core::DomainError;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation or repository failure
    Domain(DomainError),

    /// Application error (tokens, configuration, etc.)
    App(AppError),

    /// Missing or wrong credentials
    Unauthorized(String),

    /// Password accepted but a second factor is needed
    TwoFactorRequired,

    /// Authenticated but not allowed
    Forbidden(String),

    /// Login blocked by the brute-force policy
    TooManyAttempts {
        blocked_until: Option<DateTime<Utc>>,
        failed_attempts: i64,
    },

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Validation error
    Validation(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::Unauthorized(msg) | Self::Forbidden(msg) => f.write_str(msg),
            Self::TwoFactorRequired => f.write_str("2FA code required"),
            Self::TooManyAttempts { .. } => {
                f.write_str("Too many failed login attempts. Please try again later.")
            }
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Validation(msg) => f.write_str(msg),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create an unauthorized error
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Create a forbidden error
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => match e {
                DomainError::Overloaded | DomainError::Timeout(_) => 503,
                e if e.is_not_found() => 404,
                e if e.is_validation() => 400,
                _ => 500,
            },
            Self::App(e) => e.status_code(),
            Self::Unauthorized(_) | Self::TwoFactorRequired => 401,
            Self::Forbidden(_) => 403,
            Self::TooManyAttempts { .. } => 429,
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code for logs
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::TwoFactorRequired => "TWO_FACTOR_REQUIRED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::TooManyAttempts { .. } => "TOO_MANY_ATTEMPTS",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to a client
    pub fn public_message(&self) -> String {
        match self.status_code() {
            503 => "Service temporarily unavailable".to_string(),
            500..=599 => "Internal server error".to_string(),
            _ => match self {
                Self::App(e) => e.public_message(),
                other => other.to_string(),
            },
        }
    }

    /// JSON body for this error, including flow-specific fields
    pub fn error_response(&self) -> ErrorResponse {
        let body = ErrorResponse::new(self.public_message());
        match self {
            Self::TwoFactorRequired => body.with("requires2FA", true),
            Self::TooManyAttempts {
                blocked_until,
                failed_attempts,
            } => {
                let body = body.with("failedAttempts", *failed_attempts);
                match blocked_until {
                    Some(until) => body.with("blockedUntil", until.to_rfc3339()),
                    None => body,
                }
            }
            _ => body,
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::Unauthorized(_) | ServiceError::TwoFactorRequired => {
                AppError::InvalidCredentials
            }
            ServiceError::Forbidden(_) => AppError::InsufficientPermissions,
            ServiceError::TooManyAttempts { .. } => AppError::RateLimitExceeded,
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
