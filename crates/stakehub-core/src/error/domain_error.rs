//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Referral counter not found: {0}")]
    CounterNotFound(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Operation timed out after {0} ms")]
    Timeout(u64),

    #[error("Server is overloaded")]
    Overloaded,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::SessionNotFound(_) => "UNKNOWN_SESSION",
            Self::CounterNotFound(_) => "UNKNOWN_COUNTER",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidIdentifier(_) => "INVALID_IDENTIFIER",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Overloaded => "OVERLOADED",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_) | Self::SessionNotFound(_) | Self::CounterNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::InvalidIdentifier(_))
    }

    /// Check if the error came from infrastructure rather than the request
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::Timeout(_) | Self::Overloaded | Self::InternalError(_)
        )
    }
}
