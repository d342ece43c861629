//! Database layer errors

use std::time::Duration;

use stakehub_core::DomainError;

/// Errors raised by the connection manager, admission gate and query builders
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Connection pool error: {0}")]
    Pool(#[source] sqlx::Error),

    #[error("Query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Query timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Invalid database configuration: {0}")]
    Configuration(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Admission wait exceeded {}ms", .0.as_millis())]
    Overloaded(Duration),
}

impl DbError {
    /// Whether the failure is a capacity problem rather than a broken query
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Overloaded(_) | Self::Pool(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => Self::Pool(e),
            other => Self::Query(other),
        }
    }
}

impl From<DbError> for DomainError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Timeout(d) => DomainError::Timeout(d.as_millis() as u64),
            DbError::Overloaded(_) => DomainError::Overloaded,
            DbError::InvalidQuery(msg) => DomainError::InvalidIdentifier(msg),
            other => DomainError::DatabaseError(other.to_string()),
        }
    }
}
