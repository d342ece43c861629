//! Error handling utilities for repositories

use stakehub_core::error::DomainError;
use tracing::warn;

use crate::error::DbError;

/// Convert a database-layer error to DomainError, logging the cause
pub fn map_db_error(e: DbError) -> DomainError {
    warn!(error = %e, transient = e.is_transient(), "Repository operation failed");
    DomainError::from(e)
}
