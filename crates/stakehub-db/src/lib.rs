//! # stakehub-db
//!
//! Database layer implementing the repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! - A process-wide [`ConnectionManager`] that creates the pool lazily, exactly once,
//!   and runs queries and transactions under a deadline
//! - An [`AdmissionGate`] bounding how many critical operations run at once
//! - A small query helper layer producing parameterized SQL from filters and mutations
//! - Database models with SQLx `FromRow` derives and their entity mappers
//! - Repository implementations, most of which call database-side functions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stakehub_db::{ConnectionManager, PoolSettings, PgSessionRepository};
//!
//! let db = Arc::new(ConnectionManager::new(PoolSettings::from_config(&config.database, false)));
//! let sessions = PgSessionRepository::new(db.clone());
//! ```

pub mod error;
pub mod mappers;
pub mod models;
pub mod pool;
pub mod query;
pub mod repositories;

// Re-export commonly used types
pub use error::DbError;
pub use pool::{AdmissionGate, AdmissionPermit, ConnectionManager, PgPool, PoolSettings, SslPolicy};
pub use repositories::{
    PgAuditLogRepository, PgBotActivationRepository, PgLoginAttemptRepository,
    PgReferralCounterRepository, PgSessionRepository, PgUserRepository,
};

/// Embedded schema migrations
pub static MIGRATIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations");
