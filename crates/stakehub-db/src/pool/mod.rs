//! Connection management and admission control

mod admission;
mod manager;
mod ssl;

pub use admission::{AdmissionGate, AdmissionPermit};
pub use manager::{ConnectionManager, PoolSettings};
pub use ssl::SslPolicy;

// Re-export PgPool for convenience
pub use sqlx::postgres::PgPool;
