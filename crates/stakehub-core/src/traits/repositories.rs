//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Failure policies (fail-open, fail-soft,
//! fallback) are applied by the services, so implementations simply
//! propagate errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    AuditLog, AuditLogFilter, BlockingCounts, BotActivation, BotType, DailyLoginStats,
    NewAuditLog, NewLoginAttempt, NewSession, Session, SessionStats, User,
};
use crate::error::DomainError;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>>;

    /// Find user by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: &str) -> RepoResult<Option<String>>;

    /// Current active flag, `None` when the user does not exist
    async fn is_active(&self, id: &str) -> RepoResult<Option<bool>>;

    /// Check if a referral code is already assigned to some user
    async fn referral_code_exists(&self, code: &str) -> RepoResult<bool>;

    /// Stamp a successful login
    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> RepoResult<()>;
}

// ============================================================================
// Login Attempt Repository
// ============================================================================

#[async_trait]
pub trait LoginAttemptRepository: Send + Sync {
    /// Append an attempt, returning its identifier
    async fn record(&self, attempt: &NewLoginAttempt) -> RepoResult<i64>;

    /// Failed-attempt counts for the email and the IP within the trailing window
    async fn blocking_counts(
        &self,
        email: &str,
        ip_address: &str,
        window_minutes: i64,
    ) -> RepoResult<BlockingCounts>;

    /// Per-day aggregates, newest day first
    async fn daily_stats(&self, days_back: i32) -> RepoResult<Vec<DailyLoginStats>>;

    /// Delete attempts older than the retention window
    async fn cleanup(&self, days_to_keep: i32) -> RepoResult<u64>;
}

// ============================================================================
// Session Repository
// ============================================================================

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &NewSession) -> RepoResult<Session>;

    /// Find an active, unexpired session by token hash and bump its last-used time
    async fn validate(&self, token_hash: &str) -> RepoResult<Option<Session>>;

    /// Deactivate a session, returning whether anything changed
    async fn revoke(&self, session_id: &str) -> RepoResult<bool>;

    async fn revoke_all_for_user(&self, user_id: &str) -> RepoResult<u64>;

    /// Deactivate every session of the user except one
    async fn revoke_others(&self, user_id: &str, except_session_id: &str) -> RepoResult<u64>;

    /// Active sessions of a user, most recently used first
    async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Session>>;

    /// Deactivate active sessions past their expiry; rows are kept
    async fn cleanup_expired(&self) -> RepoResult<u64>;

    async fn stats(&self) -> RepoResult<SessionStats>;
}

// ============================================================================
// Audit Log Repository
// ============================================================================

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn insert(&self, entry: &NewAuditLog) -> RepoResult<i64>;

    async fn find(&self, filter: &AuditLogFilter) -> RepoResult<Vec<AuditLog>>;

    /// Create the table and its indexes if missing
    async fn ensure_schema(&self) -> RepoResult<()>;
}

// ============================================================================
// Bot Activation Repository
// ============================================================================

#[async_trait]
pub trait BotActivationRepository: Send + Sync {
    /// All activations of a user, newest first
    async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<BotActivation>>;

    /// The active, unexpired activation of a given type
    async fn find_active(
        &self,
        user_id: &str,
        bot_type: BotType,
    ) -> RepoResult<Option<BotActivation>>;
}

// ============================================================================
// Referral Counter Repository
// ============================================================================

#[async_trait]
pub trait ReferralCounterRepository: Send + Sync {
    /// Atomically advance the counter (creating it on first use) and return the new value
    async fn next_value(&self, counter_type: &str) -> RepoResult<i64>;

    async fn current_value(&self, counter_type: &str) -> RepoResult<Option<i64>>;
}
