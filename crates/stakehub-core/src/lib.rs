//! # stakehub-core
//!
//! Domain layer containing entities, login-security policy, and repository traits.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;

// Re-export commonly used types at crate root
pub use entities::{
    actions, format_referral_code, AuditCategory, AuditLog, AuditLogFilter, AuditSeverity,
    BlockReason, BlockingCounts, BlockingPolicy, BlockingStatus, BotActivation, BotType,
    DailyLoginStats, LoginFailureReason, NewAuditLog, NewLoginAttempt, NewSession,
    SecurityReport, Session, SessionRecord, SessionStats, User, EPHEMERAL_SESSION_PREFIX,
    USER_REFERRAL_COUNTER,
};
pub use error::DomainError;
pub use traits::{
    AuditLogRepository, BotActivationRepository, LoginAttemptRepository, ReferralCounterRepository,
    RepoResult, SessionRepository, UserRepository,
};
