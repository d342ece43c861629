//! Repository traits (ports)

mod repositories;

pub use repositories::{
    AuditLogRepository, BotActivationRepository, LoginAttemptRepository,
    ReferralCounterRepository, RepoResult, SessionRepository, UserRepository,
};
