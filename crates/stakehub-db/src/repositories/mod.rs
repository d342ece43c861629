//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in stakehub-core.
//! Every repository shares one [`ConnectionManager`](crate::ConnectionManager)
//! and runs its statements under the manager's query deadline.

mod audit_log;
mod bot;
mod error;
mod login_attempt;
mod referral;
mod session;
mod user;

pub use audit_log::PgAuditLogRepository;
pub use bot::PgBotActivationRepository;
pub use login_attempt::PgLoginAttemptRepository;
pub use referral::PgReferralCounterRepository;
pub use session::PgSessionRepository;
pub use user::PgUserRepository;
