//! Domain entities - core business objects

mod audit_log;
mod bot;
mod login_attempt;
mod referral;
mod session;
mod user;

pub use audit_log::{actions, AuditCategory, AuditLog, AuditLogFilter, AuditSeverity, NewAuditLog};
pub use bot::{BotActivation, BotType};
pub use login_attempt::{
    BlockReason, BlockingCounts, BlockingPolicy, BlockingStatus, DailyLoginStats,
    LoginFailureReason, NewLoginAttempt, SecurityReport,
};
pub use referral::{format_referral_code, USER_REFERRAL_COUNTER};
pub use session::{NewSession, Session, SessionRecord, SessionStats, EPHEMERAL_SESSION_PREFIX};
pub use user::User;
