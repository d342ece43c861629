//! Database models - SQLx-compatible structs for PostgreSQL tables and function results

mod audit_log;
mod bot;
mod login_attempt;
mod session;
mod user;

pub use audit_log::AuditLogModel;
pub use bot::BotActivationModel;
pub use login_attempt::{BlockingCountsRow, DailyStatsRow};
pub use session::{SessionModel, SessionStatsRow};
pub use user::UserModel;
pub(crate) use user::USER_COLUMNS;
