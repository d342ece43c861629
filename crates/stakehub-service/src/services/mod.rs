//! Business logic services
//!
//! Each service wraps a borrowed [`ServiceContext`] and applies the failure
//! policy of its operations (fail-open, fail-closed, fail-soft, fallback).

pub mod admin;
pub mod audit;
pub mod auth;
pub mod bot;
pub mod context;
pub mod error;
pub mod login_security;
pub mod referral;
pub mod session;

pub use admin::AdminService;
pub use audit::{spawn_audit_log, AuditLogger};
pub use auth::AuthService;
pub use bot::BotService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use login_security::LoginSecurityService;
pub use referral::ReferralService;
pub use session::{RequestSession, SessionKey, SessionService};
