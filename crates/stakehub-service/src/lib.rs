//! # stakehub-service
//!
//! Application layer: login security, session management, audit logging,
//! the admin authentication flow, bot activation checks and referral codes.
//!
//! Services borrow a [`ServiceContext`] and are cheap to construct per request:
//!
//! ```rust,ignore
//! let report = LoginSecurityService::new(&ctx).generate_security_report().await?;
//! ```

pub mod dto;
pub mod services;

pub use dto::*;
pub use services::*;
