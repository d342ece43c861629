//! Axum extractors for request handling
//!
//! Custom extractors for authentication, client metadata, and validation.

mod auth;
mod client;
mod validated;

pub use auth::{AdminUser, AuthUser, SessionUser, VerifyAuth, REFRESH_COOKIE, TOKEN_COOKIE};
pub use client::{client_ip, ClientInfo};
pub use validated::{OptionalValidatedJson, ValidatedJson};
