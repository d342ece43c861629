//! Route handlers
//!
//! All HTTP request handlers organized by area.

pub mod admin;
pub mod auth;
pub mod bots;
pub mod health;
pub mod sessions;
