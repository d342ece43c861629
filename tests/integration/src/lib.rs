//! Integration test utilities
//!
//! In-memory repositories for in-process router tests, and a live server
//! harness for tests against a real Postgres.

pub mod fixtures;
pub mod helpers;
pub mod memory;

pub use fixtures::*;
pub use helpers::*;
pub use memory::*;
