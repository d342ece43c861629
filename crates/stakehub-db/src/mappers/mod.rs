//! Model to entity mappers
//!
//! `From<Model> for Entity` for rows that always map cleanly, `TryFrom`
//! where a text column must parse into a domain enum.

mod audit_log;
mod bot;
mod login_attempt;
mod session;
mod user;
