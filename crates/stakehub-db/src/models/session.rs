//! Session database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for sessions table
#[derive(Debug, Clone, FromRow)]
pub struct SessionModel {
    pub id: String,
    pub user_id: String,
    pub token_hash: String,
    pub refresh_token_hash: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Row returned by `get_session_stats()`
#[derive(Debug, Clone, FromRow)]
pub struct SessionStatsRow {
    pub total_sessions: Option<i64>,
    pub active_sessions: Option<i64>,
    pub expired_sessions: Option<i64>,
    pub unique_users: Option<i64>,
}
