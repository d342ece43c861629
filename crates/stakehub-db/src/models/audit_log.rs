//! Audit log database model

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Database model for audit_logs table
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogModel {
    pub id: i64,
    pub user_id: Option<String>,
    pub action: String,
    /// JSON object with event-specific fields
    pub details: JsonValue,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// LOW / MEDIUM / HIGH stored as text
    pub severity: String,
    pub created_at: DateTime<Utc>,
}
