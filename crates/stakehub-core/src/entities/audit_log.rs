//! Audit log entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Well-known audit actions
pub mod actions {
    pub const LOGIN_SUCCESS: &str = "LOGIN_SUCCESS";
    pub const LOGIN_FAILED: &str = "LOGIN_FAILED";
    pub const LOGOUT: &str = "LOGOUT";
    pub const TOKEN_REFRESHED: &str = "TOKEN_REFRESHED";
    pub const TWO_FACTOR_FAILED: &str = "TWO_FACTOR_FAILED";
    pub const ACCOUNT_BLOCKED: &str = "ACCOUNT_BLOCKED";
    pub const UNAUTHORIZED_ADMIN_ACCESS: &str = "UNAUTHORIZED_ADMIN_ACCESS";
    pub const SESSION_REVOKED: &str = "SESSION_REVOKED";
    pub const SESSIONS_REVOKED: &str = "SESSIONS_REVOKED";
    pub const MAINTENANCE_CLEANUP: &str = "MAINTENANCE_CLEANUP";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditSeverity {
    Low,
    Medium,
    High,
}

impl AuditSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }
}

/// Event family used to pick a severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditCategory {
    Auth,
    Admin,
    Payment,
    Security,
}

impl AuditCategory {
    /// Derive the severity of an action within this category
    pub fn severity_for(self, action: &str) -> AuditSeverity {
        let action = action.to_ascii_uppercase();
        let has = |words: &[&str]| words.iter().any(|w| action.contains(w));

        match self {
            Self::Security => {
                if has(&["BLOCK", "UNAUTHORIZED", "SUSPICIOUS", "BREACH"]) {
                    AuditSeverity::High
                } else {
                    AuditSeverity::Medium
                }
            }
            Self::Auth => {
                if has(&["LOGIN_FAILED", "TWO_FACTOR_FAILED"]) {
                    AuditSeverity::Medium
                } else {
                    AuditSeverity::Low
                }
            }
            Self::Admin => {
                if has(&["DELETE", "BAN", "SUSPEND"]) {
                    AuditSeverity::High
                } else {
                    AuditSeverity::Medium
                }
            }
            Self::Payment => {
                if has(&["WITHDRAWAL", "REFUND", "FAILED"]) {
                    AuditSeverity::High
                } else {
                    AuditSeverity::Medium
                }
            }
        }
    }
}

/// Entry to append to the audit trail
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub user_id: Option<String>,
    pub action: String,
    pub details: serde_json::Value,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub severity: AuditSeverity,
}

impl NewAuditLog {
    pub fn new(action: impl Into<String>, severity: AuditSeverity) -> Self {
        Self {
            user_id: None,
            action: action.into(),
            details: serde_json::Value::Object(serde_json::Map::new()),
            ip_address: None,
            user_agent: None,
            severity,
        }
    }

    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    pub fn client(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: i64,
    pub user_id: Option<String>,
    pub action: String,
    pub details: serde_json::Value,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub severity: AuditSeverity,
    pub created_at: DateTime<Utc>,
}

/// Filters for reading the audit trail. Results are newest first.
#[derive(Debug, Clone, Default)]
pub struct AuditLogFilter {
    pub user_id: Option<String>,
    pub action: Option<String>,
    pub severity: Option<AuditSeverity>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AuditLogFilter {
    pub const DEFAULT_LIMIT: i64 = 100;
    pub const MAX_LIMIT: i64 = 1000;

    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn effective_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}
