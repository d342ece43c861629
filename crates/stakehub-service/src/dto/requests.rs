//! Request DTOs for API endpoints
//!
//! Bodies implement `Deserialize` and `Validate`; query strings only `Deserialize`.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use stakehub_core::entities::{AuditLogFilter, AuditSeverity};

// ============================================================================
// Request metadata
// ============================================================================

/// Caller address and user agent, resolved from proxy headers by the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    pub ip_address: String,
    pub user_agent: Option<String>,
}

impl ClientContext {
    pub const UNKNOWN_IP: &'static str = "127.0.0.1";

    pub fn new(ip_address: impl Into<String>, user_agent: Option<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            user_agent,
        }
    }
}

impl Default for ClientContext {
    fn default() -> Self {
        Self::new(Self::UNKNOWN_IP, None)
    }
}

// ============================================================================
// Auth Requests
// ============================================================================

/// Admin login request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub password: String,

    #[serde(default)]
    pub two_factor_code: Option<String>,
}

impl AdminLoginRequest {
    /// Trimmed, lowercased email
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }

    /// The 2FA code, ignoring blank input
    pub fn two_factor_code(&self) -> Option<&str> {
        self.two_factor_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Token refresh request. The cookie takes precedence over the body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

// ============================================================================
// Admin Requests
// ============================================================================

/// `?days=` for login statistics
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    pub days: Option<i32>,
}

impl StatsQuery {
    pub const DEFAULT_DAYS: i32 = 7;
    pub const MAX_DAYS: i32 = 365;

    pub fn days(&self) -> i32 {
        self.days
            .unwrap_or(Self::DEFAULT_DAYS)
            .clamp(1, Self::MAX_DAYS)
    }
}

/// Audit log listing filters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub user_id: Option<String>,
    pub action: Option<String>,
    pub severity: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AuditLogQuery {
    /// Convert to a repository filter; an unknown severity is a validation error
    pub fn into_filter(self) -> Result<AuditLogFilter, String> {
        let severity = self
            .severity
            .as_deref()
            .map(|s| AuditSeverity::parse(s).ok_or_else(|| format!("Unknown severity: {s}")))
            .transpose()?;

        Ok(AuditLogFilter {
            user_id: self.user_id,
            action: self.action,
            severity,
            from: self.from,
            to: self.to,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

/// Maintenance cleanup options
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CleanupRequest {
    #[validate(range(min = 1, max = 3650, message = "daysToKeep must be between 1 and 3650"))]
    pub days_to_keep: Option<i32>,
}

impl CleanupRequest {
    pub const DEFAULT_DAYS_TO_KEEP: i32 = 30;

    pub fn days_to_keep(&self) -> i32 {
        self.days_to_keep.unwrap_or(Self::DEFAULT_DAYS_TO_KEEP)
    }
}
