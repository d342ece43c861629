//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output with camelCase keys.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stakehub_core::entities::{
    AuditLog, BotActivation, BotType, DailyLoginStats, SecurityReport, SessionStats,
};

// ============================================================================
// Auth Responses
// ============================================================================

/// The logged-in admin as returned to the client
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
    pub two_factor_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Successful admin login
///
/// The tokens travel as cookies; they are kept here for the handler and
/// only the access token is echoed in the body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    pub success: bool,
    pub user: AdminUserResponse,
    pub token: String,
    #[serde(skip)]
    pub refresh_token: String,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Rotated tokens
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRefreshResponse {
    pub success: bool,
    pub token: String,
    #[serde(skip)]
    pub refresh_token: String,
    pub expires_in: i64,
}

/// `GET /api/auth/status`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

// ============================================================================
// Session Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_current: bool,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// `GET /api/sessions`
#[derive(Debug, Clone, Serialize)]
pub struct SessionListResponse {
    pub success: bool,
    pub sessions: Vec<SessionResponse>,
}

/// Result of a revoke call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokedResponse {
    pub success: bool,
    pub revoked: u64,
}

// ============================================================================
// Bot Responses
// ============================================================================

/// Which bot tiers the user may use right now
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotEligibility {
    pub has_basic_bot: bool,
    pub has_pro_bot: bool,
    pub has_elite_bot: bool,
}

impl BotEligibility {
    pub fn set(&mut self, bot_type: BotType) {
        match bot_type {
            BotType::Basic => self.has_basic_bot = true,
            BotType::Pro => self.has_pro_bot = true,
            BotType::Elite => self.has_elite_bot = true,
        }
    }

    pub fn has(&self, bot_type: BotType) -> bool {
        match bot_type {
            BotType::Basic => self.has_basic_bot,
            BotType::Pro => self.has_pro_bot,
            BotType::Elite => self.has_elite_bot,
        }
    }
}

/// `GET /api/bots/my-bots`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyBotsResponse {
    pub success: bool,
    pub bots: Vec<BotActivation>,
    #[serde(flatten)]
    pub eligibility: BotEligibility,
}

/// `GET /api/bots/{bot_type}/access`
#[derive(Debug, Clone, Serialize)]
pub struct BotAccessResponse {
    pub success: bool,
    pub activation: BotActivation,
}

// ============================================================================
// Admin Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SecurityReportResponse {
    pub success: bool,
    pub report: SecurityReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginStatsResponse {
    pub success: bool,
    pub days: i32,
    pub stats: Vec<DailyLoginStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatsResponse {
    pub success: bool,
    pub stats: SessionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditLogListResponse {
    pub success: bool,
    pub logs: Vec<AuditLog>,
}

/// Outcome of a maintenance run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceResponse {
    pub success: bool,
    pub deleted_login_attempts: u64,
    pub expired_sessions: u64,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: HealthChecks,
}

/// Individual health checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: bool,
}

impl ReadinessResponse {
    pub fn ready(database: bool) -> Self {
        Self {
            status: if database { "ready" } else { "not_ready" },
            checks: HealthChecks { database },
        }
    }
}
