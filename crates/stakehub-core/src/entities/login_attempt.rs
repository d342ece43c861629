//! Login attempt entity and the blocking policy evaluated over attempt history

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

/// Why a login attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoginFailureReason {
    UserNotFound,
    InvalidPassword,
    NotAdmin,
    AccountInactive,
    Invalid2fa,
    Blocked,
}

impl LoginFailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::NotAdmin => "NOT_ADMIN",
            Self::AccountInactive => "ACCOUNT_INACTIVE",
            Self::Invalid2fa => "INVALID_2FA",
            Self::Blocked => "BLOCKED",
        }
    }
}

/// A login attempt to append to the history
#[derive(Debug, Clone)]
pub struct NewLoginAttempt {
    pub email: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub success: bool,
    pub failure_reason: Option<LoginFailureReason>,
}

impl NewLoginAttempt {
    pub fn success(email: &str, ip_address: &str, user_agent: Option<&str>) -> Self {
        Self {
            email: email.to_string(),
            ip_address: ip_address.to_string(),
            user_agent: user_agent.map(str::to_string),
            success: true,
            failure_reason: None,
        }
    }

    pub fn failure(
        email: &str,
        ip_address: &str,
        user_agent: Option<&str>,
        reason: LoginFailureReason,
    ) -> Self {
        Self {
            email: email.to_string(),
            ip_address: ip_address.to_string(),
            user_agent: user_agent.map(str::to_string),
            success: false,
            failure_reason: Some(reason),
        }
    }
}

/// Failed-attempt counts inside the trailing window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockingCounts {
    pub email_failures: i64,
    pub ip_failures: i64,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockReason {
    Email,
    Ip,
}

/// Result of a blocking check. Recomputed on every check, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockingStatus {
    pub is_blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<BlockReason>,
    pub failed_attempts: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_until: Option<DateTime<Utc>>,
}

impl BlockingStatus {
    /// The status reported when the check itself could not run
    pub fn open() -> Self {
        Self {
            is_blocked: false,
            block_reason: None,
            failed_attempts: 0,
            last_attempt_at: None,
            block_until: None,
        }
    }
}

/// Thresholds for brute-force protection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockingPolicy {
    pub max_email_failures: i64,
    pub max_ip_failures: i64,
    pub window_minutes: i64,
}

impl Default for BlockingPolicy {
    fn default() -> Self {
        Self {
            max_email_failures: 5,
            max_ip_failures: 10,
            window_minutes: 15,
        }
    }
}

impl BlockingPolicy {
    pub fn window(&self) -> Duration {
        Duration::minutes(self.window_minutes)
    }

    /// Evaluate counts against the thresholds. A count exceeding its
    /// threshold blocks; the email rule is checked first.
    pub fn evaluate(&self, counts: &BlockingCounts) -> BlockingStatus {
        let reason = if counts.email_failures > self.max_email_failures {
            Some(BlockReason::Email)
        } else if counts.ip_failures > self.max_ip_failures {
            Some(BlockReason::Ip)
        } else {
            None
        };

        let failed_attempts = match reason {
            Some(BlockReason::Ip) => counts.ip_failures,
            _ => counts.email_failures,
        };

        BlockingStatus {
            is_blocked: reason.is_some(),
            block_reason: reason,
            failed_attempts,
            last_attempt_at: counts.last_attempt_at,
            block_until: reason
                .and(counts.last_attempt_at)
                .map(|last| last + self.window()),
        }
    }
}

/// One day of aggregated login activity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLoginStats {
    pub date: NaiveDate,
    pub total_attempts: i64,
    pub successful_attempts: i64,
    pub failed_attempts: i64,
    pub unique_ips: i64,
    pub unique_emails: i64,
    pub success_rate: f64,
}

/// Summary over the recent daily stats
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityReport {
    pub period_days: usize,
    pub total_attempts: i64,
    pub successful_attempts: i64,
    pub failed_attempts: i64,
    pub success_rate: f64,
    pub suspicious_activity: bool,
    pub daily_stats: Vec<DailyLoginStats>,
    pub generated_at: DateTime<Utc>,
}

impl SecurityReport {
    /// Daily failure count above which a day is flagged
    pub const DAILY_FAILURE_ALERT: i64 = 100;
    /// Overall success rate (percent) below which activity is flagged
    pub const MIN_SUCCESS_RATE: f64 = 50.0;

    pub fn from_daily_stats(daily_stats: Vec<DailyLoginStats>, generated_at: DateTime<Utc>) -> Self {
        let total_attempts: i64 = daily_stats.iter().map(|d| d.total_attempts).sum();
        let successful_attempts: i64 = daily_stats.iter().map(|d| d.successful_attempts).sum();
        let failed_attempts: i64 = daily_stats.iter().map(|d| d.failed_attempts).sum();

        let success_rate = if total_attempts > 0 {
            (successful_attempts as f64 / total_attempts as f64) * 100.0
        } else {
            0.0
        };

        let spike = daily_stats
            .iter()
            .any(|d| d.failed_attempts > Self::DAILY_FAILURE_ALERT);
        let low_rate = total_attempts > 0 && success_rate < Self::MIN_SUCCESS_RATE;

        Self {
            period_days: daily_stats.len(),
            total_attempts,
            successful_attempts,
            failed_attempts,
            success_rate,
            suspicious_activity: spike || low_rate,
            daily_stats,
            generated_at,
        }
    }
}
