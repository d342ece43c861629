//! Rows returned by the login attempt functions

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Row returned by `check_login_blocking()`
#[derive(Debug, Clone, FromRow)]
pub struct BlockingCountsRow {
    pub email_failures: Option<i64>,
    pub ip_failures: Option<i64>,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

/// Row returned by `get_login_stats()`
#[derive(Debug, Clone, FromRow)]
pub struct DailyStatsRow {
    pub date: NaiveDate,
    pub total_attempts: i64,
    pub successful_attempts: i64,
    pub failed_attempts: i64,
    pub unique_ips: i64,
    pub unique_emails: i64,
    pub success_rate: Option<f64>,
}
