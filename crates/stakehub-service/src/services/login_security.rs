//! Login security service
//!
//! Records login attempts and decides whether an email or IP is currently
//! blocked. Blocking is recomputed from the attempt history on every check.

use chrono::Utc;
use tracing::{info, instrument, warn};

use stakehub_core::entities::{BlockingStatus, DailyLoginStats, NewLoginAttempt, SecurityReport};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Days folded into the security report
pub const REPORT_DAYS: i32 = 7;

/// Login security service
pub struct LoginSecurityService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LoginSecurityService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Append an attempt to the history, returning its id
    ///
    /// # Errors
    /// Propagates repository failures; callers decide whether to continue
    #[instrument(skip(self, attempt), fields(email = %attempt.email, ip = %attempt.ip_address, success = attempt.success))]
    pub async fn record_attempt(&self, attempt: &NewLoginAttempt) -> ServiceResult<i64> {
        Ok(self.ctx.login_attempt_repo().record(attempt).await?)
    }

    /// Current blocking state for an email and IP.
    ///
    /// Fails open: if the history cannot be read the caller is not blocked.
    #[instrument(skip(self))]
    pub async fn check_blocking(&self, email: &str, ip_address: &str) -> BlockingStatus {
        let policy = self.ctx.blocking_policy();

        match self
            .ctx
            .login_attempt_repo()
            .blocking_counts(email, ip_address, policy.window_minutes)
            .await
        {
            Ok(counts) => {
                let status = policy.evaluate(&counts);
                if status.is_blocked {
                    warn!(
                        reason = ?status.block_reason,
                        failed_attempts = status.failed_attempts,
                        "Login blocked"
                    );
                }
                status
            }
            Err(e) => {
                warn!(error = %e, "Blocking check failed, allowing attempt");
                BlockingStatus::open()
            }
        }
    }

    /// Daily aggregates for the last `days_back` days, newest first
    #[instrument(skip(self))]
    pub async fn get_login_stats(&self, days_back: i32) -> ServiceResult<Vec<DailyLoginStats>> {
        Ok(self.ctx.login_attempt_repo().daily_stats(days_back).await?)
    }

    /// Summary of the last week with a suspicious-activity flag
    #[instrument(skip(self))]
    pub async fn generate_security_report(&self) -> ServiceResult<SecurityReport> {
        let daily = self.get_login_stats(REPORT_DAYS).await?;
        let report = SecurityReport::from_daily_stats(daily, Utc::now());

        if report.suspicious_activity {
            warn!(
                failed_attempts = report.failed_attempts,
                success_rate = report.success_rate,
                "Suspicious login activity detected"
            );
        }
        Ok(report)
    }

    /// Delete attempts older than `days_to_keep` days
    #[instrument(skip(self))]
    pub async fn cleanup_old_attempts(&self, days_to_keep: i32) -> ServiceResult<u64> {
        let deleted = self.ctx.login_attempt_repo().cleanup(days_to_keep).await?;
        info!(deleted, days_to_keep, "Old login attempts removed");
        Ok(deleted)
    }
}
