//! PostgreSQL implementation of LoginAttemptRepository
//!
//! Counting and aggregation live in database functions; see
//! `migrations/0001_init.sql`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use stakehub_core::entities::{BlockingCounts, DailyLoginStats, NewLoginAttempt};
use stakehub_core::traits::{LoginAttemptRepository, RepoResult};

use crate::models::{BlockingCountsRow, DailyStatsRow};
use crate::pool::ConnectionManager;

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgLoginAttemptRepository {
    db: Arc<ConnectionManager>,
}

impl PgLoginAttemptRepository {
    pub fn new(db: Arc<ConnectionManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LoginAttemptRepository for PgLoginAttemptRepository {
    #[instrument(skip(self, attempt), fields(email = %attempt.email, success = attempt.success))]
    async fn record(&self, attempt: &NewLoginAttempt) -> RepoResult<i64> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        self.db
            .run(
                sqlx::query_scalar::<_, i64>("SELECT record_login_attempt($1, $2, $3, $4, $5)")
                    .bind(&attempt.email)
                    .bind(&attempt.ip_address)
                    .bind(attempt.user_agent.as_deref())
                    .bind(attempt.success)
                    .bind(attempt.failure_reason.map(|r| r.as_str()))
                    .fetch_one(pool),
            )
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn blocking_counts(
        &self,
        email: &str,
        ip_address: &str,
        window_minutes: i64,
    ) -> RepoResult<BlockingCounts> {
        let pool = self.db.pool().await.map_err(map_db_error)?;
        let window = i32::try_from(window_minutes).unwrap_or(i32::MAX);

        let row = self
            .db
            .run(
                sqlx::query_as::<_, BlockingCountsRow>(
                    "SELECT email_failures, ip_failures, last_attempt_at \
                     FROM check_login_blocking($1, $2, $3)",
                )
                .bind(email)
                .bind(ip_address)
                .bind(window)
                .fetch_optional(pool),
            )
            .await
            .map_err(map_db_error)?;

        Ok(row.map(BlockingCounts::from).unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn daily_stats(&self, days_back: i32) -> RepoResult<Vec<DailyLoginStats>> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        let rows = self
            .db
            .run(
                sqlx::query_as::<_, DailyStatsRow>(
                    "SELECT date, total_attempts, successful_attempts, failed_attempts, \
                            unique_ips, unique_emails, success_rate \
                     FROM get_login_stats($1)",
                )
                .bind(days_back)
                .fetch_all(pool),
            )
            .await
            .map_err(map_db_error)?;

        Ok(rows.into_iter().map(DailyLoginStats::from).collect())
    }

    #[instrument(skip(self))]
    async fn cleanup(&self, days_to_keep: i32) -> RepoResult<u64> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        let deleted = self
            .db
            .run(
                sqlx::query_scalar::<_, i64>("SELECT cleanup_old_login_attempts($1)")
                    .bind(days_to_keep)
                    .fetch_one(pool),
            )
            .await
            .map_err(map_db_error)?;

        Ok(u64::try_from(deleted).unwrap_or(0))
    }
}
