//! PostgreSQL implementation of ReferralCounterRepository

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, instrument};

use stakehub_core::traits::{ReferralCounterRepository, RepoResult};

use crate::pool::ConnectionManager;
use crate::query::{self, Filter, UpdateOp};

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgReferralCounterRepository {
    db: Arc<ConnectionManager>,
}

impl PgReferralCounterRepository {
    pub fn new(db: Arc<ConnectionManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReferralCounterRepository for PgReferralCounterRepository {
    /// Seed, lock, then increment inside one transaction so concurrent
    /// callers are serialized on the counter row.
    #[instrument(skip(self))]
    async fn next_value(&self, counter_type: &str) -> RepoResult<i64> {
        let counter = counter_type.to_string();
        let increment = query::update(
            "referral_counters",
            &[
                ("current_value", UpdateOp::Increment(1.into())),
                ("updated_at", UpdateOp::Set(Utc::now().into())),
            ],
            &Filter::new().eq("counter_type", counter_type),
        )
        .map_err(map_db_error)?;

        let value = self
            .db
            .transaction(move |conn| {
                Box::pin(async move {
                    sqlx::query(
                        "INSERT INTO referral_counters (counter_type, current_value) \
                         VALUES ($1, 0) ON CONFLICT (counter_type) DO NOTHING",
                    )
                    .bind(&counter)
                    .execute(&mut *conn)
                    .await?;

                    sqlx::query(
                        "SELECT current_value FROM referral_counters \
                         WHERE counter_type = $1 FOR UPDATE",
                    )
                    .bind(&counter)
                    .execute(&mut *conn)
                    .await?;

                    let returning = format!(
                        "WITH updated AS ({}) SELECT current_value FROM updated",
                        increment.sql
                    );
                    let built = query::BuiltQuery {
                        sql: returning,
                        params: increment.params,
                    };
                    built.query_scalar::<i64>().fetch_one(&mut *conn).await
                })
            })
            .await
            .map_err(map_db_error)?;

        debug!(counter_type, value, "Advanced referral counter");
        Ok(value)
    }

    #[instrument(skip(self))]
    async fn current_value(&self, counter_type: &str) -> RepoResult<Option<i64>> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        self.db
            .run(
                sqlx::query_scalar::<_, i64>(
                    "SELECT current_value FROM referral_counters WHERE counter_type = $1",
                )
                .bind(counter_type)
                .fetch_optional(pool),
            )
            .await
            .map_err(map_db_error)
    }
}
