//! PostgreSQL implementation of AuditLogRepository

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use stakehub_core::entities::{AuditLog, AuditLogFilter, NewAuditLog};
use stakehub_core::traits::{AuditLogRepository, RepoResult};

use crate::models::AuditLogModel;
use crate::pool::ConnectionManager;
use crate::query::{self, Filter, FilterOp, SortDirection, SqlValue};

use super::error::map_db_error;

const AUDIT_LOG_TABLE: &str = "audit_logs";

const AUDIT_LOG_SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS audit_logs (
    id          BIGSERIAL PRIMARY KEY,
    user_id     TEXT,
    action      TEXT NOT NULL,
    details     JSONB NOT NULL DEFAULT '{}'::jsonb,
    ip_address  TEXT,
    user_agent  TEXT,
    severity    TEXT NOT NULL DEFAULT 'LOW',
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE INDEX IF NOT EXISTS idx_audit_logs_user_id ON audit_logs (user_id);
CREATE INDEX IF NOT EXISTS idx_audit_logs_action ON audit_logs (action);
CREATE INDEX IF NOT EXISTS idx_audit_logs_created_at ON audit_logs (created_at);
CREATE INDEX IF NOT EXISTS idx_audit_logs_severity ON audit_logs (severity);
";

#[derive(Clone)]
pub struct PgAuditLogRepository {
    db: Arc<ConnectionManager>,
}

impl PgAuditLogRepository {
    pub fn new(db: Arc<ConnectionManager>) -> Self {
        Self { db }
    }
}

/// Translate the read filter into query conditions
fn to_query_filter(filter: &AuditLogFilter) -> Filter {
    Filter::new()
        .and_some("user_id", filter.user_id.clone(), |v| FilterOp::Eq(v.into()))
        .and_some("action", filter.action.clone(), |v| FilterOp::Eq(v.into()))
        .and_some("severity", filter.severity, |v| FilterOp::Eq(v.as_str().into()))
        .and_some("created_at", filter.from, |v| FilterOp::Gte(v.into()))
        .and_some("created_at", filter.to, |v| FilterOp::Lte(v.into()))
}

#[async_trait]
impl AuditLogRepository for PgAuditLogRepository {
    #[instrument(skip(self, entry), fields(action = %entry.action))]
    async fn insert(&self, entry: &NewAuditLog) -> RepoResult<i64> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        let built = query::insert(
            AUDIT_LOG_TABLE,
            &[
                ("user_id", SqlValue::from(entry.user_id.clone())),
                ("action", SqlValue::from(entry.action.as_str())),
                ("details", SqlValue::Json(entry.details.clone())),
                ("ip_address", SqlValue::from(entry.ip_address.clone())),
                ("user_agent", SqlValue::from(entry.user_agent.clone())),
                ("severity", SqlValue::from(entry.severity.as_str())),
            ],
        )
        .map_err(map_db_error)?;

        let model = self
            .db
            .run(built.query_as::<AuditLogModel>().fetch_one(pool))
            .await
            .map_err(map_db_error)?;

        Ok(model.id)
    }

    #[instrument(skip(self))]
    async fn find(&self, filter: &AuditLogFilter) -> RepoResult<Vec<AuditLog>> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        let built = query::select(AUDIT_LOG_TABLE)
            .filter(to_query_filter(filter))
            .order_by("created_at", SortDirection::Desc)
            .limit(filter.effective_limit())
            .offset(filter.effective_offset())
            .build()
            .map_err(map_db_error)?;

        let models = self
            .db
            .run(built.query_as::<AuditLogModel>().fetch_all(pool))
            .await
            .map_err(map_db_error)?;

        Ok(models.into_iter().map(AuditLog::from).collect())
    }

    #[instrument(skip(self))]
    async fn ensure_schema(&self) -> RepoResult<()> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        self.db
            .run(sqlx::raw_sql(AUDIT_LOG_SCHEMA).execute(pool))
            .await
            .map_err(map_db_error)?;

        info!("Audit log table ready");
        Ok(())
    }
}
