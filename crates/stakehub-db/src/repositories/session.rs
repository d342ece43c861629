//! PostgreSQL implementation of SessionRepository

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use stakehub_core::entities::{NewSession, Session, SessionStats};
use stakehub_core::traits::{RepoResult, SessionRepository};

use crate::models::{SessionModel, SessionStatsRow};
use crate::pool::ConnectionManager;

use super::error::map_db_error;

const SESSION_COLUMNS: &str = "id, user_id, token_hash, refresh_token_hash, ip_address, \
    user_agent, is_active, created_at, last_used_at, expires_at";

#[derive(Clone)]
pub struct PgSessionRepository {
    db: Arc<ConnectionManager>,
}

impl PgSessionRepository {
    pub fn new(db: Arc<ConnectionManager>) -> Self {
        Self { db }
    }

    async fn count_call(&self, sql: &str, bind: &[&str]) -> RepoResult<u64> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        let mut query = sqlx::query_scalar::<_, i64>(sql);
        for value in bind {
            query = query.bind(*value);
        }

        let affected = self
            .db
            .run(query.fetch_one(pool))
            .await
            .map_err(map_db_error)?;

        Ok(u64::try_from(affected).unwrap_or(0))
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    async fn create(&self, session: &NewSession) -> RepoResult<Session> {
        let pool = self.db.pool().await.map_err(map_db_error)?;
        let sql =
            format!("SELECT {SESSION_COLUMNS} FROM create_session($1, $2, $3, $4, $5, $6, $7)");

        let model = self
            .db
            .run(
                sqlx::query_as::<_, SessionModel>(&sql)
                    .bind(&session.session_id)
                    .bind(&session.user_id)
                    .bind(&session.token_hash)
                    .bind(session.refresh_token_hash.as_deref())
                    .bind(session.ip_address.as_deref())
                    .bind(session.user_agent.as_deref())
                    .bind(session.expires_at)
                    .fetch_one(pool),
            )
            .await
            .map_err(map_db_error)?;

        Ok(Session::from(model))
    }

    #[instrument(skip(self, token_hash))]
    async fn validate(&self, token_hash: &str) -> RepoResult<Option<Session>> {
        let pool = self.db.pool().await.map_err(map_db_error)?;
        let sql = format!("SELECT {SESSION_COLUMNS} FROM validate_session($1)");

        let model = self
            .db
            .run(
                sqlx::query_as::<_, SessionModel>(&sql)
                    .bind(token_hash)
                    .fetch_optional(pool),
            )
            .await
            .map_err(map_db_error)?;

        Ok(model.map(Session::from))
    }

    #[instrument(skip(self))]
    async fn revoke(&self, session_id: &str) -> RepoResult<bool> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        self.db
            .run(
                sqlx::query_scalar::<_, bool>("SELECT revoke_session($1)")
                    .bind(session_id)
                    .fetch_one(pool),
            )
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn revoke_all_for_user(&self, user_id: &str) -> RepoResult<u64> {
        self.count_call("SELECT revoke_all_user_sessions($1)", &[user_id])
            .await
    }

    #[instrument(skip(self))]
    async fn revoke_others(&self, user_id: &str, except_session_id: &str) -> RepoResult<u64> {
        self.count_call(
            "SELECT revoke_other_sessions($1, $2)",
            &[user_id, except_session_id],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Session>> {
        let pool = self.db.pool().await.map_err(map_db_error)?;
        let sql = format!("SELECT {SESSION_COLUMNS} FROM get_user_sessions($1)");

        let models = self
            .db
            .run(
                sqlx::query_as::<_, SessionModel>(&sql)
                    .bind(user_id)
                    .fetch_all(pool),
            )
            .await
            .map_err(map_db_error)?;

        Ok(models.into_iter().map(Session::from).collect())
    }

    #[instrument(skip(self))]
    async fn cleanup_expired(&self) -> RepoResult<u64> {
        self.count_call("SELECT cleanup_expired_sessions()", &[]).await
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> RepoResult<SessionStats> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        let row = self
            .db
            .run(
                sqlx::query_as::<_, SessionStatsRow>(
                    "SELECT total_sessions, active_sessions, expired_sessions, unique_users \
                     FROM get_session_stats()",
                )
                .fetch_optional(pool),
            )
            .await
            .map_err(map_db_error)?;

        Ok(row.map(SessionStats::from).unwrap_or_default())
    }
}
