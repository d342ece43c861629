//! PostgreSQL implementation of UserRepository

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::instrument;

use stakehub_core::entities::User;
use stakehub_core::traits::{RepoResult, UserRepository};

use crate::models::{UserModel, USER_COLUMNS};
use crate::pool::ConnectionManager;

use super::error::map_db_error;

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    db: Arc<ConnectionManager>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(db: Arc<ConnectionManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let pool = self.db.pool().await.map_err(map_db_error)?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let result = self
            .db
            .run(sqlx::query_as::<_, UserModel>(&sql).bind(id).fetch_optional(pool))
            .await
            .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let pool = self.db.pool().await.map_err(map_db_error)?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");

        let result = self
            .db
            .run(sqlx::query_as::<_, UserModel>(&sql).bind(email).fetch_optional(pool))
            .await
            .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self))]
    async fn get_password_hash(&self, id: &str) -> RepoResult<Option<String>> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        self.db
            .run(
                sqlx::query_scalar::<_, String>("SELECT password FROM users WHERE id = $1")
                    .bind(id)
                    .fetch_optional(pool),
            )
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn is_active(&self, id: &str) -> RepoResult<Option<bool>> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        self.db
            .run(
                sqlx::query_scalar::<_, bool>("SELECT is_active FROM users WHERE id = $1")
                    .bind(id)
                    .fetch_optional(pool),
            )
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn referral_code_exists(&self, code: &str) -> RepoResult<bool> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        self.db
            .run(
                sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM users WHERE referral_code = $1)",
                )
                .bind(code)
                .fetch_one(pool),
            )
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> RepoResult<()> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        self.db
            .run(
                sqlx::query("UPDATE users SET last_login_at = $2, updated_at = $2 WHERE id = $1")
                    .bind(id)
                    .bind(at)
                    .execute(pool),
            )
            .await
            .map_err(map_db_error)?;

        Ok(())
    }
}
