//! PostgreSQL implementation of BotActivationRepository

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use stakehub_core::entities::{BotActivation, BotType};
use stakehub_core::traits::{BotActivationRepository, RepoResult};

use crate::models::BotActivationModel;
use crate::pool::ConnectionManager;

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgBotActivationRepository {
    db: Arc<ConnectionManager>,
}

impl PgBotActivationRepository {
    pub fn new(db: Arc<ConnectionManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BotActivationRepository for PgBotActivationRepository {
    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<BotActivation>> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        let models = self
            .db
            .run(
                sqlx::query_as::<_, BotActivationModel>(
                    r"
                    SELECT id, user_id, bot_type, is_active, activated_at, expires_at
                    FROM bot_activations
                    WHERE user_id = $1
                    ORDER BY activated_at DESC
                    ",
                )
                .bind(user_id)
                .fetch_all(pool),
            )
            .await
            .map_err(map_db_error)?;

        models.into_iter().map(BotActivation::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_active(
        &self,
        user_id: &str,
        bot_type: BotType,
    ) -> RepoResult<Option<BotActivation>> {
        let pool = self.db.pool().await.map_err(map_db_error)?;

        let model = self
            .db
            .run(
                sqlx::query_as::<_, BotActivationModel>(
                    r"
                    SELECT id, user_id, bot_type, is_active, activated_at, expires_at
                    FROM bot_activations
                    WHERE user_id = $1
                      AND bot_type = $2
                      AND is_active
                      AND (expires_at IS NULL OR expires_at > NOW())
                    ORDER BY activated_at DESC
                    LIMIT 1
                    ",
                )
                .bind(user_id)
                .bind(bot_type.as_str())
                .fetch_optional(pool),
            )
            .await
            .map_err(map_db_error)?;

        model.map(BotActivation::try_from).transpose()
    }
}
