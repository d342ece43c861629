//! Trading bot eligibility

use chrono::Utc;
use tracing::{error, instrument};

use stakehub_core::entities::{BotActivation, BotType};

use crate::dto::{BotEligibility, MyBotsResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct BotService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> BotService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// All activations of a user with the per-tier eligibility flags
    #[instrument(skip(self))]
    pub async fn my_bots(&self, user_id: &str) -> ServiceResult<MyBotsResponse> {
        let bots = self.ctx.bot_repo().find_by_user(user_id).await?;

        let now = Utc::now();
        let mut eligibility = BotEligibility::default();
        for bot in bots.iter().filter(|b| b.is_current(now)) {
            eligibility.set(bot.bot_type);
        }

        Ok(MyBotsResponse {
            success: true,
            bots,
            eligibility,
        })
    }

    /// The user's current activation of `bot_type`
    ///
    /// # Errors
    /// - `Forbidden` when there is no active, unexpired activation (403)
    /// - `Internal` when the lookup fails (500)
    #[instrument(skip(self))]
    pub async fn require_activation(
        &self,
        user_id: &str,
        bot_type: BotType,
    ) -> ServiceResult<BotActivation> {
        match self.ctx.bot_repo().find_active(user_id, bot_type).await {
            Ok(Some(activation)) => Ok(activation),
            Ok(None) => Err(ServiceError::forbidden(format!(
                "{bot_type} bot activation required"
            ))),
            Err(e) => {
                error!(error = %e, "Bot activation lookup failed");
                Err(ServiceError::internal("Failed to verify bot activation"))
            }
        }
    }
}
