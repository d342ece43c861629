//! Bot activation model -> entity mapper

use stakehub_core::entities::{BotActivation, BotType};
use stakehub_core::error::DomainError;

use crate::models::BotActivationModel;

impl TryFrom<BotActivationModel> for BotActivation {
    type Error = DomainError;

    fn try_from(model: BotActivationModel) -> Result<Self, Self::Error> {
        Ok(BotActivation {
            id: model.id,
            user_id: model.user_id,
            bot_type: model.bot_type.parse::<BotType>()?,
            is_active: model.is_active,
            activated_at: model.activated_at,
            expires_at: model.expires_at,
        })
    }
}
