//! Trading bot handlers

use axum::{
    extract::{Path, State},
    Json,
};
use stakehub_core::entities::BotType;
use stakehub_service::{BotAccessResponse, BotService, MyBotsResponse};

use crate::extractors::SessionUser;
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/bots/my-bots
pub async fn my_bots(
    State(state): State<AppState>,
    user: SessionUser,
) -> ApiResult<Json<MyBotsResponse>> {
    let response = BotService::new(state.service_context())
        .my_bots(user.user_id())
        .await?;
    Ok(Json(response))
}

/// GET /api/bots/{bot_type}/access
pub async fn bot_access(
    State(state): State<AppState>,
    user: SessionUser,
    Path(bot_type): Path<String>,
) -> ApiResult<Json<BotAccessResponse>> {
    let bot_type: BotType = bot_type
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Unknown bot type: {bot_type}")))?;

    let activation = BotService::new(state.service_context())
        .require_activation(user.user_id(), bot_type)
        .await?;

    Ok(Json(BotAccessResponse {
        success: true,
        activation,
    }))
}
