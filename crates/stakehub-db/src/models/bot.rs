//! Bot activation database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct BotActivationModel {
    pub id: String,
    pub user_id: String,
    pub bot_type: String,
    pub is_active: bool,
    pub activated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}
