//! Session model -> entity mappers

use stakehub_core::entities::{Session, SessionStats};

use crate::models::{SessionModel, SessionStatsRow};

impl From<SessionModel> for Session {
    fn from(model: SessionModel) -> Self {
        Session {
            id: model.id,
            user_id: model.user_id,
            token_hash: model.token_hash,
            refresh_token_hash: model.refresh_token_hash,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            is_active: model.is_active,
            created_at: model.created_at,
            last_used_at: model.last_used_at,
            expires_at: model.expires_at,
        }
    }
}

impl From<SessionStatsRow> for SessionStats {
    fn from(row: SessionStatsRow) -> Self {
        SessionStats {
            total_sessions: row.total_sessions.unwrap_or(0),
            active_sessions: row.active_sessions.unwrap_or(0),
            expired_sessions: row.expired_sessions.unwrap_or(0),
            unique_users: row.unique_users.unwrap_or(0),
        }
    }
}
