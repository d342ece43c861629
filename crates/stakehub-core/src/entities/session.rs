//! Session entity

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Id prefix marking a session that exists only in memory
pub const EPHEMERAL_SESSION_PREFIX: &str = "fallback_";

/// A login session. Only hashes of the bearer tokens are ever stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user_id: String,
    #[serde(skip_serializing)]
    pub token_hash: String,
    #[serde(skip_serializing)]
    pub refresh_token_hash: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    #[inline]
    pub fn is_ephemeral(&self) -> bool {
        self.id.starts_with(EPHEMERAL_SESSION_PREFIX)
    }
}

/// Input for session creation
#[derive(Debug, Clone)]
pub struct NewSession {
    pub session_id: String,
    pub user_id: String,
    pub token_hash: String,
    pub refresh_token_hash: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl NewSession {
    /// Build the in-memory stand-in used when the store is unavailable
    pub fn into_ephemeral(self, now: DateTime<Utc>) -> Session {
        Session {
            id: format!("{EPHEMERAL_SESSION_PREFIX}{}", self.session_id),
            user_id: self.user_id,
            token_hash: self.token_hash,
            refresh_token_hash: self.refresh_token_hash,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            is_active: true,
            created_at: now,
            last_used_at: now,
            expires_at: self.expires_at,
        }
    }
}

/// Outcome of session creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRecord {
    /// Stored in the database
    Persisted(Session),
    /// Created in memory after the store failed
    Ephemeral(Session),
}

impl SessionRecord {
    pub fn session(&self) -> &Session {
        match self {
            Self::Persisted(s) | Self::Ephemeral(s) => s,
        }
    }

    pub fn into_session(self) -> Session {
        match self {
            Self::Persisted(s) | Self::Ephemeral(s) => s,
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_sessions: i64,
    pub active_sessions: i64,
    pub expired_sessions: i64,
    pub unique_users: i64,
}
