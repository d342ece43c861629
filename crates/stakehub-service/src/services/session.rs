//! Session management service
//!
//! Sessions are looked up by the SHA-256 hash of their access token. Each
//! operation applies its own failure policy: creation falls back to an
//! in-memory session, validation fails closed, and the bookkeeping
//! operations (revoke, list, cleanup, stats) fail soft.

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use stakehub_common::{generate_session_id, hash_token};
use stakehub_core::entities::{NewSession, Session, SessionRecord, SessionStats};

use super::context::ServiceContext;

/// How a presented token identifies its session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionKey {
    /// The token is a valid JWT naming its session
    Signed {
        session_id: String,
        token_hash: String,
    },
    /// Only the token hash is known
    Raw(String),
}

impl SessionKey {
    pub fn token_hash(&self) -> &str {
        match self {
            Self::Signed { token_hash, .. } | Self::Raw(token_hash) => token_hash,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            Self::Signed { session_id, .. } => Some(session_id),
            Self::Raw(_) => None,
        }
    }
}

/// Outcome of validating the session behind a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSession {
    pub is_valid: bool,
    pub session: Option<Session>,
    pub user_id: Option<String>,
}

impl RequestSession {
    fn invalid() -> Self {
        Self::default()
    }

    fn valid(session: Session) -> Self {
        Self {
            is_valid: true,
            user_id: Some(session.user_id.clone()),
            session: Some(session),
        }
    }
}

/// Session management service
pub struct SessionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SessionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// New random session identifier
    pub fn generate_session_id() -> String {
        generate_session_id()
    }

    /// Persist a session. Never fails: if the store is unavailable an
    /// ephemeral session is returned so the login can still complete.
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn create_session(&self, session: NewSession) -> SessionRecord {
        match self.ctx.session_repo().create(&session).await {
            Ok(stored) => {
                debug!(session_id = %stored.id, "Session created");
                SessionRecord::Persisted(stored)
            }
            Err(e) => {
                error!(error = %e, "Session creation failed, using ephemeral session");
                SessionRecord::Ephemeral(session.into_ephemeral(Utc::now()))
            }
        }
    }

    /// Active, unexpired session for a token hash. Any failure yields `None`.
    #[instrument(skip(self, token_hash))]
    pub async fn validate_session(&self, token_hash: &str) -> Option<Session> {
        match self.ctx.session_repo().validate(token_hash).await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Session validation failed, rejecting");
                None
            }
        }
    }

    /// Deactivate one session; `false` if nothing changed or on error
    #[instrument(skip(self))]
    pub async fn revoke_session(&self, session_id: &str) -> bool {
        match self.ctx.session_repo().revoke(session_id).await {
            Ok(revoked) => {
                if revoked {
                    info!("Session revoked");
                }
                revoked
            }
            Err(e) => {
                error!(error = %e, "Failed to revoke session");
                false
            }
        }
    }

    /// Deactivate every session of a user; `0` on error
    #[instrument(skip(self))]
    pub async fn revoke_all_user_sessions(&self, user_id: &str) -> u64 {
        self.ctx
            .session_repo()
            .revoke_all_for_user(user_id)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "Failed to revoke user sessions");
                0
            })
    }

    /// Deactivate every session of a user except `except_session_id`; `0` on error
    #[instrument(skip(self))]
    pub async fn revoke_other_sessions(&self, user_id: &str, except_session_id: &str) -> u64 {
        self.ctx
            .session_repo()
            .revoke_others(user_id, except_session_id)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "Failed to revoke other sessions");
                0
            })
    }

    /// Active sessions of a user, most recently used first; empty on error
    #[instrument(skip(self))]
    pub async fn get_user_sessions(&self, user_id: &str) -> Vec<Session> {
        self.ctx
            .session_repo()
            .find_by_user(user_id)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "Failed to list user sessions");
                Vec::new()
            })
    }

    /// Deactivate sessions past their expiry; rows are kept. `0` on error
    #[instrument(skip(self))]
    pub async fn cleanup_expired_sessions(&self) -> u64 {
        match self.ctx.session_repo().cleanup_expired().await {
            Ok(deactivated) => {
                info!(deactivated, "Expired sessions deactivated");
                deactivated
            }
            Err(e) => {
                error!(error = %e, "Session cleanup failed");
                0
            }
        }
    }

    /// Aggregate counts; zeroed on error
    #[instrument(skip(self))]
    pub async fn get_session_stats(&self) -> SessionStats {
        self.ctx.session_repo().stats().await.unwrap_or_else(|e| {
            error!(error = %e, "Failed to read session stats");
            SessionStats::default()
        })
    }

    /// Work out which session a bearer token belongs to
    pub fn extract_session_id(&self, token: &str) -> SessionKey {
        let token_hash = hash_token(token);

        match self
            .ctx
            .jwt_service()
            .verify_token(token)
            .and_then(|claims| claims.session_id)
        {
            Some(session_id) => SessionKey::Signed {
                session_id,
                token_hash,
            },
            None => SessionKey::Raw(token_hash),
        }
    }

    /// Validate the session behind a request. The `token` cookie wins over
    /// the `Authorization: Bearer` header.
    #[instrument(skip_all)]
    pub async fn validate_request_session(
        &self,
        auth_header: Option<&str>,
        cookie_token: Option<&str>,
    ) -> RequestSession {
        let token = cookie_token
            .filter(|t| !t.is_empty())
            .or_else(|| auth_header.and_then(|h| h.strip_prefix("Bearer ")))
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let Some(token) = token else {
            return RequestSession::invalid();
        };

        let key = self.extract_session_id(token);
        let Some(session) = self.validate_session(key.token_hash()).await else {
            return RequestSession::invalid();
        };

        if let Some(expected) = key.session_id() {
            if expected != session.id {
                warn!(session_id = %session.id, "Token names a different session");
                return RequestSession::invalid();
            }
        }

        RequestSession::valid(session)
    }
}
