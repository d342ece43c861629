//! Entity to DTO mappers

use stakehub_core::entities::{Session, User};

use super::responses::{AdminUserResponse, SessionResponse};

impl From<&User> for AdminUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            is_admin: user.is_admin,
            two_factor_enabled: user.two_factor_enabled,
            last_login_at: user.last_login_at,
        }
    }
}

impl SessionResponse {
    /// Map a session, marking it when it is the caller's own
    pub fn from_session(session: Session, current_session_id: Option<&str>) -> Self {
        let is_current = current_session_id == Some(session.id.as_str());
        Self {
            id: session.id,
            ip_address: session.ip_address,
            user_agent: session.user_agent,
            created_at: session.created_at,
            last_used_at: session.last_used_at,
            expires_at: session.expires_at,
            is_current,
        }
    }
}
