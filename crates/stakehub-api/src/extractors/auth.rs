//! Authentication extractors
//!
//! `AuthUser` checks the access token, `SessionUser` additionally requires a
//! live session and an active account, and `AdminUser` requires the admin
//! role on top of that. The `token` cookie wins over `Authorization: Bearer`.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use stakehub_common::{AppError, Claims};
use stakehub_core::entities::{Session, User};
use stakehub_service::{AuthStatusResponse, SessionService};

use crate::response::ApiError;
use crate::state::AppState;

/// Cookie holding the access token
pub const TOKEN_COOKIE: &str = "token";
/// Cookie holding the refresh token
pub const REFRESH_COOKIE: &str = "refreshToken";

fn cookie_token(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Caller holding a valid access token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub claims: Claims,
}

impl AuthUser {
    /// Session the token was issued for, if any
    pub fn session_id(&self) -> Option<&str> {
        self.claims.session_id.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = match cookie_token(parts) {
            Some(token) => token,
            None => TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())
                .map_err(|_| ApiError::unauthorized("Access token required"))?,
        };

        let app_state = AppState::from_ref(state);
        let claims = app_state.jwt_service().decode_token(&token).map_err(|e| match e {
            AppError::Config(_) => ApiError::App(e),
            e => {
                tracing::debug!(error = %e, "Access token rejected");
                ApiError::forbidden("Invalid or expired token")
            }
        })?;

        let user_id = claims
            .user_id()
            .ok_or_else(|| ApiError::forbidden("Invalid token payload"))?
            .to_string();

        Ok(Self { user_id, claims })
    }
}

/// Caller with a valid token, a live session and an active account
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user: User,
    pub session: Session,
    pub claims: Claims,
}

impl SessionUser {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn session_id(&self) -> &str {
        &self.session.id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let app_state = AppState::from_ref(state);
        let ctx = app_state.service_context();

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let cookie = cookie_token(parts);

        let request_session = SessionService::new(ctx)
            .validate_request_session(header, cookie.as_deref())
            .await;
        let session = match request_session.session {
            Some(session) if request_session.is_valid && session.user_id == auth.user_id => session,
            _ => return Err(ApiError::unauthorized("Session expired or revoked")),
        };

        let user = ctx
            .user_repo()
            .find_by_id(&auth.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| ApiError::forbidden("User account is inactive"))?;

        Ok(Self {
            user,
            session,
            claims: auth.claims,
        })
    }
}

/// Session user with the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub SessionUser);

impl AdminUser {
    pub fn user_id(&self) -> &str {
        self.0.user_id()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = SessionUser::from_request_parts(parts, state).await?;
        if !user.user.is_admin {
            tracing::warn!(user_id = %user.user_id(), "Admin route refused");
            return Err(ApiError::forbidden("Admin access required"));
        }
        Ok(Self(user))
    }
}

/// Token check that never rejects
#[derive(Debug, Clone)]
pub struct VerifyAuth(pub AuthStatusResponse);

#[async_trait]
impl<S> FromRequestParts<S> for VerifyAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user_id = AuthUser::from_request_parts(parts, state)
            .await
            .ok()
            .map(|auth| auth.user_id);

        Ok(Self(AuthStatusResponse {
            success: user_id.is_some(),
            user_id,
        }))
    }
}
