//! Admin authentication service
//!
//! Handles admin login, logout, and token refresh. The login flow:
//! admission -> blocking check -> user lookup -> password -> admin and
//! active checks -> second factor -> tokens and session -> bookkeeping.

use chrono::Utc;
use serde_json::json;
use tracing::{error, info, instrument, warn};

use stakehub_common::{hash_token, verify_totp, AppError, TokenPayload};
use stakehub_core::entities::{
    actions, LoginFailureReason, NewLoginAttempt, NewSession, User,
};
use stakehub_core::DomainError;

use crate::dto::{
    AdminLoginRequest, AdminLoginResponse, AdminUserResponse, ClientContext, TokenRefreshResponse,
};

use super::audit::AuditLogger;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::login_security::LoginSecurityService;
use super::session::SessionService;

const INVALID_CREDENTIALS: &str = "Invalid admin credentials";
const ADMIN_REQUIRED: &str = "Admin access required";
const ACCOUNT_INACTIVE: &str = "Account is inactive";
const INVALID_TWO_FACTOR: &str = "Invalid 2FA code";

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn security(&self) -> LoginSecurityService<'a> {
        LoginSecurityService::new(self.ctx)
    }

    fn sessions(&self) -> SessionService<'a> {
        SessionService::new(self.ctx)
    }

    fn audit(&self) -> AuditLogger<'a> {
        AuditLogger::new(self.ctx)
    }

    /// Record an attempt without letting a storage failure end the flow
    async fn record(&self, attempt: NewLoginAttempt) {
        if let Err(e) = self.security().record_attempt(&attempt).await {
            warn!(error = %e, "Failed to record login attempt");
        }
    }

    /// Record a failed attempt, audit it, and hand back the error to return
    async fn reject(
        &self,
        email: &str,
        client: &ClientContext,
        reason: LoginFailureReason,
        user_id: Option<&str>,
        err: ServiceError,
    ) -> ServiceError {
        self.record(NewLoginAttempt::failure(
            email,
            &client.ip_address,
            client.user_agent.as_deref(),
            reason,
        ))
        .await;

        let details = json!({ "email": email, "reason": reason.as_str() });
        match reason {
            LoginFailureReason::NotAdmin => {
                self.audit()
                    .log_security_event(actions::UNAUTHORIZED_ADMIN_ACCESS, user_id, details, Some(client))
                    .await;
            }
            LoginFailureReason::Invalid2fa => {
                self.audit()
                    .log_auth_event(actions::TWO_FACTOR_FAILED, user_id, details, Some(client))
                    .await;
            }
            LoginFailureReason::Blocked => {
                self.audit()
                    .log_security_event(actions::ACCOUNT_BLOCKED, user_id, details, Some(client))
                    .await;
            }
            _ => {
                self.audit()
                    .log_auth_event(actions::LOGIN_FAILED, user_id, details, Some(client))
                    .await;
            }
        }

        err
    }

    /// Admin login
    ///
    /// # Errors
    /// - `Validation` for missing fields (400)
    /// - `TooManyAttempts` while blocked (429)
    /// - `Unauthorized` for bad credentials or 2FA code (401)
    /// - `TwoFactorRequired` when the code is missing (401)
    /// - `Forbidden` for non-admin or inactive accounts (403)
    /// - `Domain(Overloaded)` when the admission queue is full (503)
    #[instrument(skip(self, request, client), fields(email = %request.normalized_email(), ip = %client.ip_address))]
    pub async fn admin_login(
        &self,
        request: AdminLoginRequest,
        client: &ClientContext,
    ) -> ServiceResult<AdminLoginResponse> {
        let email = request.normalized_email();
        if email.is_empty() || request.password.is_empty() {
            return Err(ServiceError::validation("Email and password are required"));
        }

        let _permit = self
            .ctx
            .admission()
            .admit()
            .await
            .map_err(DomainError::from)?;

        // 1. Brute-force protection
        let blocking = self.security().check_blocking(&email, &client.ip_address).await;
        if blocking.is_blocked {
            let err = ServiceError::TooManyAttempts {
                blocked_until: blocking.block_until,
                failed_attempts: blocking.failed_attempts,
            };
            return Err(self
                .reject(&email, client, LoginFailureReason::Blocked, None, err)
                .await);
        }

        // 2. Account lookup
        let Some(user) = self.ctx.user_repo().find_by_email(&email).await? else {
            warn!("Login failed: unknown email");
            let err = ServiceError::unauthorized(INVALID_CREDENTIALS);
            return Err(self
                .reject(&email, client, LoginFailureReason::UserNotFound, None, err)
                .await);
        };

        // 3. Password
        let password_hash = self.ctx.user_repo().get_password_hash(&user.id).await?;
        let password_ok = match password_hash {
            Some(hash) => self
                .ctx
                .password_service()
                .verify(&request.password, &hash)
                .await
                .unwrap_or_else(|e| {
                    error!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
                    false
                }),
            None => false,
        };
        if !password_ok {
            warn!(user_id = %user.id, "Login failed: invalid password");
            let err = ServiceError::unauthorized(INVALID_CREDENTIALS);
            return Err(self
                .reject(&email, client, LoginFailureReason::InvalidPassword, Some(&user.id), err)
                .await);
        }

        // 4. Role and status
        if !user.is_admin {
            warn!(user_id = %user.id, "Login failed: not an admin");
            let err = ServiceError::forbidden(ADMIN_REQUIRED);
            return Err(self
                .reject(&email, client, LoginFailureReason::NotAdmin, Some(&user.id), err)
                .await);
        }
        if !user.is_active {
            warn!(user_id = %user.id, "Login failed: inactive account");
            let err = ServiceError::forbidden(ACCOUNT_INACTIVE);
            return Err(self
                .reject(&email, client, LoginFailureReason::AccountInactive, Some(&user.id), err)
                .await);
        }

        // 5. Second factor
        if user.requires_two_factor() {
            let Some(code) = request.two_factor_code() else {
                info!(user_id = %user.id, "2FA code required");
                return Err(ServiceError::TwoFactorRequired);
            };

            if !self.check_two_factor(&user, code) {
                warn!(user_id = %user.id, "Login failed: invalid 2FA code");
                let err = ServiceError::unauthorized(INVALID_TWO_FACTOR);
                return Err(self
                    .reject(&email, client, LoginFailureReason::Invalid2fa, Some(&user.id), err)
                    .await);
            }
        }

        // 6. Tokens and session
        let session_id = SessionService::generate_session_id();
        let payload = TokenPayload {
            user_id: user.id.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            session_id: Some(session_id.clone()),
        };
        let tokens = self.ctx.jwt_service().generate_token_pair(&payload)?;
        let expires_at = Utc::now() + self.ctx.jwt_service().refresh_ttl();

        let record = self
            .sessions()
            .create_session(NewSession {
                session_id,
                user_id: user.id.clone(),
                token_hash: hash_token(&tokens.access_token),
                refresh_token_hash: Some(hash_token(&tokens.refresh_token)),
                ip_address: Some(client.ip_address.clone()),
                user_agent: client.user_agent.clone(),
                expires_at,
            })
            .await;

        // 7. Bookkeeping, best effort
        self.record(NewLoginAttempt::success(
            &email,
            &client.ip_address,
            client.user_agent.as_deref(),
        ))
        .await;

        let now = Utc::now();
        if let Err(e) = self.ctx.user_repo().touch_last_login(&user.id, now).await {
            warn!(user_id = %user.id, error = %e, "Failed to update last login time");
        }

        let session = record.session();
        self.audit()
            .log_auth_event(
                actions::LOGIN_SUCCESS,
                Some(&user.id),
                json!({
                    "email": email,
                    "sessionId": session.id,
                    "persistedSession": record.is_persisted(),
                }),
                Some(client),
            )
            .await;

        info!(user_id = %user.id, session_id = %session.id, "Admin logged in");

        let mut user_response = AdminUserResponse::from(&user);
        user_response.last_login_at = Some(now);

        Ok(AdminLoginResponse {
            success: true,
            user: user_response,
            token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            session_id: session.id.clone(),
            expires_at: session.expires_at,
        })
    }

    fn check_two_factor(&self, user: &User, code: &str) -> bool {
        let Some(secret) = user.two_factor_secret.as_deref() else {
            error!(user_id = %user.id, "2FA enabled without a stored secret");
            return false;
        };

        verify_totp(secret, code).unwrap_or_else(|e| {
            error!(user_id = %user.id, error = %e, "Stored 2FA secret is unusable");
            false
        })
    }

    /// End the caller's session
    #[instrument(skip(self, client))]
    pub async fn logout(&self, user_id: &str, session_id: &str, client: &ClientContext) -> bool {
        let revoked = self.sessions().revoke_session(session_id).await;

        self.audit()
            .log_auth_event(
                actions::LOGOUT,
                Some(user_id),
                json!({ "sessionId": session_id, "revoked": revoked }),
                Some(client),
            )
            .await;

        revoked
    }

    /// Rotate tokens from a refresh token. The old session is revoked and
    /// a new one is created for the new pair.
    ///
    /// # Errors
    /// - `Unauthorized` for a missing, invalid or revoked refresh token (401)
    /// - `Forbidden` when the account was deactivated (403)
    #[instrument(skip(self, refresh_token, client))]
    pub async fn refresh(
        &self,
        refresh_token: Option<&str>,
        client: &ClientContext,
    ) -> ServiceResult<TokenRefreshResponse> {
        let token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::unauthorized("Refresh token required"))?;
        let claims = self
            .ctx
            .jwt_service()
            .decode_refresh_token(token)
            .map_err(|e| match e {
                AppError::Config(_) => ServiceError::App(e),
                _ => ServiceError::unauthorized("Invalid refresh token"),
            })?;

        let user_id = claims
            .user_id()
            .ok_or_else(|| ServiceError::unauthorized("Invalid refresh token"))?
            .to_string();

        match self.ctx.user_repo().is_active(&user_id).await? {
            Some(true) => {}
            Some(false) => return Err(ServiceError::forbidden("User account is inactive")),
            None => return Err(ServiceError::unauthorized("Invalid refresh token")),
        }

        if let Some(old_session) = claims.session_id.as_deref() {
            let still_active = self
                .sessions()
                .get_user_sessions(&user_id)
                .await
                .iter()
                .any(|s| s.id == old_session);
            if !still_active {
                warn!(%user_id, session_id = old_session, "Refresh for a revoked session");
                return Err(ServiceError::unauthorized("Session expired or revoked"));
            }
            self.sessions().revoke_session(old_session).await;
        }

        let session_id = SessionService::generate_session_id();
        let mut payload = claims.payload();
        payload.session_id = Some(session_id.clone());
        let tokens = self.ctx.jwt_service().generate_token_pair(&payload)?;

        let record = self
            .sessions()
            .create_session(NewSession {
                session_id,
                user_id: user_id.clone(),
                token_hash: hash_token(&tokens.access_token),
                refresh_token_hash: Some(hash_token(&tokens.refresh_token)),
                ip_address: Some(client.ip_address.clone()),
                user_agent: client.user_agent.clone(),
                expires_at: Utc::now() + self.ctx.jwt_service().refresh_ttl(),
            })
            .await;

        self.audit()
            .log_auth_event(
                actions::TOKEN_REFRESHED,
                Some(&user_id),
                json!({ "sessionId": record.session().id }),
                Some(client),
            )
            .await;

        Ok(TokenRefreshResponse {
            success: true,
            token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
        })
    }
}
