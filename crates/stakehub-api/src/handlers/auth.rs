//! Authentication handlers
//!
//! Admin login and logout, token refresh, and the auth status check. Tokens
//! travel both in the JSON body and as httpOnly cookies.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use stakehub_service::{
    AdminLoginRequest, AdminLoginResponse, AuthService, AuthStatusResponse, MessageResponse,
    RefreshTokenRequest, TokenRefreshResponse,
};

use crate::extractors::{
    ClientInfo, SessionUser, ValidatedJson, VerifyAuth, REFRESH_COOKIE, TOKEN_COOKIE,
};
use crate::response::ApiResult;
use crate::state::AppState;

fn auth_cookie(
    name: &'static str,
    value: String,
    max_age: chrono::Duration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age.num_seconds()))
        .build()
}

fn with_auth_cookies(jar: CookieJar, state: &AppState, token: &str, refresh_token: &str) -> CookieJar {
    let jwt = state.jwt_service();
    let secure = state.secure_cookies();

    jar.add(auth_cookie(TOKEN_COOKIE, token.to_string(), jwt.access_ttl(), secure))
        .add(auth_cookie(
            REFRESH_COOKIE,
            refresh_token.to_string(),
            jwt.refresh_ttl(),
            secure,
        ))
}

fn without_auth_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_COOKIE).path("/"))
}

/// POST /api/admin/login
pub async fn admin_login(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<AdminLoginRequest>,
) -> ApiResult<(CookieJar, Json<AdminLoginResponse>)> {
    let response = AuthService::new(state.service_context())
        .admin_login(request, &client)
        .await?;

    let jar = with_auth_cookies(jar, &state, &response.token, &response.refresh_token);
    Ok((jar, Json(response)))
}

/// POST /api/admin/logout
pub async fn admin_logout(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    jar: CookieJar,
    user: SessionUser,
) -> (CookieJar, Json<MessageResponse>) {
    AuthService::new(state.service_context())
        .logout(user.user_id(), user.session_id(), &client)
        .await;

    (without_auth_cookies(jar), Json(MessageResponse::ok("Logged out")))
}

/// POST /api/auth/refresh
///
/// The `refreshToken` cookie takes precedence over the body.
pub async fn refresh_token(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    jar: CookieJar,
    body: Option<Json<RefreshTokenRequest>>,
) -> ApiResult<(CookieJar, Json<TokenRefreshResponse>)> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| body.and_then(|Json(b)| b.refresh_token));

    let response = AuthService::new(state.service_context())
        .refresh(token.as_deref(), &client)
        .await?;

    let jar = with_auth_cookies(jar, &state, &response.token, &response.refresh_token);
    Ok((jar, Json(response)))
}

/// GET /api/auth/status
pub async fn auth_status(VerifyAuth(status): VerifyAuth) -> Json<AuthStatusResponse> {
    Json(status)
}
