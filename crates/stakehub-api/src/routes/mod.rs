//! Route definitions

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::{admin, auth, bots, health, sessions};
use crate::state::AppState;

/// Create the main API router (health routes are mounted separately)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}

/// Health check routes, kept outside the rate limit
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(bot_routes())
        .merge(session_routes())
        .merge(admin_routes())
}

/// Login, logout, refresh and status
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(auth::admin_login))
        .route("/admin/logout", post(auth::admin_logout))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/status", get(auth::auth_status))
}

fn bot_routes() -> Router<AppState> {
    Router::new()
        .route("/bots/my-bots", get(bots::my_bots))
        .route("/bots/:bot_type/access", get(bots::bot_access))
}

/// The caller's own sessions
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(sessions::list_sessions))
        .route("/sessions/others", delete(sessions::revoke_other_sessions))
        .route("/sessions/:session_id", delete(sessions::revoke_session))
}

/// Admin-only reporting and maintenance
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/security/report", get(admin::security_report))
        .route("/admin/security/stats", get(admin::login_stats))
        .route("/admin/sessions/stats", get(admin::session_stats))
        .route("/admin/audit-logs", get(admin::audit_logs))
        .route("/admin/maintenance/cleanup", post(admin::maintenance_cleanup))
        .route(
            "/admin/users/:user_id/sessions/revoke",
            post(admin::revoke_user_sessions),
        )
}
