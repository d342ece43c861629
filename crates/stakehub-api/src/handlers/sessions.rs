//! Handlers for the caller's own sessions

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;
use stakehub_core::entities::actions;
use stakehub_service::{
    AuditLogger, MessageResponse, RevokedResponse, SessionListResponse, SessionResponse,
    SessionService,
};

use crate::extractors::{ClientInfo, SessionUser};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    user: SessionUser,
) -> Json<SessionListResponse> {
    let sessions = SessionService::new(state.service_context())
        .get_user_sessions(user.user_id())
        .await
        .into_iter()
        .map(|s| SessionResponse::from_session(s, Some(user.session_id())))
        .collect();

    Json(SessionListResponse {
        success: true,
        sessions,
    })
}

/// DELETE /api/sessions/{session_id}
pub async fn revoke_session(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    user: SessionUser,
    Path(session_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let ctx = state.service_context();
    let sessions = SessionService::new(ctx);

    let owned = sessions
        .get_user_sessions(user.user_id())
        .await
        .iter()
        .any(|s| s.id == session_id);
    if !owned {
        return Err(ApiError::not_found("Session not found"));
    }

    sessions.revoke_session(&session_id).await;

    AuditLogger::new(ctx)
        .log_auth_event(
            actions::SESSION_REVOKED,
            Some(user.user_id()),
            json!({ "sessionId": session_id }),
            Some(&client),
        )
        .await;

    Ok(Json(MessageResponse::ok("Session revoked")))
}

/// DELETE /api/sessions/others
pub async fn revoke_other_sessions(
    State(state): State<AppState>,
    user: SessionUser,
) -> Json<RevokedResponse> {
    let revoked = SessionService::new(state.service_context())
        .revoke_other_sessions(user.user_id(), user.session_id())
        .await;

    Json(RevokedResponse {
        success: true,
        revoked,
    })
}
