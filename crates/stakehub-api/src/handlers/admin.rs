//! Admin-only handlers: security reporting, audit trail and maintenance

use axum::{
    extract::{Path, Query, State},
    Json,
};
use stakehub_service::{
    AdminService, AuditLogListResponse, AuditLogQuery, AuditLogger, CleanupRequest,
    LoginSecurityService, LoginStatsResponse, MaintenanceResponse, RevokedResponse,
    SecurityReportResponse, SessionService, SessionStatsResponse, StatsQuery,
};

use crate::extractors::{AdminUser, ClientInfo, OptionalValidatedJson};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/admin/security/report
pub async fn security_report(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<SecurityReportResponse>> {
    let report = LoginSecurityService::new(state.service_context())
        .generate_security_report()
        .await?;
    Ok(Json(SecurityReportResponse {
        success: true,
        report,
    }))
}

/// GET /api/admin/security/stats?days=
pub async fn login_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<LoginStatsResponse>> {
    let days = query.days();
    let stats = LoginSecurityService::new(state.service_context())
        .get_login_stats(days)
        .await?;
    Ok(Json(LoginStatsResponse {
        success: true,
        days,
        stats,
    }))
}

/// GET /api/admin/sessions/stats
pub async fn session_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Json<SessionStatsResponse> {
    let stats = SessionService::new(state.service_context())
        .get_session_stats()
        .await;
    Json(SessionStatsResponse {
        success: true,
        stats,
    })
}

/// GET /api/admin/audit-logs
pub async fn audit_logs(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<AuditLogQuery>,
) -> ApiResult<Json<AuditLogListResponse>> {
    let filter = query.into_filter().map_err(ApiError::bad_request)?;
    let logs = AuditLogger::new(state.service_context())
        .get_audit_logs(&filter)
        .await?;
    Ok(Json(AuditLogListResponse {
        success: true,
        logs,
    }))
}

/// POST /api/admin/maintenance/cleanup
pub async fn maintenance_cleanup(
    State(state): State<AppState>,
    admin: AdminUser,
    ClientInfo(client): ClientInfo,
    OptionalValidatedJson(body): OptionalValidatedJson<CleanupRequest>,
) -> ApiResult<Json<MaintenanceResponse>> {
    let days_to_keep = body.unwrap_or_default().days_to_keep();
    let response = AdminService::new(state.service_context())
        .run_maintenance(days_to_keep, admin.user_id(), &client)
        .await?;
    Ok(Json(response))
}

/// POST /api/admin/users/{user_id}/sessions/revoke
pub async fn revoke_user_sessions(
    State(state): State<AppState>,
    admin: AdminUser,
    ClientInfo(client): ClientInfo,
    Path(user_id): Path<String>,
) -> Json<RevokedResponse> {
    let revoked = AdminService::new(state.service_context())
        .revoke_user_sessions(admin.user_id(), &user_id, &client)
        .await;
    Json(RevokedResponse {
        success: true,
        revoked,
    })
}
