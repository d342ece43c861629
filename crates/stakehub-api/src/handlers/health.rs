//! Health check handlers
//!
//! Endpoints for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use stakehub_service::{HealthResponse, ReadinessResponse};

use crate::state::AppState;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// GET /health/ready
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let db_healthy = match state.service_context().db() {
        Some(db) => db
            .health_check()
            .await
            .map_err(|e| tracing::warn!(error = %e, "Database health check failed"))
            .is_ok(),
        None => true,
    };

    let status = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse::ready(db_healthy)))
}
