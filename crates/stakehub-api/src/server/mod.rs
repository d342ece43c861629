//! Server setup and initialization
//!
//! Provides the application builder and server runner.

use std::sync::Arc;

use axum::Router;
use stakehub_common::{AppConfig, AppError, JwtService};
use stakehub_db::{
    ConnectionManager, PgAuditLogRepository, PgBotActivationRepository,
    PgLoginAttemptRepository, PgReferralCounterRepository, PgSessionRepository,
    PgUserRepository, PoolSettings,
};
use stakehub_service::{AuditLogger, ServiceContextBuilder};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
///
/// # Errors
/// `AppError::Config` for an unusable rate-limit configuration
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();

    let api = apply_middleware_with_config(create_router(), &config.rate_limit, &config.cors)?;
    let health = apply_middleware(health_routes(), &config.cors);

    Ok(api.merge(health).with_state(state))
}

/// Initialize all dependencies and create AppState
///
/// # Errors
/// Configuration or JWT setup failures
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let settings = PoolSettings::from_config(&config.database, config.app.is_build_phase());
    let db = ConnectionManager::init_global(settings);
    db.warmup().await;

    let jwt_service = Arc::new(JwtService::from_config(&config.jwt)?);

    let service_context = ServiceContextBuilder::new()
        .db(db.clone())
        .user_repo(Arc::new(PgUserRepository::new(db.clone())))
        .login_attempt_repo(Arc::new(PgLoginAttemptRepository::new(db.clone())))
        .session_repo(Arc::new(PgSessionRepository::new(db.clone())))
        .audit_log_repo(Arc::new(PgAuditLogRepository::new(db.clone())))
        .bot_repo(Arc::new(PgBotActivationRepository::new(db.clone())))
        .referral_repo(Arc::new(PgReferralCounterRepository::new(db)))
        .jwt_service(jwt_service)
        .security_config(&config.security)
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    if !config.app.is_build_phase() {
        if let Err(e) = AuditLogger::new(&service_context)
            .initialize_audit_logs_table()
            .await
        {
            warn!(error = %e, "Audit log table could not be prepared");
        }
    }

    Ok(AppState::new(service_context, config))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the HTTP server until Ctrl-C
///
/// # Errors
/// Bind or serve failures
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the complete server with configuration
///
/// # Errors
/// Startup and serve failures
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();

    let state = create_app_state(config).await?;
    let app = create_app(state)?;

    run_server(app, &addr).await?;

    if let Some(db) = ConnectionManager::global() {
        db.close().await;
    }
    Ok(())
}
