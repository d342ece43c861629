//! Application state
//!
//! Holds the shared state for the Axum application including
//! the service context and configuration.

use std::sync::Arc;

use stakehub_common::{AppConfig, JwtService};
use stakehub_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(service_context: ServiceContext, config: AppConfig) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn jwt_service(&self) -> &JwtService {
        self.service_context.jwt_service()
    }

    /// Auth cookies carry `Secure` outside development
    pub fn secure_cookies(&self) -> bool {
        !self.config.app.env.is_development()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("env", &self.config.app.env)
            .finish()
    }
}
