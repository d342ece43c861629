//! Service context - dependency container for services
//!
//! Holds all repositories, credential services and the admission gate.

use std::sync::Arc;

use stakehub_common::{JwtService, PasswordService, SecurityConfig};
use stakehub_core::entities::BlockingPolicy;
use stakehub_core::traits::{
    AuditLogRepository, BotActivationRepository, LoginAttemptRepository,
    ReferralCounterRepository, SessionRepository, UserRepository,
};
use stakehub_db::{AdmissionGate, ConnectionManager};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Cheap to clone: every member is reference counted.
#[derive(Clone)]
pub struct ServiceContext {
    // Database (absent when repositories are not Postgres-backed)
    db: Option<Arc<ConnectionManager>>,

    // Repositories
    user_repo: Arc<dyn UserRepository>,
    login_attempt_repo: Arc<dyn LoginAttemptRepository>,
    session_repo: Arc<dyn SessionRepository>,
    audit_log_repo: Arc<dyn AuditLogRepository>,
    bot_repo: Arc<dyn BotActivationRepository>,
    referral_repo: Arc<dyn ReferralCounterRepository>,

    // Credentials
    jwt_service: Arc<JwtService>,
    password_service: PasswordService,

    // Policies
    admission: AdmissionGate,
    blocking_policy: BlockingPolicy,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Database ===

    /// Connection manager, if the context is database-backed
    pub fn db(&self) -> Option<&ConnectionManager> {
        self.db.as_deref()
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn login_attempt_repo(&self) -> &dyn LoginAttemptRepository {
        self.login_attempt_repo.as_ref()
    }

    pub fn session_repo(&self) -> &dyn SessionRepository {
        self.session_repo.as_ref()
    }

    pub fn audit_log_repo(&self) -> &dyn AuditLogRepository {
        self.audit_log_repo.as_ref()
    }

    pub fn bot_repo(&self) -> &dyn BotActivationRepository {
        self.bot_repo.as_ref()
    }

    pub fn referral_repo(&self) -> &dyn ReferralCounterRepository {
        self.referral_repo.as_ref()
    }

    // === Credentials ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn password_service(&self) -> &PasswordService {
        &self.password_service
    }

    // === Policies ===

    /// Gate bounding concurrent critical operations
    pub fn admission(&self) -> &AdmissionGate {
        &self.admission
    }

    pub fn blocking_policy(&self) -> BlockingPolicy {
        self.blocking_policy
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("db", &self.db)
            .field("repositories", &"...")
            .field("jwt_service", &self.jwt_service)
            .field("admission", &self.admission)
            .field("blocking_policy", &self.blocking_policy)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    db: Option<Arc<ConnectionManager>>,
    user_repo: Option<Arc<dyn UserRepository>>,
    login_attempt_repo: Option<Arc<dyn LoginAttemptRepository>>,
    session_repo: Option<Arc<dyn SessionRepository>>,
    audit_log_repo: Option<Arc<dyn AuditLogRepository>>,
    bot_repo: Option<Arc<dyn BotActivationRepository>>,
    referral_repo: Option<Arc<dyn ReferralCounterRepository>>,
    jwt_service: Option<Arc<JwtService>>,
    admission: Option<AdmissionGate>,
    blocking_policy: Option<BlockingPolicy>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn db(mut self, db: Arc<ConnectionManager>) -> Self {
        self.db = Some(db);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn login_attempt_repo(mut self, repo: Arc<dyn LoginAttemptRepository>) -> Self {
        self.login_attempt_repo = Some(repo);
        self
    }

    pub fn session_repo(mut self, repo: Arc<dyn SessionRepository>) -> Self {
        self.session_repo = Some(repo);
        self
    }

    pub fn audit_log_repo(mut self, repo: Arc<dyn AuditLogRepository>) -> Self {
        self.audit_log_repo = Some(repo);
        self
    }

    pub fn bot_repo(mut self, repo: Arc<dyn BotActivationRepository>) -> Self {
        self.bot_repo = Some(repo);
        self
    }

    pub fn referral_repo(mut self, repo: Arc<dyn ReferralCounterRepository>) -> Self {
        self.referral_repo = Some(repo);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn admission(mut self, gate: AdmissionGate) -> Self {
        self.admission = Some(gate);
        self
    }

    pub fn blocking_policy(mut self, policy: BlockingPolicy) -> Self {
        self.blocking_policy = Some(policy);
        self
    }

    /// Apply the login thresholds and admission settings from configuration
    pub fn security_config(self, config: &SecurityConfig) -> Self {
        self.blocking_policy(BlockingPolicy {
            max_email_failures: config.max_login_attempts,
            max_ip_failures: config.max_ip_attempts,
            window_minutes: config.login_window_minutes,
        })
        .admission(AdmissionGate::new(
            config.admission_capacity,
            std::time::Duration::from_millis(config.admission_max_wait_ms),
        ))
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            db: self.db,
            user_repo: self.user_repo.ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            login_attempt_repo: self
                .login_attempt_repo
                .ok_or_else(|| ServiceError::validation("login_attempt_repo is required"))?,
            session_repo: self.session_repo.ok_or_else(|| ServiceError::validation("session_repo is required"))?,
            audit_log_repo: self
                .audit_log_repo
                .ok_or_else(|| ServiceError::validation("audit_log_repo is required"))?,
            bot_repo: self.bot_repo.ok_or_else(|| ServiceError::validation("bot_repo is required"))?,
            referral_repo: self
                .referral_repo
                .ok_or_else(|| ServiceError::validation("referral_repo is required"))?,
            jwt_service: self.jwt_service.ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
            password_service: PasswordService::new(),
            admission: self.admission.unwrap_or_default(),
            blocking_policy: self.blocking_policy.unwrap_or_default(),
        })
    }
}
