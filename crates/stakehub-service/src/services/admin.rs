//! Administrative operations over sessions and login history

use serde_json::json;
use tracing::{info, instrument};

use stakehub_core::entities::actions;

use crate::dto::{ClientContext, MaintenanceResponse};

use super::audit::AuditLogger;
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::login_security::LoginSecurityService;
use super::session::SessionService;

pub struct AdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdminService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Revoke every session of `target_user_id`
    #[instrument(skip(self, client))]
    pub async fn revoke_user_sessions(
        &self,
        admin_id: &str,
        target_user_id: &str,
        client: &ClientContext,
    ) -> u64 {
        let revoked = SessionService::new(self.ctx)
            .revoke_all_user_sessions(target_user_id)
            .await;

        AuditLogger::new(self.ctx)
            .log_admin_action(
                actions::SESSIONS_REVOKED,
                admin_id,
                json!({ "targetUserId": target_user_id, "revoked": revoked }),
                Some(client),
            )
            .await;

        revoked
    }

    /// Purge login attempts older than `days_to_keep` and deactivate expired sessions
    ///
    /// # Errors
    /// Propagates login-attempt cleanup failures
    #[instrument(skip(self, client))]
    pub async fn run_maintenance(
        &self,
        days_to_keep: i32,
        admin_id: &str,
        client: &ClientContext,
    ) -> ServiceResult<MaintenanceResponse> {
        let deleted_login_attempts = LoginSecurityService::new(self.ctx)
            .cleanup_old_attempts(days_to_keep)
            .await?;
        let expired_sessions = SessionService::new(self.ctx)
            .cleanup_expired_sessions()
            .await;

        info!(
            deleted_login_attempts,
            expired_sessions, "Maintenance cleanup finished"
        );

        AuditLogger::new(self.ctx)
            .log_admin_action(
                actions::MAINTENANCE_CLEANUP,
                admin_id,
                json!({
                    "daysToKeep": days_to_keep,
                    "deletedLoginAttempts": deleted_login_attempts,
                    "expiredSessions": expired_sessions,
                }),
                Some(client),
            )
            .await;

        Ok(MaintenanceResponse {
            success: true,
            deleted_login_attempts,
            expired_sessions,
        })
    }
}
