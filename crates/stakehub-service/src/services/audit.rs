//! Audit logger
//!
//! Append-only trail of security relevant events. Writes are best effort:
//! a failed write is logged and never reaches the caller.

use serde_json::Value;
use tracing::{error, info, instrument};

use stakehub_core::entities::{AuditCategory, AuditLog, AuditLogFilter, NewAuditLog};

use crate::dto::ClientContext;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Audit logger
pub struct AuditLogger<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuditLogger<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Write one entry, returning its id when the write succeeded
    #[instrument(skip(self, entry), fields(action = %entry.action, severity = entry.severity.as_str()))]
    pub async fn create_audit_log(&self, entry: NewAuditLog) -> Option<i64> {
        match self.ctx.audit_log_repo().insert(&entry).await {
            Ok(id) => Some(id),
            Err(e) => {
                error!(error = %e, action = %entry.action, "Failed to write audit log");
                None
            }
        }
    }

    async fn log_event(
        &self,
        category: AuditCategory,
        action: &str,
        user_id: Option<&str>,
        details: Value,
        client: Option<&ClientContext>,
    ) -> Option<i64> {
        let mut entry = NewAuditLog::new(action, category.severity_for(action)).details(details);
        if let Some(user_id) = user_id {
            entry = entry.user(user_id);
        }
        if let Some(client) = client {
            entry = entry.client(Some(client.ip_address.clone()), client.user_agent.clone());
        }
        self.create_audit_log(entry).await
    }

    /// Login, logout and token events
    pub async fn log_auth_event(
        &self,
        action: &str,
        user_id: Option<&str>,
        details: Value,
        client: Option<&ClientContext>,
    ) -> Option<i64> {
        self.log_event(AuditCategory::Auth, action, user_id, details, client)
            .await
    }

    /// Actions performed by an administrator
    pub async fn log_admin_action(
        &self,
        action: &str,
        admin_id: &str,
        details: Value,
        client: Option<&ClientContext>,
    ) -> Option<i64> {
        self.log_event(AuditCategory::Admin, action, Some(admin_id), details, client)
            .await
    }

    /// Deposits, withdrawals and refunds
    pub async fn log_payment_event(
        &self,
        action: &str,
        user_id: &str,
        details: Value,
        client: Option<&ClientContext>,
    ) -> Option<i64> {
        self.log_event(AuditCategory::Payment, action, Some(user_id), details, client)
            .await
    }

    /// Blocks, unauthorized access and other suspicious events
    pub async fn log_security_event(
        &self,
        action: &str,
        user_id: Option<&str>,
        details: Value,
        client: Option<&ClientContext>,
    ) -> Option<i64> {
        self.log_event(AuditCategory::Security, action, user_id, details, client)
            .await
    }

    /// Filtered entries, newest first
    ///
    /// # Errors
    /// Propagates repository failures
    #[instrument(skip(self))]
    pub async fn get_audit_logs(&self, filter: &AuditLogFilter) -> ServiceResult<Vec<AuditLog>> {
        Ok(self.ctx.audit_log_repo().find(filter).await?)
    }

    /// Create the audit table and its indexes if they are missing
    ///
    /// # Errors
    /// Propagates repository failures
    pub async fn initialize_audit_logs_table(&self) -> ServiceResult<()> {
        self.ctx.audit_log_repo().ensure_schema().await?;
        info!("Audit log storage initialized");
        Ok(())
    }
}

/// Write an entry on a background task without waiting for it
pub fn spawn_audit_log(ctx: ServiceContext, entry: NewAuditLog) -> tokio::task::JoinHandle<Option<i64>> {
    tokio::spawn(async move { AuditLogger::new(&ctx).create_audit_log(entry).await })
}
