//! Audit log model -> entity mapper

use stakehub_core::entities::{AuditLog, AuditSeverity};

use crate::models::AuditLogModel;

impl From<AuditLogModel> for AuditLog {
    fn from(model: AuditLogModel) -> Self {
        AuditLog {
            id: model.id,
            user_id: model.user_id,
            action: model.action,
            details: model.details,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            // Rows written by hand may carry an unknown severity
            severity: AuditSeverity::parse(&model.severity).unwrap_or(AuditSeverity::Low),
            created_at: model.created_at,
        }
    }
}
