//! Append-only operation audit trail.

use std::sync::Arc;

use crate::models::OperationLog;
use crate::repository::Repository;

/// Writes one audit row per mutating action. An audit write that fails is
/// logged and swallowed; it must not undo work that already completed.
pub struct AuditLogger {
    repo: Arc<dyn Repository>,
}

impl AuditLogger {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    pub fn record(
        &self,
        user_id: i64,
        operation_type: &str,
        target_table: &str,
        target_id: impl ToString,
        details: impl Into<String>,
    ) {
        let entry = OperationLog::new(
            user_id,
            operation_type,
            target_table,
            target_id.to_string(),
            Some(details.into()),
        );
        if let Err(e) = self.repo.append_audit_log(entry) {
            log::error!("failed to append audit log for {operation_type}: {e}");
        }
    }
}
