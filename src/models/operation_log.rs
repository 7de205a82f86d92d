//! Append-only audit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One audited mutating action. Rows are written once and never updated or
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationLog {
    pub log_id: i64,
    pub user_id: i64,
    pub operation_type: String,
    pub target_table: String,
    pub target_id: String,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OperationLog {
    pub fn new(
        user_id: i64,
        operation_type: impl Into<String>,
        target_table: impl Into<String>,
        target_id: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            log_id: 0,
            user_id,
            operation_type: operation_type.into(),
            target_table: target_table.into(),
            target_id: target_id.into(),
            details,
            created_at: Utc::now(),
        }
    }
}
