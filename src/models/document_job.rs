//! Tracked generation attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TemplateType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentJobStatus {
    Pending,
    Success,
    Failed,
}

/// Bookkeeping record for one document generation attempt. Jobs are not
/// scheduled tasks; generation runs synchronously and the record captures
/// the outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentJob {
    pub id: i64,
    pub student_id: i64,
    pub template_type: TemplateType,
    pub file_path: Option<String>,
    pub status: DocumentJobStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl DocumentJob {
    pub fn pending(student_id: i64, template_type: TemplateType) -> Self {
        Self {
            id: 0,
            student_id,
            template_type,
            file_path: None,
            status: DocumentJobStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            error_message: None,
        }
    }

    pub fn mark_success(&mut self, file_path: impl Into<String>) {
        self.status = DocumentJobStatus::Success;
        self.file_path = Some(file_path.into());
        self.error_message = None;
        self.completed_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = DocumentJobStatus::Failed;
        self.error_message = Some(message.into());
        self.completed_at = Some(Utc::now());
    }

    /// Retry re-enters the pipeline on the same record; only failed jobs
    /// qualify.
    pub fn retryable(&self) -> bool {
        self.status == DocumentJobStatus::Failed
    }

    pub fn reset_for_retry(&mut self) {
        self.status = DocumentJobStatus::Pending;
        self.file_path = None;
        self.error_message = None;
        self.completed_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_transitions() {
        let mut job = DocumentJob::pending(1, TemplateType::WelcomeLetter);
        assert_eq!(job.status, DocumentJobStatus::Pending);
        assert!(!job.retryable());

        job.mark_failed("template missing");
        assert_eq!(job.status, DocumentJobStatus::Failed);
        assert!(job.retryable());
        assert!(job.completed_at.is_some());

        job.reset_for_retry();
        job.mark_success("generated_docs/welcome_letter/2026/x.docx");
        assert_eq!(job.status, DocumentJobStatus::Success);
        assert!(job.error_message.is_none());
    }
}
