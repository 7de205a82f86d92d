//! Domain records for the school administration core.
//!
//! Every enum parses through exactly one strict [`FromStr`] implementation
//! that normalizes case and whitespace once and rejects unknown input with a
//! typed [`ValidationError`]; call sites never match loose strings themselves.

mod course;
mod document_job;
mod operation_log;
mod student;
mod student_course;
mod template;

pub use course::{Course, CourseLevel};
pub use document_job::{DocumentJob, DocumentJobStatus};
pub use operation_log::OperationLog;
pub use student::{GraduationStatus, Month, RecordDate, Student};
pub use student_course::{CourseStatus, StudentCourse, PLE_COURSE_CODE};
pub use template::{RenderBackend, Template, TemplateType};

use thiserror::Error;

/// Rejections raised before any job or side effect is created.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid {expected}")]
    InvalidEnum {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("{field} must not be empty")]
    MissingField { field: &'static str },
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("OEN must be exactly 9 digits, got '{0}'")]
    InvalidOen(String),
    #[error("final grade cannot be set while the midterm grade is unset")]
    FinalGradeBeforeMidterm,
    #[error("override credit is only allowed on completed enrollments")]
    OverrideCreditNotCompleted,
}

/// Validation of a whole record before it is persisted.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Shared normalization for the strict enum parsers: trim, fold case,
/// collapse separators to underscores.
pub(crate) fn normalize_token(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            _ => c.to_ascii_uppercase(),
        })
        .collect()
}

pub(crate) fn require_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_token_folds_case_and_separators() {
        assert_eq!(normalize_token("  in progress "), "IN_PROGRESS");
        assert_eq!(normalize_token("Report-Card"), "REPORT_CARD");
    }

    #[test]
    fn test_require_range_bounds() {
        assert!(require_range("credit", 2.5, 0.0, 4.0).is_ok());
        assert!(require_range("credit", 4.5, 0.0, 4.0).is_err());
    }
}
