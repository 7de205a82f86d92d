//! Enrollment records linking students to courses.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::student::RecordDate;
use super::{normalize_token, Validate, ValidationError};
use chrono::NaiveDate;

/// Sentinel course code for externally earned equivalent credit. The
/// enrollment's grade fields are repurposed as credit totals; see the
/// `ple_pseudo_*` accessors.
pub const PLE_COURSE_CODE: &str = "PLE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseStatus {
    #[serde(rename = "Registered")]
    Registered,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Withdrawn")]
    Withdrawn,
}

impl FromStr for CourseStatus {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_token(raw).as_str() {
            "REGISTERED" => Ok(CourseStatus::Registered),
            "IN_PROGRESS" | "INPROGRESS" => Ok(CourseStatus::InProgress),
            "COMPLETED" => Ok(CourseStatus::Completed),
            "WITHDRAWN" => Ok(CourseStatus::Withdrawn),
            _ => Err(ValidationError::InvalidEnum {
                field: "status",
                value: raw.to_string(),
                expected: "course status",
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentCourse {
    pub id: i64,
    pub student_id: i64,
    pub course_code: String,
    pub status: CourseStatus,
    pub start_date: RecordDate,
    pub midterm_grade: Option<u8>,
    pub final_grade: Option<u8>,
    pub report_card_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    /// Per-student override of the course master's compulsory flag.
    pub is_compulsory: bool,
    /// Whether the credit was earned at this school.
    pub is_local: bool,
    override_credit: Option<f64>,
}

impl StudentCourse {
    pub fn new(
        id: i64,
        student_id: i64,
        course_code: impl Into<String>,
        status: CourseStatus,
        start_date: RecordDate,
    ) -> Self {
        Self {
            id,
            student_id,
            course_code: course_code.into(),
            status,
            start_date,
            midterm_grade: None,
            final_grade: None,
            report_card_date: None,
            completion_date: None,
            is_compulsory: false,
            is_local: true,
            override_credit: None,
        }
    }

    pub fn set_midterm_grade(&mut self, grade: u8) -> Result<(), ValidationError> {
        super::require_range("midterm_grade", f64::from(grade), 0.0, 100.0)?;
        self.midterm_grade = Some(grade);
        Ok(())
    }

    pub fn set_final_grade(&mut self, grade: u8) -> Result<(), ValidationError> {
        if self.midterm_grade.is_none() {
            return Err(ValidationError::FinalGradeBeforeMidterm);
        }
        super::require_range("final_grade", f64::from(grade), 0.0, 100.0)?;
        self.final_grade = Some(grade);
        Ok(())
    }

    /// Transferred/equivalent credit, settable only once the enrollment is
    /// completed.
    pub fn set_override_credit(&mut self, credit: f64) -> Result<(), ValidationError> {
        if self.status != CourseStatus::Completed {
            return Err(ValidationError::OverrideCreditNotCompleted);
        }
        super::require_range("override_credit", credit, 0.0, 4.0)?;
        self.override_credit = Some(credit);
        Ok(())
    }

    pub fn override_credit(&self) -> Option<f64> {
        self.override_credit
    }

    pub fn is_ple(&self) -> bool {
        self.course_code == PLE_COURSE_CODE
    }

    /// On a PLE enrollment the midterm field stores the total equivalent
    /// credit instead of a grade.
    pub fn ple_pseudo_credit(&self) -> f64 {
        f64::from(self.midterm_grade.unwrap_or(0))
    }

    /// On a PLE enrollment the final field stores the compulsory-credit
    /// count instead of a grade.
    pub fn ple_pseudo_compulsory_count(&self) -> u32 {
        u32::from(self.final_grade.unwrap_or(0))
    }
}

impl Validate for StudentCourse {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.course_code.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "course_code",
            });
        }
        if self.final_grade.is_some() && self.midterm_grade.is_none() {
            return Err(ValidationError::FinalGradeBeforeMidterm);
        }
        if self.override_credit.is_some() && self.status != CourseStatus::Completed {
            return Err(ValidationError::OverrideCreditNotCompleted);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Month;

    fn enrollment(status: CourseStatus) -> StudentCourse {
        StudentCourse::new(1, 1, "ENG4U", status, RecordDate::new(2025, Month::Sep, 5))
    }

    #[test]
    fn test_final_grade_requires_midterm() {
        let mut sc = enrollment(CourseStatus::InProgress);
        assert_eq!(
            sc.set_final_grade(88),
            Err(ValidationError::FinalGradeBeforeMidterm)
        );
        sc.set_midterm_grade(80).unwrap();
        assert!(sc.set_final_grade(88).is_ok());
    }

    #[test]
    fn test_override_credit_only_when_completed() {
        let mut sc = enrollment(CourseStatus::InProgress);
        assert_eq!(
            sc.set_override_credit(2.5),
            Err(ValidationError::OverrideCreditNotCompleted)
        );

        let mut done = enrollment(CourseStatus::Completed);
        done.set_override_credit(2.5).unwrap();
        assert_eq!(done.override_credit(), Some(2.5));
        assert!(done.set_override_credit(4.5).is_err());
    }

    #[test]
    fn test_ple_pseudo_fields() {
        let mut ple = StudentCourse::new(
            2,
            1,
            PLE_COURSE_CODE,
            CourseStatus::Completed,
            RecordDate::new(2024, Month::Sep, 1),
        );
        ple.set_midterm_grade(20).unwrap();
        ple.set_final_grade(4).unwrap();
        assert!(ple.is_ple());
        assert_eq!(ple.ple_pseudo_credit(), 20.0);
        assert_eq!(ple.ple_pseudo_compulsory_count(), 4);
    }

    #[test]
    fn test_status_parser() {
        assert_eq!(
            "in progress".parse::<CourseStatus>().unwrap(),
            CourseStatus::InProgress
        );
        assert!("done".parse::<CourseStatus>().is_err());
    }
}
