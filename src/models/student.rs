//! Student record plus the calendar enums shared across the data model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{normalize_token, Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Three-letter uppercase form used in student-facing date strings.
    pub fn abbrev(self) -> &'static str {
        match self {
            Month::Jan => "JAN",
            Month::Feb => "FEB",
            Month::Mar => "MAR",
            Month::Apr => "APR",
            Month::May => "MAY",
            Month::Jun => "JUN",
            Month::Jul => "JUL",
            Month::Aug => "AUG",
            Month::Sep => "SEP",
            Month::Oct => "OCT",
            Month::Nov => "NOV",
            Month::Dec => "DEC",
        }
    }

    /// 1-based month number used on transcript rows and derived numbers.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_number(n: u32) -> Option<Month> {
        Month::ALL.get(n.checked_sub(1)? as usize).copied()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

impl FromStr for Month {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let token = normalize_token(raw);
        if let Ok(n) = token.parse::<u32>() {
            if let Some(month) = Month::from_number(n) {
                return Ok(month);
            }
        }
        let month = match token.as_str() {
            "JAN" | "JANUARY" => Month::Jan,
            "FEB" | "FEBRUARY" => Month::Feb,
            "MAR" | "MARCH" => Month::Mar,
            "APR" | "APRIL" => Month::Apr,
            "MAY" => Month::May,
            "JUN" | "JUNE" => Month::Jun,
            "JUL" | "JULY" => Month::Jul,
            "AUG" | "AUGUST" => Month::Aug,
            "SEP" | "SEPTEMBER" => Month::Sep,
            "OCT" | "OCTOBER" => Month::Oct,
            "NOV" | "NOVEMBER" => Month::Nov,
            "DEC" | "DECEMBER" => Month::Dec,
            _ => {
                return Err(ValidationError::InvalidEnum {
                    field: "month",
                    value: raw.to_string(),
                    expected: "month",
                })
            }
        };
        Ok(month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GraduationStatus {
    InProgress,
    Graduated,
    Withdrawn,
}

impl FromStr for GraduationStatus {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match normalize_token(raw).as_str() {
            "IN_PROGRESS" | "INPROGRESS" => Ok(GraduationStatus::InProgress),
            "GRADUATED" => Ok(GraduationStatus::Graduated),
            "WITHDRAWN" => Ok(GraduationStatus::Withdrawn),
            _ => Err(ValidationError::InvalidEnum {
                field: "graduation_status",
                value: raw.to_string(),
                expected: "graduation status",
            }),
        }
    }
}

/// A calendar date stored the way the records keep it: explicit year,
/// month enum and day-of-month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDate {
    pub year: i32,
    pub month: Month,
    pub day: u32,
}

impl RecordDate {
    pub fn new(year: i32, month: Month, day: u32) -> Self {
        Self { year, month, day }
    }

    /// `YYYY-MMM-DD` with the day zero-padded to two digits.
    pub fn display(&self) -> String {
        format!("{}-{}-{:02}", self.year, self.month.abbrev(), self.day)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    /// Ontario Education Number, nine ASCII digits, unique per student.
    pub oen: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: RecordDate,
    pub enrollment_date: RecordDate,
    pub expected_graduation: RecordDate,
    pub address: Option<String>,
    pub graduation_status: GraduationStatus,
    /// Grade level 9 through 12.
    pub grade_level: u8,
    pub volunteer_hours: u32,
    pub remark: Option<String>,
}

impl Student {
    /// OEN rendered in the display form `XXX-XXX-XXX`.
    pub fn formatted_oen(&self) -> String {
        format!("{}-{}-{}", &self.oen[..3], &self.oen[3..6], &self.oen[6..])
    }

    pub fn full_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// Derived student number: enrollment `YYMM`, last two digits of the
    /// record id, then the birth date as `YYMMDD`.
    pub fn student_number(&self) -> String {
        let suffix = format!("{:02}", self.id.rem_euclid(100));
        format!(
            "{:02}{:02}{}{:02}{:02}{:02}",
            self.enrollment_date.year.rem_euclid(100),
            self.enrollment_date.month.number(),
            suffix,
            self.birth_date.year.rem_euclid(100),
            self.birth_date.month.number(),
            self.birth_date.day,
        )
    }
}

impl Validate for Student {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "first_name",
            });
        }
        if self.last_name.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "last_name" });
        }
        if self.oen.len() != 9 || !self.oen.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidOen(self.oen.clone()));
        }
        super::require_range("grade_level", f64::from(self.grade_level), 9.0, 12.0)?;
        super::require_range("birth_day", f64::from(self.birth_date.day), 1.0, 31.0)?;
        super::require_range(
            "enrollment_day",
            f64::from(self.enrollment_date.day),
            1.0,
            31.0,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Student {
        Student {
            id: 12,
            oen: "123456789".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            birth_date: RecordDate::new(2007, Month::Mar, 5),
            enrollment_date: RecordDate::new(2023, Month::Sep, 1),
            expected_graduation: RecordDate::new(2027, Month::Jun, 30),
            address: None,
            graduation_status: GraduationStatus::InProgress,
            grade_level: 11,
            volunteer_hours: 0,
            remark: None,
        }
    }

    #[test]
    fn test_month_strict_parser() {
        assert_eq!("sep".parse::<Month>().unwrap(), Month::Sep);
        assert_eq!("September".parse::<Month>().unwrap(), Month::Sep);
        assert_eq!("09".parse::<Month>().unwrap(), Month::Sep);
        assert!("Sept".parse::<Month>().is_err());
        assert!("13".parse::<Month>().is_err());
    }

    #[test]
    fn test_formatted_oen() {
        assert_eq!(student().formatted_oen(), "123-456-789");
    }

    #[test]
    fn test_student_number_derivation() {
        // 2309 + "12" + 070305
        assert_eq!(student().student_number(), "230912070305");
    }

    #[test]
    fn test_validate_rejects_bad_oen() {
        let mut s = student();
        s.oen = "12345678".to_string();
        assert!(matches!(s.validate(), Err(ValidationError::InvalidOen(_))));
    }

    #[test]
    fn test_validate_rejects_grade_level() {
        let mut s = student();
        s.grade_level = 8;
        assert!(s.validate().is_err());
    }
}
