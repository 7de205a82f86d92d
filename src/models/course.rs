//! Course master records.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{normalize_token, Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseLevel {
    #[serde(rename = "09")]
    Grade09,
    #[serde(rename = "10")]
    Grade10,
    #[serde(rename = "11")]
    Grade11,
    #[serde(rename = "12")]
    Grade12,
    #[serde(rename = "ESL1")]
    Esl1,
    #[serde(rename = "ESL2")]
    Esl2,
    #[serde(rename = "ESL3")]
    Esl3,
    #[serde(rename = "ESL4")]
    Esl4,
    #[serde(rename = "ESL5")]
    Esl5,
    #[serde(rename = "EQV")]
    Eqv,
}

impl CourseLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            CourseLevel::Grade09 => "09",
            CourseLevel::Grade10 => "10",
            CourseLevel::Grade11 => "11",
            CourseLevel::Grade12 => "12",
            CourseLevel::Esl1 => "ESL1",
            CourseLevel::Esl2 => "ESL2",
            CourseLevel::Esl3 => "ESL3",
            CourseLevel::Esl4 => "ESL4",
            CourseLevel::Esl5 => "ESL5",
            CourseLevel::Eqv => "EQV",
        }
    }

    /// Short form used in the transcript level column: ESL levels keep only
    /// their trailing digit, numeric grade levels their last two characters.
    pub fn transcript_abbrev(self) -> &'static str {
        match self {
            CourseLevel::Grade09 => "09",
            CourseLevel::Grade10 => "10",
            CourseLevel::Grade11 => "11",
            CourseLevel::Grade12 => "12",
            CourseLevel::Esl1 => "1",
            CourseLevel::Esl2 => "2",
            CourseLevel::Esl3 => "3",
            CourseLevel::Esl4 => "4",
            CourseLevel::Esl5 => "5",
            CourseLevel::Eqv => "",
        }
    }
}

impl FromStr for CourseLevel {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let level = match normalize_token(raw).as_str() {
            "09" | "9" | "GRADE_09" => CourseLevel::Grade09,
            "10" | "GRADE_10" => CourseLevel::Grade10,
            "11" | "GRADE_11" => CourseLevel::Grade11,
            "12" | "GRADE_12" => CourseLevel::Grade12,
            "ESL1" | "ESL_1" => CourseLevel::Esl1,
            "ESL2" | "ESL_2" => CourseLevel::Esl2,
            "ESL3" | "ESL_3" => CourseLevel::Esl3,
            "ESL4" | "ESL_4" => CourseLevel::Esl4,
            "ESL5" | "ESL_5" => CourseLevel::Esl5,
            "EQV" => CourseLevel::Eqv,
            _ => {
                return Err(ValidationError::InvalidEnum {
                    field: "course_level",
                    value: raw.to_string(),
                    expected: "course level",
                })
            }
        };
        Ok(level)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Stable identifier used in document rows, e.g. `ENG4U`.
    pub course_code: String,
    pub course_name: String,
    pub description: String,
    /// Nullable only for equivalent-credit (EQV) courses.
    pub credit: Option<f64>,
    pub course_level: CourseLevel,
    pub is_compulsory: bool,
}

impl Validate for Course {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.course_code.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "course_code",
            });
        }
        if self.course_name.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "course_name",
            });
        }
        match self.credit {
            Some(credit) => super::require_range("credit", credit, 0.0, 4.0)?,
            None => {
                if self.course_level != CourseLevel::Eqv {
                    return Err(ValidationError::MissingField { field: "credit" });
                }
            }
        }
        Ok(())
    }
}
