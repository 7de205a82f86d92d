//! Placeholder-map assembly.
//!
//! Every document type renders from a flat string-keyed map; the builders
//! here are pure with respect to the records they read, except for the
//! injected random source consumed by skill inference.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Local};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Map, Value};

use crate::config::SchoolInfo;
use crate::models::{Course, Student};

use super::corpus::{default_teachers, PhraseCorpus};

/// Flat placeholder → value map handed to the template renderer. Values are
/// strings, numbers, or arrays of row maps for repeating sections.
pub type Context = Map<String, Value>;

/// Builds render contexts from student and course records. Holds the
/// injected school identity, teacher lookup and phrase corpus, plus the
/// seedable random source used for skill inference.
pub struct ContextBuilder {
    pub(super) school: SchoolInfo,
    pub(super) teachers: HashMap<String, String>,
    pub(super) corpus: PhraseCorpus,
    pub(super) rng: Mutex<StdRng>,
}

impl ContextBuilder {
    pub fn new(school: SchoolInfo) -> Self {
        Self {
            school,
            teachers: default_teachers(),
            corpus: PhraseCorpus::default(),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic builder for tests.
    pub fn with_seed(school: SchoolInfo, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..Self::new(school)
        }
    }

    pub fn with_teachers(mut self, teachers: HashMap<String, String>) -> Self {
        self.teachers = teachers;
        self
    }

    pub fn with_corpus(mut self, corpus: PhraseCorpus) -> Self {
        self.corpus = corpus;
        self
    }

    /// Identity fields shared by every letter template.
    pub fn student_context(&self, student: &Student) -> Context {
        let mut ctx = Context::new();
        ctx.insert(
            "STUDENT_FIRSTNAME".to_string(),
            json!(student.first_name),
        );
        ctx.insert("STUDENT_LASTNAME".to_string(), json!(student.last_name));
        ctx.insert("STUDENT_FULLNAME".to_string(), json!(student.full_name()));
        ctx.insert("OEN".to_string(), json!(student.formatted_oen()));
        ctx.insert("DOB".to_string(), json!(student.birth_date.display()));
        ctx.insert(
            "ENROLL_DATE".to_string(),
            json!(student.enrollment_date.display()),
        );
        ctx.insert(
            "EXPECTED_GRAD".to_string(),
            json!(student.expected_graduation.display()),
        );
        ctx.insert("GRADE".to_string(), json!(student.grade_level.to_string()));
        ctx.insert(
            "TODAY".to_string(),
            json!(Local::now().format("%Y-%b-%d").to_string()),
        );
        ctx
    }

    /// Welcome-letter portal credentials. A deterministic, reproducible
    /// derivation from the student's name, not a secure credential
    /// generator; the portal forces a password change on first login.
    pub fn login_context(&self, student: &Student) -> Context {
        let username = format!("{}{}", student.first_name, student.last_name).to_lowercase();
        let mut initials = String::new();
        initials.extend(student.first_name.chars().next().map(|c| c.to_ascii_uppercase()));
        initials.extend(student.last_name.chars().next().map(|c| c.to_ascii_uppercase()));
        let password = format!("Welcome2{initials}!");

        let mut ctx = Context::new();
        ctx.insert("USERNAME".to_string(), json!(username));
        ctx.insert("PASSWORD".to_string(), json!(password));
        ctx
    }

    /// One line per course, for cell-wrapped lists.
    pub fn course_list_context(&self, courses: &[Course]) -> Context {
        let lines: Vec<Value> = courses
            .iter()
            .map(|c| json!(format!("{} ({})", c.course_name, c.course_code)))
            .collect();
        let mut ctx = Context::new();
        ctx.insert("COURSE_LIST".to_string(), Value::Array(lines));
        ctx
    }

    /// Table rows for the predicted-grades layout; grade and completion date
    /// stay empty for the caller to fill.
    pub fn course_table_context(&self, courses: &[Course]) -> Context {
        let rows: Vec<Value> = courses
            .iter()
            .map(|c| {
                json!({
                    "COURSE_NAME": c.course_name,
                    "COURSE_CODE": c.course_code,
                    "COURSE_LEVEL": c.course_level.as_str(),
                    "PREDICTED_GRADE": "",
                    "COMPLETION_DATE": "",
                })
            })
            .collect();
        let mut ctx = Context::new();
        ctx.insert("SELECTED_COURSES".to_string(), Value::Array(rows));
        ctx
    }

    /// Description rows for the welcome-letter course section.
    pub fn course_desc_context(&self, courses: &[Course]) -> Context {
        let rows: Vec<Value> = courses
            .iter()
            .map(|c| {
                json!({
                    "COURSE_CODE": c.course_code,
                    "COURSE_DESCRIPTION": c.description,
                })
            })
            .collect();
        let mut ctx = Context::new();
        ctx.insert("SELECTED_COURSES".to_string(), Value::Array(rows));
        ctx
    }

    /// Predicted-grade rows populated from the caller's per-course map.
    pub fn predicted_courses_context(
        &self,
        courses: &[Course],
        predicted: &HashMap<String, PredictedGrade>,
    ) -> Context {
        let rows: Vec<Value> = courses
            .iter()
            .map(|c| {
                let entry = predicted.get(&c.course_code);
                json!({
                    "COURSE_NAME": c.course_name,
                    "COURSE_CODE": c.course_code,
                    "COURSE_LEVEL": c.course_level.as_str(),
                    "PREDICTED_GRADE": entry.map(|p| p.grade.as_str()).unwrap_or(""),
                    "COMPLETION_DATE": entry.map(|p| p.completion_date.as_str()).unwrap_or(""),
                })
            })
            .collect();
        let mut ctx = Context::new();
        ctx.insert("PREDICTED_COURSES".to_string(), Value::Array(rows));
        ctx
    }
}

/// School semester implied by a date: Sep–Dec is "1", Jan–Mar "2", and
/// everything from Apr onward "3" (summer falls through to "3" as well).
pub fn semester_for(date: DateTime<Local>) -> &'static str {
    match date.month() {
        9..=12 => "1",
        1..=3 => "2",
        _ => "3",
    }
}

/// Caller-supplied predicted standing for one course.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PredictedGrade {
    pub grade: String,
    pub completion_date: String,
}

/// Per-enrollment report-card overrides: `fields[enrollment_id][field]`
/// wins over every derived value. The reserved field `reporting` selects
/// the reporting period ("1" midterm, "2" final).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ReportCardOverrides {
    pub semester: Option<String>,
    pub homeroom: Option<String>,
    #[serde(default)]
    pub fields: HashMap<i64, HashMap<String, Value>>,
}

impl ReportCardOverrides {
    pub fn field(&self, enrollment_id: i64, name: &str) -> Option<&Value> {
        self.fields.get(&enrollment_id)?.get(name)
    }

    pub fn reporting_period(&self, enrollment_id: i64) -> Option<&str> {
        self.field(enrollment_id, "reporting")?.as_str()
    }

    pub fn set(&mut self, enrollment_id: i64, name: impl Into<String>, value: Value) {
        self.fields
            .entry(enrollment_id)
            .or_default()
            .insert(name.into(), value);
    }
}

/// Header overrides for transcript generation.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TranscriptOverrides {
    pub date: Option<String>,
    pub curr_page: Option<String>,
    pub total_page: Option<String>,
}

/// All caller-supplied overrides for one generation request, grouped by the
/// pipeline that consumes them.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct GenerateOverrides {
    #[serde(default)]
    pub report_card: ReportCardOverrides,
    #[serde(default)]
    pub transcript: TranscriptOverrides,
    #[serde(default)]
    pub predicted: HashMap<String, PredictedGrade>,
}
