//! Administrative core for a private secondary school: student, course and
//! enrollment records plus the official-document generation pipeline
//! (report cards, transcripts, letters) with tracked generation jobs.
//!
//! The HTTP layer and real persistence live outside this crate; callers
//! supply typed inputs and an authenticated user id, and records flow
//! through the [`repository::Repository`] trait.

pub mod audit;
pub mod config;
pub mod documents;
pub mod models;
pub mod repository;

pub use crate::audit::AuditLogger;
pub use crate::config::{AppConfig, SchoolInfo};
pub use crate::documents::{
    ContextBuilder, DocumentError, DocumentService, GenerateOverrides, GenerationOutcome,
    NoopConverter,
};
pub use crate::models::{
    Course, CourseLevel, CourseStatus, DocumentJob, DocumentJobStatus, GraduationStatus, Month,
    OperationLog, RecordDate, Student, StudentCourse, Template, TemplateType, ValidationError,
};
pub use crate::repository::{MemoryRepository, Repository, RepositoryError};
