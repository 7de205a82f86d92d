//! Persistence boundary.
//!
//! The core consumes records through [`Repository`]; the HTTP and storage
//! layers live elsewhere. [`MemoryRepository`] backs the test suite and
//! single-process deployments.

mod memory;

pub use memory::MemoryRepository;

use thiserror::Error;

use crate::models::{
    Course, DocumentJob, OperationLog, Student, StudentCourse, Template, TemplateType,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RepositoryError {
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },
    #[error("conflict: {0}")]
    Conflict(String),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Synchronous record store. Implementations enforce the unique constraints
/// (student OEN, (student, course) enrollment pair) and the student →
/// enrollment cascade on delete.
pub trait Repository: Send + Sync {
    fn get_student(&self, id: i64) -> RepoResult<Student>;
    fn list_students(&self) -> Vec<Student>;
    /// Insert when `student.id == 0` (an id is assigned), update otherwise.
    fn save_student(&self, student: &mut Student) -> RepoResult<()>;
    fn delete_student(&self, id: i64) -> RepoResult<()>;

    fn get_course(&self, code: &str) -> RepoResult<Course>;
    fn list_courses(&self) -> Vec<Course>;
    fn save_course(&self, course: &Course) -> RepoResult<()>;
    fn delete_course(&self, code: &str) -> RepoResult<()>;

    fn get_enrollment(&self, id: i64) -> RepoResult<StudentCourse>;
    fn list_enrollments(&self, student_id: i64) -> Vec<StudentCourse>;
    fn save_enrollment(&self, enrollment: &mut StudentCourse) -> RepoResult<()>;

    /// First template whose type matches, mirroring the lookup order used by
    /// document generation.
    fn get_template(&self, template_type: TemplateType) -> RepoResult<Template>;
    fn save_template(&self, template: &mut Template) -> RepoResult<()>;

    fn get_job(&self, id: i64) -> RepoResult<DocumentJob>;
    fn save_job(&self, job: &mut DocumentJob) -> RepoResult<()>;

    fn append_audit_log(&self, entry: OperationLog) -> RepoResult<()>;
    fn list_audit_logs(&self) -> Vec<OperationLog>;
}
