//! Document generation pipeline.
//!
//! Context assembly ([`context`]), grade-to-skill derivation ([`skills`]),
//! template rendering ([`render`]), best-effort format conversion
//! ([`convert`]) and the job-tracking orchestrator ([`service`]).

pub mod context;
pub mod convert;
pub mod corpus;
pub mod render;
pub mod service;
pub mod skills;

mod report_card;
mod transcript;

pub use context::{
    Context, ContextBuilder, GenerateOverrides, PredictedGrade, ReportCardOverrides,
    TranscriptOverrides,
};
pub use convert::{Converter, ExternalConverter, NoopConverter};
pub use render::{render_template, RenderError};
pub use service::{DocumentService, GenerationOutcome};
pub use skills::{generate_comment, infer_learning_skills, SkillDomain, SkillLevel, SkillLevels};

use thiserror::Error;

use crate::models::ValidationError;
use crate::repository::RepositoryError;

/// Failures surfaced to the caller of the generation API.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("render failed: {0}")]
    Render(#[source] RenderError),
    #[error("repository conflict: {0}")]
    Conflict(String),
    #[error("job {0} is not in a failed state and cannot be retried")]
    NotRetryable(i64),
    #[error("all {0} generation tasks failed")]
    AllTasksFailed(usize),
    #[error("archive error: {0}")]
    Archive(String),
}

impl From<RepositoryError> for DocumentError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound { entity, key } => DocumentError::NotFound { entity, key },
            RepositoryError::Conflict(message) => DocumentError::Conflict(message),
        }
    }
}

impl From<RenderError> for DocumentError {
    fn from(e: RenderError) -> Self {
        match e {
            // A missing backing file is a 404 to the caller, same as a
            // missing template record.
            RenderError::TemplateFileMissing(path) => DocumentError::NotFound {
                entity: "template file",
                key: path.display().to_string(),
            },
            other => DocumentError::Render(other),
        }
    }
}
