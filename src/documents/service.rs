//! Generation orchestrator: job tracking, pipeline selection, batching and
//! ZIP packaging.
//!
//! Every generation runs synchronously on the calling thread. Jobs are
//! bookkeeping records with exactly one terminal transition per attempt:
//! `PENDING -> SUCCESS` or `PENDING -> FAILED`. A failure inside a tracked
//! attempt is returned as a failed outcome carrying the job record, not as
//! an error; only faults that precede job creation (unknown student,
//! invalid input) surface as errors.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::audit::AuditLogger;
use crate::config::AppConfig;
use crate::models::{
    Course, CourseLevel, DocumentJob, DocumentJobStatus, RenderBackend, Student, StudentCourse,
    TemplateType,
};
use crate::repository::{Repository, RepositoryError};

use super::context::{ContextBuilder, GenerateOverrides};
use super::convert::{Converter, ExternalConverter};
use super::render::render_template;
use super::{Context, DocumentError};

/// Terminal state of one tracked generation attempt. `file_path` is set
/// exactly when the job succeeded.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub job: DocumentJob,
    pub file_path: Option<PathBuf>,
}

impl GenerationOutcome {
    pub fn succeeded(&self) -> bool {
        self.job.status == DocumentJobStatus::Success
    }
}

pub struct DocumentService {
    repo: Arc<dyn Repository>,
    builder: ContextBuilder,
    converter: Arc<dyn Converter>,
    audit: AuditLogger,
    generated_root: PathBuf,
}

impl DocumentService {
    pub fn new(repo: Arc<dyn Repository>, config: &AppConfig) -> Self {
        let converter = Arc::new(ExternalConverter::new(config));
        Self::with_converter(repo, config, converter)
    }

    /// Construct with an explicit converter, e.g. a no-op in tests.
    pub fn with_converter(
        repo: Arc<dyn Repository>,
        config: &AppConfig,
        converter: Arc<dyn Converter>,
    ) -> Self {
        Self {
            audit: AuditLogger::new(repo.clone()),
            builder: ContextBuilder::new(config.school.clone()),
            converter,
            generated_root: config.generated_root.clone(),
            repo,
        }
    }

    pub fn with_builder(mut self, builder: ContextBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Generate one document for one student. The student must resolve
    /// before a job record is created; everything after that is tracked on
    /// the returned job.
    pub fn generate_document(
        &self,
        template_type: TemplateType,
        student_id: i64,
        overrides: &GenerateOverrides,
        user_id: i64,
    ) -> Result<GenerationOutcome, DocumentError> {
        let student = self.repo.get_student(student_id)?;
        let outcome = self.tracked_attempt(&student, template_type, overrides)?;
        if let Some(path) = &outcome.file_path {
            self.audit.record(
                user_id,
                "generate_document",
                "document_jobs",
                outcome.job.id,
                format!("generated {} -> {}", template_type.as_str(), file_name(path)),
            );
        }
        Ok(outcome)
    }

    /// Re-run a failed job on the same record. Only `FAILED` jobs qualify.
    pub fn retry_job(
        &self,
        job_id: i64,
        overrides: &GenerateOverrides,
        user_id: i64,
    ) -> Result<GenerationOutcome, DocumentError> {
        let mut job = self.repo.get_job(job_id)?;
        if !job.retryable() {
            return Err(DocumentError::NotRetryable(job_id));
        }
        let student = self.repo.get_student(job.student_id)?;

        job.reset_for_retry();
        self.repo.save_job(&mut job)?;
        let outcome = self.finish_attempt(job, &student, overrides)?;
        if let Some(path) = &outcome.file_path {
            self.audit.record(
                user_id,
                "retry_document_job",
                "document_jobs",
                outcome.job.id,
                format!("retried -> {}", file_name(path)),
            );
        }
        Ok(outcome)
    }

    /// Generate the same document type for many students and package the
    /// successes into one ZIP. Every student must resolve before any
    /// generation starts; each (student, type) attempt gets its own job
    /// record, and failed attempts are skipped from the archive.
    pub fn generate_batch(
        &self,
        template_type: TemplateType,
        student_ids: &[i64],
        overrides: &GenerateOverrides,
        user_id: i64,
    ) -> Result<PathBuf, DocumentError> {
        let students: Vec<Student> = student_ids
            .iter()
            .map(|id| self.repo.get_student(*id))
            .collect::<Result<_, RepositoryError>>()?;

        let mut generated = Vec::new();
        for student in &students {
            let outcome = self.tracked_attempt(student, template_type, overrides)?;
            if let Some(path) = outcome.file_path {
                generated.push(path);
            }
        }
        if generated.is_empty() {
            return Err(DocumentError::AllTasksFailed(students.len()));
        }

        let zip_path = self.package_zip(&generated, &format!("{}_batch", template_type.slug()))?;
        self.audit.record(
            user_id,
            "generate_batch",
            "document_jobs",
            template_type.as_str(),
            format!(
                "{} of {} documents archived to {}",
                generated.len(),
                students.len(),
                file_name(&zip_path)
            ),
        );
        Ok(zip_path)
    }

    /// Generate several document types for one student and package the
    /// successes. Partial success still produces an archive; the call only
    /// fails when every requested type failed.
    pub fn generate_packages(
        &self,
        student_id: i64,
        template_types: &[TemplateType],
        overrides: &GenerateOverrides,
        user_id: i64,
    ) -> Result<PathBuf, DocumentError> {
        let student = self.repo.get_student(student_id)?;

        let mut generated = Vec::new();
        for template_type in template_types {
            let outcome = self.tracked_attempt(&student, *template_type, overrides)?;
            if let Some(path) = outcome.file_path {
                generated.push(path);
            }
        }
        if generated.is_empty() {
            return Err(DocumentError::AllTasksFailed(template_types.len()));
        }

        let stem = format!(
            "{}_{}_package",
            super::render::filename_component(&student.last_name),
            super::render::filename_component(&student.first_name),
        );
        let zip_path = self.package_zip(&generated, &stem)?;
        self.audit.record(
            user_id,
            "generate_packages",
            "document_jobs",
            student_id,
            format!(
                "{} of {} documents archived to {}",
                generated.len(),
                template_types.len(),
                file_name(&zip_path)
            ),
        );
        Ok(zip_path)
    }

    /// Create the job record, then run the pipeline and record the terminal
    /// transition. The failure message is stored on the job verbatim.
    fn tracked_attempt(
        &self,
        student: &Student,
        template_type: TemplateType,
        overrides: &GenerateOverrides,
    ) -> Result<GenerationOutcome, DocumentError> {
        let mut job = DocumentJob::pending(student.id, template_type);
        self.repo.save_job(&mut job)?;
        self.finish_attempt(job, student, overrides)
    }

    fn finish_attempt(
        &self,
        mut job: DocumentJob,
        student: &Student,
        overrides: &GenerateOverrides,
    ) -> Result<GenerationOutcome, DocumentError> {
        match self.run_pipeline(student, job.template_type, overrides) {
            Ok(path) => {
                job.mark_success(path.display().to_string());
                self.repo.save_job(&mut job)?;
                Ok(GenerationOutcome {
                    job,
                    file_path: Some(path),
                })
            }
            Err(e) => {
                job.mark_failed(e.to_string());
                self.repo.save_job(&mut job)?;
                log::warn!(
                    "generation of {} for student {} failed: {e}",
                    job.template_type.as_str(),
                    student.id
                );
                Ok(GenerationOutcome {
                    job,
                    file_path: None,
                })
            }
        }
    }

    /// Context -> render -> convert for one document. Conversion is
    /// best-effort and never fails the attempt.
    fn run_pipeline(
        &self,
        student: &Student,
        template_type: TemplateType,
        overrides: &GenerateOverrides,
    ) -> Result<PathBuf, DocumentError> {
        let template = self.repo.get_template(template_type)?;
        let ctx = self.build_context(student, template_type, overrides)?;
        let rendered = render_template(&template, &ctx, student, &self.generated_root)?;

        let delivered = match template_type.backend() {
            RenderBackend::Fill => self.converter.docx_to_pdf(&rendered).unwrap_or(rendered),
            RenderBackend::Form => self.converter.flatten_pdf(&rendered),
        };
        Ok(delivered)
    }

    fn build_context(
        &self,
        student: &Student,
        template_type: TemplateType,
        overrides: &GenerateOverrides,
    ) -> Result<Context, DocumentError> {
        let ctx = match template_type {
            TemplateType::WelcomeLetter => {
                let courses = self.student_courses(student.id)?;
                let mut ctx = self.builder.student_context(student);
                ctx.append(&mut self.builder.login_context(student));
                ctx.append(&mut self.builder.course_desc_context(&courses));
                ctx
            }
            TemplateType::LetterOfEnrolment | TemplateType::LetterOfAcceptance => {
                self.builder.student_context(student)
            }
            TemplateType::PredictedGrades => {
                let courses = self.student_courses(student.id)?;
                let mut ctx = self.builder.student_context(student);
                ctx.append(
                    &mut self
                        .builder
                        .predicted_courses_context(&courses, &overrides.predicted),
                );
                ctx
            }
            TemplateType::ReportCard => {
                let rows = self.enrollment_rows(student.id)?;
                self.builder
                    .report_card_context(student, &rows, &overrides.report_card)
            }
            TemplateType::Transcript => {
                let rows = self.enrollment_rows(student.id)?;
                self.builder
                    .transcript_context(student, &rows, false, &overrides.transcript)
            }
            TemplateType::FinalTranscript => {
                let rows = self.enrollment_rows(student.id)?;
                self.builder
                    .transcript_context(student, &rows, true, &overrides.transcript)
            }
        };
        Ok(ctx)
    }

    /// Enrollments joined with their course masters, in enrollment order.
    /// A PLE enrollment never consults its master record, so a missing one
    /// is synthesized rather than failing the transcript.
    fn enrollment_rows(
        &self,
        student_id: i64,
    ) -> Result<Vec<(StudentCourse, Course)>, DocumentError> {
        self.repo
            .list_enrollments(student_id)
            .into_iter()
            .map(|sc| {
                let course = match self.repo.get_course(&sc.course_code) {
                    Ok(course) => course,
                    Err(RepositoryError::NotFound { .. }) if sc.is_ple() => Course {
                        course_code: sc.course_code.clone(),
                        course_name: "Equivalent Credits".to_string(),
                        description: String::new(),
                        credit: None,
                        course_level: CourseLevel::Eqv,
                        is_compulsory: false,
                    },
                    Err(e) => return Err(e.into()),
                };
                Ok((sc, course))
            })
            .collect()
    }

    fn student_courses(&self, student_id: i64) -> Result<Vec<Course>, DocumentError> {
        Ok(self
            .enrollment_rows(student_id)?
            .into_iter()
            .map(|(_, course)| course)
            .collect())
    }

    /// Write the given files into a timestamped archive with a random
    /// suffix, under `{root}/archives/`.
    fn package_zip(&self, paths: &[PathBuf], stem: &str) -> Result<PathBuf, DocumentError> {
        let archive_err = |e: &dyn std::fmt::Display| DocumentError::Archive(e.to_string());

        let dir = self.generated_root.join("archives");
        fs::create_dir_all(&dir).map_err(|e| archive_err(&e))?;

        let ts = Local::now().format("%Y%m%d_%H%M%S");
        let suffix = Uuid::new_v4().simple().to_string();
        let zip_path = dir.join(format!("{stem}_{ts}_{}.zip", &suffix[..8]));

        let file = fs::File::create(&zip_path).map_err(|e| archive_err(&e))?;
        let mut writer = ZipWriter::new(file);
        for path in paths {
            writer
                .start_file(file_name(path), SimpleFileOptions::default())
                .map_err(|e| archive_err(&e))?;
            let mut source = fs::File::open(path).map_err(|e| archive_err(&e))?;
            io::copy(&mut source, &mut writer).map_err(|e| archive_err(&e))?;
        }
        writer.finish().map_err(|e| archive_err(&e))?;

        log::info!("packaged {} files into {}", paths.len(), zip_path.display());
        Ok(zip_path)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
