//! Template rendering.
//!
//! Two interchangeable backends selected by the template's type: in-place
//! placeholder substitution for office documents ([`fill`]) and AcroForm
//! field filling for fixed-layout PDFs ([`form`]). Both write into the
//! generated-files area under a deterministic, collision-free path scheme.

pub mod fill;
pub mod form;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local};
use serde_json::Value;
use thiserror::Error;

use crate::models::{RenderBackend, Student, Template, TemplateType};

use super::context::Context;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template file missing: {}", .0.display())]
    TemplateFileMissing(PathBuf),
    #[error("failed to read template: {0}")]
    ReadTemplate(#[source] io::Error),
    #[error("failed to write rendered document: {0}")]
    WriteOutput(#[source] io::Error),
    #[error("template archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("pdf form error: {0}")]
    PdfForm(#[from] lopdf::Error),
    #[error("document.xml in template is not valid UTF-8")]
    MalformedDocumentXml,
}

/// Render `template` with `ctx` for `student`, returning the output path.
/// Missing context keys render as empty values rather than failing; a
/// missing backing file is an error.
pub fn render_template(
    template: &Template,
    ctx: &Context,
    student: &Student,
    generated_root: &Path,
) -> Result<PathBuf, RenderError> {
    let template_path = Path::new(&template.file_path);
    if !template_path.is_file() {
        return Err(RenderError::TemplateFileMissing(template_path.to_path_buf()));
    }

    let out_path = output_path(generated_root, student, template.template_type, Local::now());
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(RenderError::WriteOutput)?;
    }

    match template.template_type.backend() {
        RenderBackend::Fill => {
            if template_path.extension().is_some_and(|ext| ext == "docx") {
                fill::fill_docx(template_path, &out_path, ctx)?;
            } else {
                fill::fill_text(template_path, &out_path, ctx)?;
            }
        }
        RenderBackend::Form => form::fill_pdf_form(template_path, &out_path, ctx)?,
    }

    log::info!(
        "rendered {} for student {} -> {}",
        template.template_type.as_str(),
        student.id,
        out_path.display()
    );
    Ok(out_path)
}

/// `{root}/{template_type}/{year}/{lastname}_{firstname}_{templatetype}_{YYYYMMDD_HHMMSS}.{ext}`
///
/// The filename layout is parsed by downstream tooling; the timestamp keeps
/// concurrent requests from colliding on the same path.
pub fn output_path(
    root: &Path,
    student: &Student,
    template_type: TemplateType,
    now: DateTime<Local>,
) -> PathBuf {
    let ts = now.format("%Y%m%d_%H%M%S");
    let last = filename_component(&student.last_name);
    let first = filename_component(&student.first_name);
    root.join(template_type.slug())
        .join(now.year().to_string())
        .join(format!(
            "{last}_{first}_{}_{ts}.{}",
            template_type.slug(),
            template_type.rendered_ext()
        ))
}

pub(crate) fn filename_component(name: &str) -> String {
    sanitize_filename::sanitize(name.trim())
        .to_lowercase()
        .replace(' ', "_")
}

/// Flatten a context value into placeholder text. Arrays and objects only
/// make sense inside repeating sections, so they collapse to empty here.
pub(crate) fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GraduationStatus, Month, RecordDate};
    use chrono::TimeZone;

    fn student() -> Student {
        Student {
            id: 1,
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
    fn test_output_path_scheme() {
        let now = Local.with_ymd_and_hms(2026, 8, 6, 14, 30, 5).unwrap();
        let path = output_path(
            Path::new("generated_docs"),
            &student(),
            TemplateType::WelcomeLetter,
            now,
        );
        assert_eq!(
            path,
            Path::new("generated_docs/welcome_letter/2026/doe_jane_welcome_letter_20260806_143005.docx")
        );
    }

    #[test]
    fn test_spaces_in_names_become_underscores() {
        let mut s = student();
        s.last_name = "Van Der Berg".to_string();
        let now = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let path = output_path(Path::new("out"), &s, TemplateType::Transcript, now);
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name, "van_der_berg_jane_transcript_20260102_030405.pdf");
    }

    #[test]
    fn test_missing_template_file_is_not_found() {
        let template = Template {
            id: 1,
            template_type: TemplateType::WelcomeLetter,
            file_path: "/nonexistent/welcome.docx".to_string(),
            description: None,
        };
        let err = render_template(
            &template,
            &Context::new(),
            &student(),
            Path::new("generated_docs"),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::TemplateFileMissing(_)));
    }
}
