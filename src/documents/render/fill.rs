//! Fill-style rendering: in-place placeholder substitution.
//!
//! Placeholders are `{{KEY}}`; repeating sections are
//! `{{#KEY}}...{{/KEY}}` expanded once per row of a list-valued context
//! entry. DOCX templates are ZIP archives whose `word/document.xml` carries
//! the text; every other archive entry is copied through untouched.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::Value;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use super::{scalar_text, RenderError};
use crate::documents::context::Context;

const DOCUMENT_XML: &str = "word/document.xml";

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").unwrap();
    static ref SECTION: Regex =
        Regex::new(r"(?s)\{\{#\s*([A-Za-z0-9_]+)\s*\}\}(.*?)\{\{/\s*[A-Za-z0-9_]*\s*\}\}").unwrap();
}

/// Substitute sections first, then scalar placeholders. Keys absent from
/// the context render as empty text; lenient on purpose so one stale
/// placeholder does not block a letter.
pub fn substitute(source: &str, ctx: &Context) -> String {
    let expanded = SECTION.replace_all(source, |caps: &Captures<'_>| {
        let key = &caps[1];
        let body = &caps[2];
        match ctx.get(key) {
            Some(Value::Array(rows)) => rows
                .iter()
                .map(|row| expand_row(body, row, ctx))
                .collect::<String>(),
            _ => String::new(),
        }
    });

    PLACEHOLDER
        .replace_all(&expanded, |caps: &Captures<'_>| scalar_text(ctx.get(&caps[1])))
        .into_owned()
}

/// One section iteration: row-map keys shadow the outer context; a scalar
/// row is addressed as `{{item}}`.
fn expand_row(body: &str, row: &Value, outer: &Context) -> String {
    PLACEHOLDER
        .replace_all(body, |caps: &Captures<'_>| {
            let key = &caps[1];
            match row {
                Value::Object(fields) if fields.contains_key(key) => scalar_text(fields.get(key)),
                Value::Object(_) => scalar_text(outer.get(key)),
                scalar if key == "item" => scalar_text(Some(scalar)),
                _ => scalar_text(outer.get(key)),
            }
        })
        .into_owned()
}

/// Fill a DOCX template: rewrite `word/document.xml` through [`substitute`],
/// copy every other entry byte-identical.
pub fn fill_docx(template: &Path, out: &Path, ctx: &Context) -> Result<(), RenderError> {
    let reader = fs::File::open(template).map_err(RenderError::ReadTemplate)?;
    let mut archive = ZipArchive::new(reader)?;

    let mut document_xml = String::new();
    archive
        .by_name(DOCUMENT_XML)?
        .read_to_string(&mut document_xml)
        .map_err(|_| RenderError::MalformedDocumentXml)?;
    let filled = substitute(&document_xml, ctx);

    let writer = fs::File::create(out).map_err(RenderError::WriteOutput)?;
    let mut zip_out = ZipWriter::new(writer);
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i)?;
        if entry.name() == DOCUMENT_XML {
            continue;
        }
        zip_out.raw_copy_file(entry)?;
    }
    zip_out.start_file(DOCUMENT_XML, SimpleFileOptions::default())?;
    zip_out
        .write_all(filled.as_bytes())
        .map_err(RenderError::WriteOutput)?;
    zip_out.finish()?;
    Ok(())
}

/// Same substitution for plain-text templates.
pub fn fill_text(template: &Path, out: &Path, ctx: &Context) -> Result<(), RenderError> {
    let source = fs::read_to_string(template).map_err(RenderError::ReadTemplate)?;
    fs::write(out, substitute(&source, ctx)).map_err(RenderError::WriteOutput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> Context {
        let mut ctx = Context::new();
        ctx.insert("STUDENT_FULLNAME".to_string(), json!("Doe, Jane"));
        ctx.insert("GRADE".to_string(), json!("11"));
        ctx.insert(
            "SELECTED_COURSES".to_string(),
            json!([
                {"COURSE_CODE": "ENG4U", "COURSE_DESCRIPTION": "Grade 12 English."},
                {"COURSE_CODE": "MHF4U", "COURSE_DESCRIPTION": "Advanced Functions."},
            ]),
        );
        ctx.insert("COURSE_LIST".to_string(), json!(["English (ENG4U)"]));
        ctx
    }

    #[test]
    fn test_scalar_substitution_and_lenient_missing_keys() {
        let out = substitute("Dear {{STUDENT_FULLNAME}} ({{UNKNOWN}}), grade {{GRADE}}.", &ctx());
        assert_eq!(out, "Dear Doe, Jane (), grade 11.");
    }

    #[test]
    fn test_section_expansion_over_row_maps() {
        let out = substitute(
            "{{#SELECTED_COURSES}}[{{COURSE_CODE}}: {{COURSE_DESCRIPTION}}]{{/SELECTED_COURSES}}",
            &ctx(),
        );
        assert_eq!(
            out,
            "[ENG4U: Grade 12 English.][MHF4U: Advanced Functions.]"
        );
    }

    #[test]
    fn test_section_expansion_over_scalar_rows() {
        let out = substitute("{{#COURSE_LIST}}{{item}}; {{/COURSE_LIST}}", &ctx());
        assert_eq!(out, "English (ENG4U); ");
    }

    #[test]
    fn test_section_for_missing_key_renders_empty() {
        let out = substitute("a{{#NOPE}}x{{/NOPE}}b", &ctx());
        assert_eq!(out, "ab");
    }

    #[test]
    fn test_outer_context_visible_inside_section() {
        let out = substitute(
            "{{#SELECTED_COURSES}}{{COURSE_CODE}} for {{STUDENT_FULLNAME}} {{/SELECTED_COURSES}}",
            &ctx(),
        );
        assert_eq!(out, "ENG4U for Doe, Jane MHF4U for Doe, Jane ");
    }

    #[test]
    fn test_fill_text_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("letter.txt");
        fs::write(&template, "Welcome {{STUDENT_FULLNAME}}!").unwrap();
        let out = dir.path().join("out.txt");
        fill_text(&template, &out, &ctx()).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "Welcome Doe, Jane!");
    }

    #[test]
    fn test_fill_docx_rewrites_document_xml_only() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("letter.docx");

        // Minimal docx-shaped archive: a content-types entry and the body.
        let file = fs::File::create(&template).unwrap();
        let mut writer = ZipWriter::new(file);
        writer
            .start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<Types/>").unwrap();
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer
            .write_all(b"<w:t>Hello {{STUDENT_FULLNAME}}</w:t>")
            .unwrap();
        writer.finish().unwrap();

        let out = dir.path().join("out.docx");
        fill_docx(&template, &out, &ctx()).unwrap();

        let mut archive = ZipArchive::new(fs::File::open(&out).unwrap()).unwrap();
        let mut body = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "<w:t>Hello Doe, Jane</w:t>");

        let mut types = String::new();
        archive
            .by_name("[Content_Types].xml")
            .unwrap()
            .read_to_string(&mut types)
            .unwrap();
        assert_eq!(types, "<Types/>");
    }
}
