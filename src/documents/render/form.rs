//! Form-style rendering: AcroForm field filling for fixed-layout PDFs.

use std::path::Path;

use lopdf::{Document, Object, ObjectId};
use serde_json::Value;

use super::{scalar_text, RenderError};
use crate::documents::context::Context;

/// Load the template PDF, set the value of every form field whose name
/// appears in the context, and save the filled copy. Fields the context
/// does not mention keep their existing value.
pub fn fill_pdf_form(template: &Path, out: &Path, ctx: &Context) -> Result<(), RenderError> {
    let mut doc = Document::load(template)?;

    let mut filled = 0usize;
    for (_, object) in doc.objects.iter_mut() {
        let Object::Dictionary(dict) = object else {
            continue;
        };
        let name = match dict.get(b"T") {
            Ok(Object::String(bytes, _)) => String::from_utf8_lossy(bytes).into_owned(),
            _ => continue,
        };
        let Some(value) = ctx.get(&name) else {
            continue;
        };
        if matches!(value, Value::Array(_) | Value::Object(_)) {
            continue;
        }
        dict.set("V", Object::string_literal(scalar_text(Some(value))));
        // Stale appearance streams would keep showing the old value.
        dict.remove(b"AP");
        filled += 1;
    }

    set_need_appearances(&mut doc)?;
    doc.save(out).map_err(RenderError::WriteOutput)?;
    log::debug!("filled {filled} form fields in {}", out.display());
    Ok(())
}

/// Ask viewers to regenerate field appearances after the value change. The
/// AcroForm dictionary may be inline in the catalog or referenced.
fn set_need_appearances(doc: &mut Document) -> Result<(), lopdf::Error> {
    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;

    let form_ref: Option<ObjectId> = {
        let catalog = doc.get_object(catalog_id)?.as_dict()?;
        match catalog.get(b"AcroForm") {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        }
    };

    match form_ref {
        Some(id) => {
            if let Ok(form) = doc.get_object_mut(id).and_then(Object::as_dict_mut) {
                form.set("NeedAppearances", Object::Boolean(true));
            }
        }
        None => {
            if let Ok(catalog) = doc.get_object_mut(catalog_id).and_then(Object::as_dict_mut) {
                if let Ok(Object::Dictionary(form)) = catalog.get_mut(b"AcroForm") {
                    form.set("NeedAppearances", Object::Boolean(true));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;
    use serde_json::json;

    fn form_template(path: &Path, field_names: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let mut field_ids = Vec::new();
        for name in field_names {
            let id = doc.add_object(dictionary! {
                "FT" => "Tx",
                "T" => Object::string_literal(*name),
            });
            field_ids.push(Object::Reference(id));
        }
        let form_id = doc.add_object(dictionary! { "Fields" => field_ids });
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
            "AcroForm" => form_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_fields_filled_from_context() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("transcript.pdf");
        form_template(&template, &["lastName", "totalcr", "untouched"]);

        let mut ctx = Context::new();
        ctx.insert("lastName".to_string(), json!("Doe"));
        ctx.insert("totalcr".to_string(), json!("21"));
        ctx.insert("RC_COURSES".to_string(), json!([{"ignored": true}]));

        let out = dir.path().join("filled.pdf");
        fill_pdf_form(&template, &out, &ctx).unwrap();

        let doc = Document::load(&out).unwrap();
        let mut values = Vec::new();
        for (_, object) in doc.objects.iter() {
            if let Object::Dictionary(dict) = object {
                if let Ok(Object::String(name, _)) = dict.get(b"T") {
                    let value = match dict.get(b"V") {
                        Ok(Object::String(v, _)) => Some(String::from_utf8_lossy(v).into_owned()),
                        _ => None,
                    };
                    values.push((String::from_utf8_lossy(name).into_owned(), value));
                }
            }
        }
        values.sort();
        assert_eq!(
            values,
            vec![
                ("lastName".to_string(), Some("Doe".to_string())),
                ("totalcr".to_string(), Some("21".to_string())),
                ("untouched".to_string(), None),
            ]
        );
    }
}
