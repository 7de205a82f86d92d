//! Best-effort format conversion through external tools.
//!
//! Both conversions degrade gracefully: a failed or timed-out subprocess
//! logs a warning and the caller keeps the unconverted artifact. Conversion
//! never fails a generation job.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::config::AppConfig;

/// Injected conversion capability so tests can run without LibreOffice or
/// poppler installed.
pub trait Converter: Send + Sync {
    /// Convert a rendered DOCX to PDF. `None` means the conversion did not
    /// produce a usable file and the DOCX stands.
    fn docx_to_pdf(&self, docx: &Path) -> Option<PathBuf>;

    /// Flatten a filled form PDF into a raster-backed, non-editable PDF.
    /// Returns the input path unchanged when flattening is unavailable.
    fn flatten_pdf(&self, pdf: &Path) -> PathBuf;
}

/// Production converter delegating to LibreOffice and the poppler/img2pdf
/// toolchain, each bounded by the configured timeout.
pub struct ExternalConverter {
    soffice_bin: String,
    pdftoppm_bin: String,
    img2pdf_bin: String,
    timeout: Duration,
}

impl ExternalConverter {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            soffice_bin: config.soffice_bin.clone(),
            pdftoppm_bin: config.pdftoppm_bin.clone(),
            img2pdf_bin: config.img2pdf_bin.clone(),
            timeout: config.convert_timeout,
        }
    }

    /// Run a command to completion within the timeout; the child is killed
    /// on expiry so a hung tool cannot pin the request thread forever.
    fn run(&self, mut command: Command, what: &str) -> bool {
        command.stdout(Stdio::null()).stderr(Stdio::null());
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                log::warn!("{what}: failed to spawn: {e}");
                return false;
            }
        };
        match child.wait_timeout(self.timeout) {
            Ok(Some(status)) if status.success() => true,
            Ok(Some(status)) => {
                log::warn!("{what}: exited with {status}");
                false
            }
            Ok(None) => {
                log::warn!("{what}: timed out after {:?}, killing", self.timeout);
                let _ = child.kill();
                let _ = child.wait();
                false
            }
            Err(e) => {
                log::warn!("{what}: wait failed: {e}");
                false
            }
        }
    }
}

impl Converter for ExternalConverter {
    fn docx_to_pdf(&self, docx: &Path) -> Option<PathBuf> {
        let out_dir = docx.parent()?;
        let mut command = Command::new(&self.soffice_bin);
        command
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir)
            .arg(docx);
        if !self.run(command, "docx to pdf conversion") {
            return None;
        }
        let pdf = docx.with_extension("pdf");
        if pdf.is_file() {
            Some(pdf)
        } else {
            log::warn!("soffice reported success but {} is missing", pdf.display());
            None
        }
    }

    fn flatten_pdf(&self, pdf: &Path) -> PathBuf {
        match self.try_flatten(pdf) {
            Ok(()) => pdf.to_path_buf(),
            Err(reason) => {
                log::warn!("pdf flatten skipped for {}: {reason}", pdf.display());
                pdf.to_path_buf()
            }
        }
    }
}

impl ExternalConverter {
    /// Two stages: rasterize each page to PNG, then reassemble the pages
    /// into a PDF that replaces the editable original in place.
    fn try_flatten(&self, pdf: &Path) -> Result<(), String> {
        let work_dir = tempfile::tempdir().map_err(|e| format!("temp dir: {e}"))?;
        let page_prefix = work_dir.path().join("page");

        let mut rasterize = Command::new(&self.pdftoppm_bin);
        rasterize
            .arg("-r")
            .arg("150")
            .arg("-png")
            .arg(pdf)
            .arg(&page_prefix);
        if !self.run(rasterize, "pdf rasterization") {
            return Err("rasterization failed".to_string());
        }

        let mut pages: Vec<PathBuf> = fs::read_dir(work_dir.path())
            .map_err(|e| format!("list pages: {e}"))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        if pages.is_empty() {
            return Err("rasterization produced no pages".to_string());
        }
        pages.sort();

        let flattened = work_dir.path().join("flattened.pdf");
        let mut reassemble = Command::new(&self.img2pdf_bin);
        reassemble.args(&pages).arg("-o").arg(&flattened);
        if !self.run(reassemble, "pdf reassembly") {
            return Err("reassembly failed".to_string());
        }

        fs::copy(&flattened, pdf).map_err(|e| format!("replace original: {e}"))?;
        Ok(())
    }
}

/// Converter that leaves every artifact as rendered.
pub struct NoopConverter;

impl Converter for NoopConverter {
    fn docx_to_pdf(&self, _docx: &Path) -> Option<PathBuf> {
        None
    }

    fn flatten_pdf(&self, pdf: &Path) -> PathBuf {
        pdf.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converter(timeout_secs: u64) -> ExternalConverter {
        let config = AppConfig {
            soffice_bin: "definitely-not-a-real-binary".to_string(),
            pdftoppm_bin: "definitely-not-a-real-binary".to_string(),
            img2pdf_bin: "definitely-not-a-real-binary".to_string(),
            convert_timeout: Duration::from_secs(timeout_secs),
            ..AppConfig::default()
        };
        ExternalConverter::new(&config)
    }

    #[test]
    fn test_missing_tool_degrades_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let docx = dir.path().join("letter.docx");
        fs::write(&docx, b"stub").unwrap();
        assert_eq!(converter(5).docx_to_pdf(&docx), None);
    }

    #[test]
    fn test_flatten_failure_returns_input_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("transcript.pdf");
        fs::write(&pdf, b"%PDF-1.5 stub").unwrap();
        let result = converter(5).flatten_pdf(&pdf);
        assert_eq!(result, pdf);
        assert_eq!(fs::read(&pdf).unwrap(), b"%PDF-1.5 stub");
    }

    #[test]
    fn test_noop_converter() {
        let pdf = Path::new("a/b.pdf");
        assert_eq!(NoopConverter.docx_to_pdf(Path::new("a/b.docx")), None);
        assert_eq!(NoopConverter.flatten_pdf(pdf), pdf);
    }
}
