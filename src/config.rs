//! Environment-driven configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// School identity printed on report cards and transcripts. Injected
/// configuration so a different school can swap it without code changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub fax: String,
    pub board: String,
    pub board_number: String,
    pub website: String,
    pub bsid: String,
    pub school_number: String,
    pub principal: String,
}

impl Default for SchoolInfo {
    fn default() -> Self {
        Self {
            name: "Emerald Valley Academy".to_string(),
            address: "170 Sheppard Ave E, North York, ON M2N 3A4".to_string(),
            phone: "+1 437-268-6158".to_string(),
            fax: String::new(),
            board: "Private School".to_string(),
            board_number: String::new(),
            website: "https://evaschool.ca/".to_string(),
            bsid: "BSID: 887678".to_string(),
            school_number: "887678".to_string(),
            principal: "Eric Tran".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root of the generated-files area.
    pub generated_root: PathBuf,
    pub soffice_bin: String,
    pub pdftoppm_bin: String,
    pub img2pdf_bin: String,
    /// Upper bound on every external conversion subprocess.
    pub convert_timeout: Duration,
    pub school: SchoolInfo,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generated_root: PathBuf::from("generated_docs"),
            soffice_bin: "soffice".to_string(),
            pdftoppm_bin: "pdftoppm".to_string(),
            img2pdf_bin: "img2pdf".to_string(),
            convert_timeout: Duration::from_secs(60),
            school: SchoolInfo::default(),
        }
    }
}

impl AppConfig {
    /// Read overrides from the environment (and a `.env` file when present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        let timeout_secs = env::var("OSSD_CONVERT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.convert_timeout.as_secs());

        Self {
            generated_root: env::var("OSSD_GENERATED_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.generated_root),
            soffice_bin: env::var("OSSD_SOFFICE_BIN").unwrap_or(defaults.soffice_bin),
            pdftoppm_bin: env::var("OSSD_PDFTOPPM_BIN").unwrap_or(defaults.pdftoppm_bin),
            img2pdf_bin: env::var("OSSD_IMG2PDF_BIN").unwrap_or(defaults.img2pdf_bin),
            convert_timeout: Duration::from_secs(timeout_secs),
            school: defaults.school,
        }
    }

    pub fn with_generated_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.generated_root = root.into();
        self
    }
}
