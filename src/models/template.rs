//! Document templates and the fixed set of document types.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{normalize_token, ValidationError};

/// How a template is populated: in-place placeholder substitution in an
/// office document, or form-field filling in a fixed-layout PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderBackend {
    Fill,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateType {
    #[serde(rename = "ReportCard")]
    ReportCard,
    #[serde(rename = "Transcript")]
    Transcript,
    #[serde(rename = "FinalTranscript")]
    FinalTranscript,
    #[serde(rename = "PredictedGrades")]
    PredictedGrades,
    #[serde(rename = "LetterOfEnrolment")]
    LetterOfEnrolment,
    #[serde(rename = "LetterOfAcceptance")]
    LetterOfAcceptance,
    #[serde(rename = "WelcomeLetter")]
    WelcomeLetter,
}

impl TemplateType {
    pub const ALL: [TemplateType; 7] = [
        TemplateType::ReportCard,
        TemplateType::Transcript,
        TemplateType::FinalTranscript,
        TemplateType::PredictedGrades,
        TemplateType::LetterOfEnrolment,
        TemplateType::LetterOfAcceptance,
        TemplateType::WelcomeLetter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateType::ReportCard => "ReportCard",
            TemplateType::Transcript => "Transcript",
            TemplateType::FinalTranscript => "FinalTranscript",
            TemplateType::PredictedGrades => "PredictedGrades",
            TemplateType::LetterOfEnrolment => "LetterOfEnrolment",
            TemplateType::LetterOfAcceptance => "LetterOfAcceptance",
            TemplateType::WelcomeLetter => "WelcomeLetter",
        }
    }

    /// Lowercase snake form used in output directories and filenames.
    pub fn slug(self) -> &'static str {
        match self {
            TemplateType::ReportCard => "report_card",
            TemplateType::Transcript => "transcript",
            TemplateType::FinalTranscript => "final_transcript",
            TemplateType::PredictedGrades => "predicted_grades",
            TemplateType::LetterOfEnrolment => "letter_of_enrolment",
            TemplateType::LetterOfAcceptance => "letter_of_acceptance",
            TemplateType::WelcomeLetter => "welcome_letter",
        }
    }

    pub fn backend(self) -> RenderBackend {
        match self {
            TemplateType::ReportCard
            | TemplateType::Transcript
            | TemplateType::FinalTranscript => RenderBackend::Form,
            TemplateType::PredictedGrades
            | TemplateType::LetterOfEnrolment
            | TemplateType::LetterOfAcceptance
            | TemplateType::WelcomeLetter => RenderBackend::Fill,
        }
    }

    /// Extension of the intermediate rendered artifact, before any
    /// best-effort conversion.
    pub fn rendered_ext(self) -> &'static str {
        match self.backend() {
            RenderBackend::Fill => "docx",
            RenderBackend::Form => "pdf",
        }
    }
}

impl FromStr for TemplateType {
    type Err = ValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let tpl = match normalize_token(raw).as_str() {
            "REPORT_CARD" | "REPORTCARD" => TemplateType::ReportCard,
            "TRANSCRIPT" => TemplateType::Transcript,
            "FINAL_TRANSCRIPT" | "FINALTRANSCRIPT" => TemplateType::FinalTranscript,
            "PREDICTED_GRADES" | "PREDICTEDGRADES" => TemplateType::PredictedGrades,
            "LETTER_OF_ENROLMENT" | "LETTEROFENROLMENT" => TemplateType::LetterOfEnrolment,
            "LETTER_OF_ACCEPTANCE" | "LETTEROFACCEPTANCE" => TemplateType::LetterOfAcceptance,
            "WELCOME_LETTER" | "WELCOMELETTER" => TemplateType::WelcomeLetter,
            _ => {
                return Err(ValidationError::InvalidEnum {
                    field: "template_type",
                    value: raw.to_string(),
                    expected: "template type",
                })
            }
        };
        Ok(tpl)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    pub template_type: TemplateType,
    pub file_path: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_accepts_wire_and_name_forms() {
        assert_eq!(
            "WelcomeLetter".parse::<TemplateType>().unwrap(),
            TemplateType::WelcomeLetter
        );
        assert_eq!(
            "report_card".parse::<TemplateType>().unwrap(),
            TemplateType::ReportCard
        );
        assert!("Diploma".parse::<TemplateType>().is_err());
    }

    #[test]
    fn test_backend_split() {
        assert_eq!(TemplateType::Transcript.backend(), RenderBackend::Form);
        assert_eq!(TemplateType::WelcomeLetter.backend(), RenderBackend::Fill);
    }

    #[test]
    fn test_slug() {
        assert_eq!(TemplateType::WelcomeLetter.slug(), "welcome_letter");
        assert_eq!(TemplateType::LetterOfEnrolment.slug(), "letter_of_enrolment");
    }
}
