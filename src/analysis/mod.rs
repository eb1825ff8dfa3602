//! Document analysis: extract registration metadata from a paper
//!
//! A document (pasted abstract text or a PDF) is sent to an external
//! generative-AI service which answers with a fixed JSON shape. The service
//! is a best-effort collaborator: one attempt, no retry, and any failure is
//! turned into [`DocumentAnalysis::fallback`].
//!
//! ```text
//! DocumentInput ──> GenerateRequest ──> AnalysisBackend (HttpBackend or a double)
//!                                              │ raw JSON text
//!                                              v
//!                          DocumentAnalysis::from_response_text
//!                                              │
//!                          Ok(analysis) | Err ──> fallback + error channel
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use trial_compliance::analysis::{
//!     AnalysisBackend, AnalyzerConfig, DocumentAnalyzer, DocumentInput, GenerateRequest,
//! };
//!
//! struct Canned;
//!
//! impl AnalysisBackend for Canned {
//!     async fn generate(
//!         &self,
//!         _config: &AnalyzerConfig,
//!         _request: &GenerateRequest,
//!     ) -> trial_compliance::Result<String> {
//!         Ok(r#"{"hasTRN":true,"trn":"NCT01234567","enrollmentMentioned":false,
//!                "registrationMentioned":true,"extractedDates":[],"analysis":"Registered."}"#
//!             .to_string())
//!     }
//! }
//!
//! # async fn example() {
//! let analyzer = DocumentAnalyzer::new(AnalyzerConfig::new("key"), Canned);
//! let result = analyzer.analyze(DocumentInput::text("Registered as NCT01234567.")).await;
//! assert_eq!(result.trn.as_deref(), Some("NCT01234567"));
//! # }
//! ```

mod analyzer;
mod config;
mod http;
pub mod request;

pub use analyzer::{AnalysisBackend, DocumentAnalyzer};
pub use http::{HttpBackend, API_KEY_HEADER};
pub use config::{AnalyzerConfig, API_KEY_ENV, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use request::{GenerateRequest, RequestPart};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Media type for PDF documents.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Analysis text returned when the service could not be used.
pub const FALLBACK_ANALYSIS: &str = "Failed to analyze document due to an error.";

/// A document to analyze: either pasted text or a binary file, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
    /// Pasted abstract or paper text
    Text(String),
    /// Binary document with its declared media type
    Binary {
        /// Raw file contents
        bytes: Vec<u8>,
        /// Declared media type
        media_type: String,
    },
}

impl DocumentInput {
    /// Text input.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// PDF input.
    #[must_use]
    pub fn pdf(bytes: Vec<u8>) -> Self {
        Self::Binary {
            bytes,
            media_type: PDF_MEDIA_TYPE.to_string(),
        }
    }

    /// Check the input carries something to analyze.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for blank text, empty bytes, or a
    /// blank media type.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Text(text) if text.trim().is_empty() => {
                Err(Error::InvalidInput("document text is empty".to_string()))
            }
            Self::Binary { bytes, .. } if bytes.is_empty() => {
                Err(Error::InvalidInput("document file is empty".to_string()))
            }
            Self::Binary { media_type, .. } if media_type.trim().is_empty() => {
                Err(Error::InvalidInput("document media type is missing".to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Registration metadata extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    /// Whether a Trial Registration Number was found
    #[serde(rename = "hasTRN")]
    pub has_trn: bool,
    /// The registration number, if found
    pub trn: Option<String>,
    /// Whether the document states when enrollment started
    pub enrollment_mentioned: bool,
    /// Whether the document states when the trial was registered
    pub registration_mentioned: bool,
    /// Timeline dates found (`YYYY-MM-DD` or `Month Year`)
    pub extracted_dates: Vec<String>,
    /// One-sentence summary of the registration status
    pub analysis: String,
}

/// Wire shape of a service response before normalization.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    #[serde(rename = "hasTRN")]
    has_trn: bool,
    #[serde(default)]
    trn: Option<String>,
    enrollment_mentioned: bool,
    registration_mentioned: bool,
    #[serde(default)]
    extracted_dates: Vec<String>,
    analysis: String,
}

impl DocumentAnalysis {
    /// The fixed value returned for any analysis failure.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            has_trn: false,
            trn: None,
            enrollment_mentioned: false,
            registration_mentioned: false,
            extracted_dates: Vec::new(),
            analysis: FALLBACK_ANALYSIS.to_string(),
        }
    }

    /// Validate and normalize the service's JSON answer.
    ///
    /// A surrounding Markdown code fence is tolerated. A blank `trn` becomes
    /// `None`, and `trn` is dropped when `hasTRN` is false.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyResponse`] for blank text and
    /// [`Error::MalformedResponse`] if the JSON does not match the schema.
    pub fn from_response_text(text: &str) -> Result<Self> {
        let body = strip_code_fence(text);
        if body.is_empty() {
            return Err(Error::EmptyResponse);
        }

        let raw: RawAnalysis =
            serde_json::from_str(body).map_err(|e| Error::MalformedResponse(e.to_string()))?;

        let trn = raw
            .trn
            .map(|trn| trn.trim().to_string())
            .filter(|trn| raw.has_trn && !trn.is_empty());

        Ok(Self {
            has_trn: raw.has_trn,
            trn,
            enrollment_mentioned: raw.enrollment_mentioned,
            registration_mentioned: raw.registration_mentioned,
            extracted_dates: raw.extracted_dates,
            analysis: raw.analysis,
        })
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_shape() {
        let json = serde_json::to_value(DocumentAnalysis::fallback()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "hasTRN": false,
                "trn": null,
                "enrollmentMentioned": false,
                "registrationMentioned": false,
                "extractedDates": [],
                "analysis": "Failed to analyze document due to an error."
            })
        );
    }

    #[test]
    fn test_input_validation() {
        assert!(DocumentInput::text("  \n").validate().is_err());
        assert!(DocumentInput::pdf(Vec::new()).validate().is_err());
        assert!(DocumentInput::Binary {
            bytes: vec![1],
            media_type: String::new()
        }
        .validate()
        .is_err());
        assert!(DocumentInput::text("NCT01234567").validate().is_ok());
        assert!(DocumentInput::pdf(vec![1, 2, 3]).validate().is_ok());
    }

    #[test]
    fn test_parse_full_response() {
        let analysis = DocumentAnalysis::from_response_text(
            r#"{"hasTRN":true,"trn":"ISRCTN12345678","enrollmentMentioned":true,
                "registrationMentioned":true,"extractedDates":["2016-03-01","May 2016"],
                "analysis":"Registered retrospectively."}"#,
        )
        .unwrap();
        assert!(analysis.has_trn);
        assert_eq!(analysis.trn.as_deref(), Some("ISRCTN12345678"));
        assert_eq!(analysis.extracted_dates.len(), 2);
    }

    #[test]
    fn test_normalizes_trn() {
        let blank = DocumentAnalysis::from_response_text(
            r#"{"hasTRN":true,"trn":"  ","enrollmentMentioned":false,
                "registrationMentioned":false,"analysis":"x"}"#,
        )
        .unwrap();
        assert_eq!(blank.trn, None);
        assert!(blank.extracted_dates.is_empty());

        let contradictory = DocumentAnalysis::from_response_text(
            r#"{"hasTRN":false,"trn":"NCT0","enrollmentMentioned":false,
                "registrationMentioned":false,"extractedDates":[],"analysis":"x"}"#,
        )
        .unwrap();
        assert_eq!(contradictory.trn, None);
    }

    #[test]
    fn test_code_fence_tolerated() {
        let text = "```json\n{\"hasTRN\":false,\"trn\":null,\"enrollmentMentioned\":false,\
                    \"registrationMentioned\":false,\"extractedDates\":[],\"analysis\":\"none\"}\n```";
        let analysis = DocumentAnalysis::from_response_text(text).unwrap();
        assert_eq!(analysis.analysis, "none");
    }

    #[test]
    fn test_rejects_nonconforming_response() {
        let missing = DocumentAnalysis::from_response_text(r#"{"hasTRN":true}"#);
        assert!(matches!(missing, Err(Error::MalformedResponse(_))));

        let wrong_type = DocumentAnalysis::from_response_text(
            r#"{"hasTRN":"yes","enrollmentMentioned":false,
                "registrationMentioned":false,"analysis":"x"}"#,
        );
        assert!(matches!(wrong_type, Err(Error::MalformedResponse(_))));

        assert!(matches!(
            DocumentAnalysis::from_response_text("   "),
            Err(Error::EmptyResponse)
        ));
    }
}
