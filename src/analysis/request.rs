//! Generate-content request sent to the analysis service

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

use super::DocumentInput;

/// Instruction sent ahead of every document.
pub const EXTRACTION_PROMPT: &str = "Analyze the provided clinical trial document (abstract or full PDF paper). \
Your goal is to extract the Trial Registration Number (TRN) if present, and any dates related to \
'enrollment start' or 'trial registration'.\n\
If this is a full paper, look specifically in the Methods, Design, or footnote sections for \
registration details.\n\
Return the response in JSON format.";

/// Response media type requested from the service.
pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// One content part of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPart {
    /// Plain text
    Text(String),
    /// Binary document, transported inline
    InlineData {
        /// Declared media type (e.g. `application/pdf`)
        media_type: String,
        /// Raw bytes, base64-encoded by [`GenerateRequest::to_wire_json`]
        data: Vec<u8>,
    },
}

/// A single-shot structured extraction request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    model: String,
    parts: Vec<RequestPart>,
    response_schema: Value,
}

impl GenerateRequest {
    /// Build the extraction request for a document.
    ///
    /// The first part is always [`EXTRACTION_PROMPT`]; the second carries the
    /// document, either as quoted text or as inline binary data.
    #[must_use]
    pub fn for_document(model: impl Into<String>, input: &DocumentInput) -> Self {
        let document = match input {
            DocumentInput::Text(text) => RequestPart::Text(format!("Text Content:\n\"{text}\"")),
            DocumentInput::Binary { bytes, media_type } => RequestPart::InlineData {
                media_type: media_type.clone(),
                data: bytes.clone(),
            },
        };

        Self {
            model: model.into(),
            parts: vec![RequestPart::Text(EXTRACTION_PROMPT.to_string()), document],
            response_schema: response_schema(),
        }
    }

    /// Get the model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the content parts in order.
    #[must_use]
    pub fn parts(&self) -> &[RequestPart] {
        &self.parts
    }

    /// Response media type to request.
    #[must_use]
    pub const fn response_mime_type(&self) -> &'static str {
        RESPONSE_MIME_TYPE
    }

    /// JSON schema the response must follow.
    #[must_use]
    pub const fn response_schema(&self) -> &Value {
        &self.response_schema
    }

    /// Request body for the `generateContent` REST call.
    ///
    /// Inline binary parts are base64-encoded; the model is not part of the
    /// body, it is addressed by the URL.
    #[must_use]
    pub fn to_wire_json(&self) -> Value {
        let parts: Vec<Value> = self
            .parts
            .iter()
            .map(|part| match part {
                RequestPart::Text(text) => json!({ "text": text }),
                RequestPart::InlineData { media_type, data } => json!({
                    "inlineData": {
                        "mimeType": media_type,
                        "data": STANDARD.encode(data),
                    }
                }),
            })
            .collect();

        json!({
            "contents": [{ "parts": parts }],
            "generationConfig": {
                "responseMimeType": self.response_mime_type(),
                "responseSchema": self.response_schema,
            }
        })
    }
}

/// Structured-output schema for the extraction response.
#[must_use]
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "hasTRN": { "type": "BOOLEAN" },
            "trn": {
                "type": "STRING",
                "description": "The alphanumeric trial registration number (e.g., NCT01234567, ISRCTN12345678). Null if not found."
            },
            "enrollmentMentioned": {
                "type": "BOOLEAN",
                "description": "Does the text mention when participant enrollment started?"
            },
            "registrationMentioned": {
                "type": "BOOLEAN",
                "description": "Does the text mention when the trial was registered?"
            },
            "extractedDates": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of any specific dates (YYYY-MM-DD or Month Year) found related to study timeline."
            },
            "analysis": {
                "type": "STRING",
                "description": "A brief 1-sentence summary of the registration status found."
            }
        }
    })
}
