//! HTTP transport for the generative-language `generateContent` API

use serde::Deserialize;
use tracing::debug;

use super::{AnalysisBackend, AnalyzerConfig, GenerateRequest};
use crate::{Error, Result};

/// Header carrying the API key (kept out of the URL so it never shows up in
/// transport error messages).
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// [`AnalysisBackend`] that posts requests to
/// [`AnalyzerConfig::generate_content_url`].
///
/// One POST per call, no retry. Non-2xx answers become [`Error::Backend`];
/// the model's text is the concatenated text parts of the first candidate.
#[derive(Debug, Clone, Default)]
pub struct HttpBackend {
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a backend with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend around a preconfigured client (timeouts, proxy).
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl AnalysisBackend for HttpBackend {
    async fn generate(&self, config: &AnalyzerConfig, request: &GenerateRequest) -> Result<String> {
        let api_key = config.api_key().ok_or(Error::MissingCredentials)?;
        let url = config.generate_content_url();
        debug!(%url, parts = request.parts().len(), "posting generate-content request");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&request.to_wire_json())
            .send()
            .await
            .map_err(|e| Error::Backend(format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Backend(format!("Failed to read response body: {e}")))?;
        if !status.is_success() {
            return Err(Error::Backend(format!("HTTP {status}: {}", body.trim())));
        }

        response_text(&body)
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// Model text from a `generateContent` response envelope.
///
/// A well-formed envelope without candidates yields an empty string, which
/// the analyzer reports as [`Error::EmptyResponse`].
fn response_text(body: &str) -> Result<String> {
    let envelope: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| Error::MalformedResponse(format!("unexpected response envelope: {e}")))?;

    Ok(envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default())
}
