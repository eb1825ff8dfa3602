//! Analyzer configuration
//!
//! Credentials and endpoint are explicit values handed to the analyzer at
//! construction. Nothing in the call path reads the process environment.

use std::fmt;

/// Environment variable read by [`AnalyzerConfig::from_env`].
pub const API_KEY_ENV: &str = "API_KEY";

/// Default model used for document extraction.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Default generative-language API base URL.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the document-analysis service.
#[derive(Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl AnalyzerConfig {
    /// Create a configuration with the given API key and default model/endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Create a configuration with no API key.
    ///
    /// Every analysis attempted with it fails with
    /// [`Error::MissingCredentials`](crate::Error::MissingCredentials).
    #[must_use]
    pub fn without_credentials() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Build a configuration from the `API_KEY` environment variable.
    ///
    /// A missing variable yields a configuration without credentials rather
    /// than an error, so the failure surfaces when analysis is attempted.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(API_KEY_ENV).map_or_else(|_| Self::without_credentials(), Self::new)
    }

    /// Override the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL (e.g. a local test server).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// The API key, if one is configured and non-blank.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    /// Get the model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the API base URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full `generateContent` URL for the configured model.
    #[must_use]
    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("api_key", &self.api_key().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::new("secret");
        assert_eq!(config.api_key(), Some("secret"));
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_blank_key_is_no_key() {
        assert_eq!(AnalyzerConfig::new("   ").api_key(), None);
        assert_eq!(AnalyzerConfig::without_credentials().api_key(), None);
    }

    #[test]
    fn test_generate_content_url() {
        let config = AnalyzerConfig::new("k")
            .with_endpoint("http://localhost:8080/")
            .with_model("test-model");
        assert_eq!(
            config.generate_content_url(),
            "http://localhost:8080/models/test-model:generateContent"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", AnalyzerConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
