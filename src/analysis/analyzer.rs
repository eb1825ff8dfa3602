//! Document analyzer and its transport seam

use std::future::Future;

use tracing::{debug, instrument, warn};

use super::{AnalyzerConfig, DocumentAnalysis, DocumentInput, GenerateRequest};
use crate::{Error, Result};

/// Transport to the generative-AI service.
///
/// Implementations send the request ([`HttpBackend`](super::HttpBackend),
/// recorded fixture, test double) and return the raw text of the model's
/// answer. They must not
/// retry; the analyzer makes exactly one call per document.
pub trait AnalysisBackend: Send + Sync {
    /// Send one generate-content request and return the response text.
    fn generate(
        &self,
        config: &AnalyzerConfig,
        request: &GenerateRequest,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Extracts registration metadata from documents via an [`AnalysisBackend`].
#[derive(Debug)]
pub struct DocumentAnalyzer<B> {
    config: AnalyzerConfig,
    backend: B,
}

impl<B: AnalysisBackend> DocumentAnalyzer<B> {
    /// Create an analyzer with explicit configuration and transport.
    #[must_use]
    pub const fn new(config: AnalyzerConfig, backend: B) -> Self {
        Self { config, backend }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Get the transport.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Analyze a document, reporting failures as errors.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingCredentials`] if no API key is configured
    /// - [`Error::InvalidInput`] for an empty document
    /// - any transport error from the backend
    /// - [`Error::EmptyResponse`] / [`Error::MalformedResponse`] if the answer
    ///   does not match the analysis schema
    #[instrument(skip_all, fields(model = %self.config.model()))]
    pub async fn try_analyze(&self, input: DocumentInput) -> Result<DocumentAnalysis> {
        if self.config.api_key().is_none() {
            return Err(Error::MissingCredentials);
        }
        input.validate()?;

        let request = GenerateRequest::for_document(self.config.model(), &input);
        let text = self.backend.generate(&self.config, &request).await?;
        let analysis = DocumentAnalysis::from_response_text(&text)?;

        debug!(has_trn = analysis.has_trn, "document analyzed");
        Ok(analysis)
    }

    /// Analyze a document, returning [`DocumentAnalysis::fallback`] on any failure.
    ///
    /// The fallback is indistinguishable from the service's own answer shape;
    /// use [`analyze_reported`](Self::analyze_reported) or
    /// [`try_analyze`](Self::try_analyze) when the cause must be shown.
    pub async fn analyze(&self, input: DocumentInput) -> DocumentAnalysis {
        self.analyze_reported(input).await.0
    }

    /// Analyze a document, returning the result (fallback on failure) together
    /// with the error that caused the fallback, if any.
    pub async fn analyze_reported(&self, input: DocumentInput) -> (DocumentAnalysis, Option<Error>) {
        match self.try_analyze(input).await {
            Ok(analysis) => (analysis, None),
            Err(error) => {
                warn!(%error, "document analysis failed, using fallback");
                (DocumentAnalysis::fallback(), Some(error))
            }
        }
    }
}
