//! Error types for trial-compliance
//!
//! Clear error messages with actionable guidance. Rate computations and date
//! classification never produce errors; these variants cover record
//! construction, record tables, and the document-analysis boundary.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// trial-compliance error types
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied input that cannot be processed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Trial record violates a structural invariant
    #[error("Invalid trial record {id}: {reason}")]
    InvalidRecord {
        /// Record identifier
        id: String,
        /// What was wrong with it
        reason: String,
    },

    /// Date text is not a `YYYY-MM-DD` calendar date
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Record table error (Parquet/Arrow schema or content)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Document analysis attempted without an API key
    #[error("API key not configured for document analysis\nSet it on AnalyzerConfig (or API_KEY via AnalyzerConfig::from_env)")]
    MissingCredentials,

    /// Transport or remote service failure
    #[error("Analysis backend error: {0}")]
    Backend(String),

    /// Remote service returned no content
    #[error("No response from analysis service")]
    EmptyResponse,

    /// Remote response did not match the fixed analysis schema
    #[error("Malformed analysis response: {0}")]
    MalformedResponse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow/Parquet error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
