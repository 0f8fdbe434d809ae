//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Empty/whitespace review text or a request that fails validation. Always surfaced.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generative key-point backend unreachable or returned unusable output.
    /// Recovered locally by the fallback heuristic; never surfaced by the extractor.
    #[error("Key-point delegate unavailable: {0}")]
    DelegateUnavailable(String),

    /// Neither the primary nor the secondary sentiment backend could be loaded.
    #[error("Sentiment classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// A loaded classifier failed on a single call.
    #[error("Sentiment classification failed: {0}")]
    Classifier(String),

    #[error("Repository error: {0}")]
    Repo(String),

    #[error("Review {0} not found")]
    NotFound(i64),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("UI error: {0}")]
    Ui(String),
}
