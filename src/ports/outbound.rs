//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    AnalysisStatus, DomainError, NewReview, RawPrediction, Review, ReviewPage, ReviewQuery,
    Sentiment,
};
use std::sync::Arc;

/// Generative backend for key points. One attempt per call, no retry.
#[async_trait::async_trait]
pub trait KeyPointGenerator: Send + Sync {
    /// Send `prompt` and return the raw generated text.
    async fn generate(&self, prompt: &str) -> Result<String, DomainError>;
}

/// A loaded sentiment classification backend. Safe for concurrent calls.
#[async_trait::async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify `text`, returning the top label and its confidence.
    async fn classify(&self, text: &str) -> Result<RawPrediction, DomainError>;
}

/// Acquires a classifier for a model name. Called at most once per model per process.
#[async_trait::async_trait]
pub trait ClassifierLoader: Send + Sync {
    async fn load(&self, model: &str) -> Result<Arc<dyn SentimentClassifier>, DomainError>;
}

/// Analysis results written back onto a stored review.
#[derive(Debug, Clone, Default)]
pub struct AnalysisUpdate {
    pub sentiment: Option<Sentiment>,
    pub sentiment_score: Option<f64>,
    pub key_points: Option<Vec<String>>,
    pub error_message: Option<String>,
}

/// Review store keyed by integer id.
#[async_trait::async_trait]
pub trait ReviewRepo: Send + Sync {
    /// Insert a review with status `processing`. Returns the stored record.
    async fn create(&self, review: &NewReview) -> Result<Review, DomainError>;

    async fn get(&self, id: i64) -> Result<Option<Review>, DomainError>;

    /// Newest first, filtered by sentiment, paged by `skip`/`limit`.
    async fn list(&self, query: &ReviewQuery) -> Result<ReviewPage, DomainError>;

    /// Persist analysis results and status. Returns the updated record.
    async fn save_analysis(
        &self,
        id: i64,
        update: &AnalysisUpdate,
        status: AnalysisStatus,
    ) -> Result<Review, DomainError>;

    /// Returns `false` when no review had that id.
    async fn delete(&self, id: i64) -> Result<bool, DomainError>;

    /// Every review, newest first (for export).
    async fn all(&self) -> Result<Vec<Review>, DomainError>;
}
