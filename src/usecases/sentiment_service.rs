//! Sentiment analysis use case.
//!
//! Wraps an external classifier: loads it lazily (primary model, then a secondary
//! fallback model), applies the strong-negative override, and maps raw labels.

use crate::domain::sentiment::{manual_override, map_label, truncate_for_model};
use crate::domain::{DomainError, KeywordTable, ReviewText, SentimentResult};
use crate::ports::{ClassifierLoader, SentimentClassifier};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub const DEFAULT_PRIMARY_MODEL: &str = "nlptown/bert-base-multilingual-uncased-sentiment";
pub const DEFAULT_SECONDARY_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";

/// Backend lifecycle. `Ready` and `Failed` are terminal.
enum BackendState {
    Uninitialized,
    Ready(Arc<dyn SentimentClassifier>),
    Failed(String),
}

pub struct SentimentAnalyzer {
    loader: Arc<dyn ClassifierLoader>,
    primary_model: String,
    secondary_model: String,
    keywords: Arc<KeywordTable>,
    /// Held across the load so concurrent first calls load once.
    state: Mutex<BackendState>,
}

impl SentimentAnalyzer {
    pub fn new(
        loader: Arc<dyn ClassifierLoader>,
        primary_model: impl Into<String>,
        secondary_model: impl Into<String>,
        keywords: Arc<KeywordTable>,
    ) -> Self {
        Self {
            loader,
            primary_model: primary_model.into(),
            secondary_model: secondary_model.into(),
            keywords,
            state: Mutex::new(BackendState::Uninitialized),
        }
    }

    /// Classify `text` into positive/negative/neutral with a confidence score.
    pub async fn analyze(&self, text: &str) -> Result<SentimentResult, DomainError> {
        let text = ReviewText::new(text)?;
        let classifier = self.backend().await?;

        let text = truncate_for_model(text.as_str());

        if let Some(result) = manual_override(text, &self.keywords) {
            info!(
                sentiment = %result.sentiment,
                score = result.score,
                "manual override: strong negative marker"
            );
            return Ok(result);
        }

        let raw = classifier.classify(text).await.map_err(|e| {
            error!(error = %e, "sentiment classification failed");
            e
        })?;
        let result = SentimentResult {
            sentiment: map_label(&raw.label),
            score: raw.score,
        };
        info!(
            label = %raw.label,
            sentiment = %result.sentiment,
            score = result.score,
            "sentiment analysis result"
        );
        Ok(result)
    }

    /// Returns the shared backend, loading it on first use.
    async fn backend(&self) -> Result<Arc<dyn SentimentClassifier>, DomainError> {
        let mut state = self.state.lock().await;
        match &*state {
            BackendState::Ready(classifier) => return Ok(Arc::clone(classifier)),
            BackendState::Failed(reason) => {
                return Err(DomainError::ClassifierUnavailable(reason.clone()));
            }
            BackendState::Uninitialized => {}
        }

        match self.load_with_fallback().await {
            Ok(classifier) => {
                *state = BackendState::Ready(Arc::clone(&classifier));
                Ok(classifier)
            }
            Err(reason) => {
                *state = BackendState::Failed(reason.clone());
                Err(DomainError::ClassifierUnavailable(reason))
            }
        }
    }

    async fn load_with_fallback(&self) -> Result<Arc<dyn SentimentClassifier>, String> {
        info!(model = %self.primary_model, "loading sentiment model");
        let primary_err = match self.loader.load(&self.primary_model).await {
            Ok(classifier) => {
                info!(model = %self.primary_model, "sentiment model loaded");
                return Ok(classifier);
            }
            Err(e) => e,
        };
        warn!(
            model = %self.primary_model,
            error = %primary_err,
            "failed to load sentiment model; trying fallback"
        );

        match self.loader.load(&self.secondary_model).await {
            Ok(classifier) => {
                info!(model = %self.secondary_model, "fallback sentiment model loaded");
                Ok(classifier)
            }
            Err(fallback_err) => {
                error!(
                    model = %self.secondary_model,
                    error = %fallback_err,
                    "failed to load fallback sentiment model"
                );
                Err(format!(
                    "{}: {}; {}: {}",
                    self.primary_model, primary_err, self.secondary_model, fallback_err
                ))
            }
        }
    }
}
