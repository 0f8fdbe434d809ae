//! Scripted classifier loader for tests and offline development.

use crate::domain::{DomainError, RawPrediction};
use crate::ports::{ClassifierLoader, SentimentClassifier};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// What a loaded mock model does on `classify`.
#[derive(Debug, Clone)]
enum MockBehavior {
    Answer(RawPrediction),
    Fail,
}

struct MockClassifier {
    behavior: MockBehavior,
}

#[async_trait::async_trait]
impl SentimentClassifier for MockClassifier {
    async fn classify(&self, _text: &str) -> Result<RawPrediction, DomainError> {
        match &self.behavior {
            MockBehavior::Answer(prediction) => Ok(prediction.clone()),
            MockBehavior::Fail => Err(DomainError::Classifier("[MOCK] inference failed".into())),
        }
    }
}

/// Loader that knows a fixed set of models. Unknown models fail to load.
#[derive(Default)]
pub struct MockClassifierLoader {
    models: HashMap<String, MockBehavior>,
    load_calls: Mutex<Vec<String>>,
}

impl MockClassifierLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model that always answers `label` with `score`.
    pub fn model(mut self, name: &str, label: &str, score: f64) -> Self {
        self.models.insert(
            name.to_string(),
            MockBehavior::Answer(RawPrediction {
                label: label.to_string(),
                score,
            }),
        );
        self
    }

    /// Register a model that loads but fails every classification.
    pub fn failing_model(mut self, name: &str) -> Self {
        self.models.insert(name.to_string(), MockBehavior::Fail);
        self
    }

    /// Model names passed to `load`, in call order.
    pub fn load_calls(&self) -> Vec<String> {
        self.load_calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ClassifierLoader for MockClassifierLoader {
    async fn load(&self, model: &str) -> Result<Arc<dyn SentimentClassifier>, DomainError> {
        if let Ok(mut calls) = self.load_calls.lock() {
            calls.push(model.to_string());
        }
        // Yield so concurrent callers would interleave here if not serialized.
        tokio::task::yield_now().await;
        let behavior = self.models.get(model).cloned().ok_or_else(|| {
            DomainError::ClassifierUnavailable(format!("[MOCK] unknown model {}", model))
        })?;
        Ok(Arc::new(MockClassifier { behavior }))
    }
}
