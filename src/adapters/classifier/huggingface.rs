//! Hugging Face Inference API adapter for sentiment classification.
//!
//! `HuggingFaceLoader` implements `ClassifierLoader`: it "loads" a model by probing its
//! inference endpoint once; the returned `HuggingFaceClassifier` is shared for all calls.

use crate::domain::{DomainError, RawPrediction};
use crate::ports::{ClassifierLoader, SentimentClassifier};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const HF_INFERENCE_BASE: &str = "https://api-inference.huggingface.co/models";

/// Default per-request budget. `wait_for_model` can hold a request while a cold model spins up.
pub const DEFAULT_HF_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Short input used to check that a model answers before it is put into service.
const PROBE_TEXT: &str = "This product is good.";

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
    options: RequestOptions,
}

#[derive(Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

/// The API returns `[[{label, score}, ...]]` for a single input; some deployments
/// return the flat `[{label, score}, ...]` form.
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<RawPrediction>>),
    Flat(Vec<RawPrediction>),
}

impl ClassifyResponse {
    fn top(self) -> Option<RawPrediction> {
        let predictions = match self {
            ClassifyResponse::Nested(outer) => outer.into_iter().next().unwrap_or_default(),
            ClassifyResponse::Flat(flat) => flat,
        };
        predictions
            .into_iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

pub struct HuggingFaceClassifier {
    client: reqwest::Client,
    model: String,
    url: String,
    api_key: Option<String>,
}

impl HuggingFaceClassifier {
    fn new(client: reqwest::Client, api_base: &str, api_key: Option<String>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            url: format!("{}/{}", api_base.trim_end_matches('/'), model),
            api_key,
        }
    }
}

#[async_trait::async_trait]
impl SentimentClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<RawPrediction, DomainError> {
        debug!(model = %self.model, text_len = text.len(), "classifying text");
        let request = ClassifyRequest {
            inputs: text,
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        let mut req = self.client.post(&self.url).json(&request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let response = req
            .send()
            .await
            .map_err(|e| DomainError::Classifier(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(model = %self.model, status = %status, "classifier API returned error");
            return Err(DomainError::Classifier(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Classifier(format!("Failed to parse response: {}", e)))?;

        body.top()
            .ok_or_else(|| DomainError::Classifier("classifier returned no labels".to_string()))
    }
}

/// Creates Hugging Face classifiers, probing each model once.
pub struct HuggingFaceLoader {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

impl HuggingFaceLoader {
    /// `api_key = None` uses the anonymous (rate-limited) tier. `timeout` bounds every
    /// request, including the load probe, so a stalled model fails over instead of hanging.
    pub fn new(
        api_base: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| DomainError::ClassifierUnavailable(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_base,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }
}

#[async_trait::async_trait]
impl ClassifierLoader for HuggingFaceLoader {
    async fn load(&self, model: &str) -> Result<Arc<dyn SentimentClassifier>, DomainError> {
        let classifier =
            HuggingFaceClassifier::new(self.client.clone(), &self.api_base, self.api_key.clone(), model);
        let probe = classifier
            .classify(PROBE_TEXT)
            .await
            .map_err(|e| DomainError::ClassifierUnavailable(format!("{}: {}", model, e)))?;
        info!(model, probe_label = %probe.label, "classifier endpoint ready");
        Ok(Arc::new(classifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_top_prediction_from_nested() {
        let raw = r#"[[{"label":"1 star","score":0.1},{"label":"5 stars","score":0.7},{"label":"4 stars","score":0.2}]]"#;
        let parsed: ClassifyResponse = serde_json::from_str(raw).unwrap();
        let top = parsed.top().unwrap();
        assert_eq!(top.label, "5 stars");
        assert_eq!(top.score, 0.7);
    }

    #[test]
    fn test_top_prediction_from_flat() {
        let raw = r#"[{"label":"NEGATIVE","score":0.9},{"label":"POSITIVE","score":0.1}]"#;
        let parsed: ClassifyResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.top().unwrap().label, "NEGATIVE");
    }

    #[tokio::test]
    async fn test_load_and_classify() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/nlptown/bert-base-multilingual-uncased-sentiment"))
            .and(header("Authorization", "Bearer hf-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[
                { "label": "4 stars", "score": 0.61 },
                { "label": "5 stars", "score": 0.30 }
            ]])))
            .mount(&server)
            .await;

        let loader =
            HuggingFaceLoader::new(server.uri(), Some("hf-test".to_string()), TEST_TIMEOUT)
                .unwrap();
        let classifier = loader
            .load("nlptown/bert-base-multilingual-uncased-sentiment")
            .await
            .unwrap();
        let prediction = classifier.classify("Pretty good overall").await.unwrap();
        assert_eq!(prediction.label, "4 stars");
        assert_eq!(prediction.score, 0.61);
    }

    #[tokio::test]
    async fn test_load_fails_when_model_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Model not found"))
            .mount(&server)
            .await;

        let loader = HuggingFaceLoader::new(server.uri(), None, TEST_TIMEOUT).unwrap();
        assert!(matches!(
            loader.load("missing/model").await,
            Err(DomainError::ClassifierUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_stalled_model_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([[{ "label": "5 stars", "score": 0.9 }]]))
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let loader =
            HuggingFaceLoader::new(server.uri(), None, Duration::from_millis(300)).unwrap();
        let started = std::time::Instant::now();
        let result = loader.load("slow/model").await;
        assert!(matches!(result, Err(DomainError::ClassifierUnavailable(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
