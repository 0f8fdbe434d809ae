//! Google Gemini adapter for key-point generation.
//!
//! Calls the Generative Language `generateContent` endpoint. The API key travels in the
//! `x-goog-api-key` header and is never logged.

use crate::domain::DomainError;
use crate::ports::KeyPointGenerator;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiAdapter {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiAdapter {
    /// Create a new Gemini adapter.
    ///
    /// # Arguments
    /// * `api_base` - API root (e.g., "https://generativelanguage.googleapis.com/v1beta")
    /// * `api_key` - Google AI Studio API key
    /// * `model` - Model name (e.g., "gemini-1.5-flash")
    pub fn new(api_base: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[async_trait::async_trait]
impl KeyPointGenerator for GeminiAdapter {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        info!(
            model = %self.model,
            prompt_len = prompt.len(),
            "sending review to Gemini for key points"
        );

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                max_output_tokens: 512,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::DelegateUnavailable(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body: GenerateResponse = if status.is_success() {
            response.json().await.map_err(|e| {
                DomainError::DelegateUnavailable(format!("Failed to parse Gemini response: {}", e))
            })?
        } else {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Gemini API returned error");
            return Err(DomainError::DelegateUnavailable(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        };

        if let Some(err) = body.error {
            return Err(DomainError::DelegateUnavailable(format!(
                "Gemini error: {}",
                err.message
            )));
        }

        let text = body
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .map(|parts| {
                parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                DomainError::DelegateUnavailable("Gemini returned no candidates".to_string())
            })?;

        debug!(response_len = text.len(), "received Gemini response");
        Ok(text.trim().to_string())
    }
}
