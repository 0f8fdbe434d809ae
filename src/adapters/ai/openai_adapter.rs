//! Key-point generation over a chat-completions endpoint.
//!
//! Works with api.openai.com and local servers that speak the same protocol (Ollama, vLLM).
//! Replies wrapped in markdown fences are unwrapped before parsing.

use crate::domain::DomainError;
use crate::ports::KeyPointGenerator;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Chat-completions generator. Used when no Gemini key is configured.
pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiAdapter {
    /// `api_key` may be empty for local servers; no Authorization header is sent then.
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }

    fn system_prompt() -> &'static str {
        "You extract concise key points from product reviews. \
         Answer with plain lines of text, one key point per line."
    }

    /// LLMs sometimes wrap the bullet list in a markdown code block. This strips it.
    fn strip_code_fence(raw_text: &str) -> String {
        let trimmed = raw_text.trim();
        let Some(rest) = trimmed.strip_prefix("```") else {
            return trimmed.to_string();
        };
        // Drop an optional language tag on the opening fence line.
        let body = match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => rest,
        };
        let body = match body.rfind("```") {
            Some(end) => &body[..end],
            None => body,
        };
        body.trim().to_string()
    }
}

/// OpenAI API request structure.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI API response structure.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: Option<String>,
}

#[async_trait::async_trait]
impl KeyPointGenerator for OpenAiAdapter {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        info!(
            model = %self.model,
            prompt_len = prompt.len(),
            "sending review to AI for key points"
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Self::system_prompt().to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: 0.3,
        };

        let mut req = self.client.post(&self.api_url).json(&request);
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }
        let response = req
            .send()
            .await
            .map_err(|e| DomainError::DelegateUnavailable(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, "AI API returned error");
            return Err(DomainError::DelegateUnavailable(format!(
                "API error {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            DomainError::DelegateUnavailable(format!("Failed to parse API response: {}", e))
        })?;

        let raw_content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                DomainError::DelegateUnavailable("No response choices returned".to_string())
            })?;

        debug!(raw_len = raw_content.len(), "received AI response");
        Ok(Self::strip_code_fence(&raw_content))
    }
}
