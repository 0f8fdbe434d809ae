//! Mock key-point generator for testing without API calls.
//!
//! Returns a canned response (or a canned failure) and records every prompt it receives.

use crate::domain::DomainError;
use crate::ports::KeyPointGenerator;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

/// Mock generator for tests and offline development.
///
/// Simulates network latency with a configurable delay.
pub struct MockKeyPointGenerator {
    reply: Option<String>,
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
    prompts: Mutex<Vec<String>>,
}

impl MockKeyPointGenerator {
    /// Generator that always answers with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            delay_ms: 0,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Generator that always fails, as if the service were unreachable.
    pub fn failing() -> Self {
        Self {
            reply: None,
            delay_ms: 0,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Prompts received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl KeyPointGenerator for MockKeyPointGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        info!(prompt_len = prompt.len(), "[MOCK] Simulating key-point generation");
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        self.reply
            .clone()
            .ok_or_else(|| DomainError::DelegateUnavailable("[MOCK] service unreachable".into()))
    }
}
