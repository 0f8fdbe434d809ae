//! Application configuration. API credentials, model names, paths.

use crate::adapters::ai::gemini_adapter::{DEFAULT_GEMINI_MODEL, GEMINI_API_BASE};
use crate::adapters::ai::openai_adapter::{DEFAULT_OPENAI_MODEL, DEFAULT_OPENAI_URL};
use crate::adapters::classifier::huggingface::{DEFAULT_HF_TIMEOUT_SECS, HF_INFERENCE_BASE};
use crate::usecases::sentiment_service::{DEFAULT_PRIMARY_MODEL, DEFAULT_SECONDARY_MODEL};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-attempt budget for the generative key-point backend.
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;

/// Which generative backend to use for key points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorChoice {
    Gemini { api_key: String, model: String, api_base: String },
    OpenAi { api_key: String, model: String, api_url: String },
    /// No credentials: key points come from the local heuristic only.
    None,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory for reviews.db and exports. Read from REVIEW_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Optional JSON keyword table replacing the built-in one. Read from REVIEW_KEYWORDS_PATH.
    #[serde(default)]
    pub keywords_path: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Key-point generation
    // ─────────────────────────────────────────────────────────────────────────
    /// Gemini API key. Read from REVIEW_GEMINI_API_KEY or GEMINI_API_KEY.
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    /// Gemini model. Defaults to "gemini-1.5-flash". Read from REVIEW_GEMINI_MODEL.
    #[serde(default)]
    pub gemini_model: Option<String>,

    /// Gemini API root. Read from REVIEW_GEMINI_API_BASE.
    #[serde(default)]
    pub gemini_api_base: Option<String>,

    /// OpenAI-compatible API key, used when no Gemini key is set. Read from REVIEW_AI_API_KEY.
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// OpenAI-compatible chat completions URL. Read from REVIEW_AI_API_URL.
    #[serde(default)]
    pub ai_api_url: Option<String>,

    /// OpenAI-compatible model. Defaults to "gpt-4o-mini". Read from REVIEW_AI_MODEL.
    #[serde(default)]
    pub ai_model: Option<String>,

    /// Timeout in seconds for one generation attempt (default 30). Read from REVIEW_AI_TIMEOUT_SECS.
    #[serde(default)]
    pub ai_timeout_secs: Option<u64>,

    // ─────────────────────────────────────────────────────────────────────────
    // Sentiment classification
    // ─────────────────────────────────────────────────────────────────────────
    /// Hugging Face token. Read from REVIEW_HUGGINGFACE_API_KEY or HUGGINGFACE_API_KEY.
    #[serde(default)]
    pub huggingface_api_key: Option<String>,

    /// Inference API root. Read from REVIEW_HF_API_URL.
    #[serde(default)]
    pub hf_api_url: Option<String>,

    /// Timeout in seconds for one classifier request (default 60). Read from REVIEW_HF_TIMEOUT_SECS.
    #[serde(default)]
    pub hf_timeout_secs: Option<u64>,

    /// Primary classifier model. Read from REVIEW_SENTIMENT_MODEL.
    #[serde(default)]
    pub sentiment_model: Option<String>,

    /// Secondary classifier model. Read from REVIEW_SENTIMENT_FALLBACK_MODEL.
    #[serde(default)]
    pub sentiment_fallback_model: Option<String>,
}

/// Treat empty keys and template placeholders ("your_...") as unset.
fn usable_key(key: Option<&String>) -> Option<String> {
    key.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && !k.starts_with("your_"))
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("REVIEW"));
        if let Ok(path) = std::env::var("REVIEW_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // Unprefixed provider variables are accepted so an existing .env keeps working.
        if cfg.gemini_api_key.is_none() {
            cfg.gemini_api_key = std::env::var("GEMINI_API_KEY").ok();
        }
        if cfg.huggingface_api_key.is_none() {
            cfg.huggingface_api_key = std::env::var("HUGGINGFACE_API_KEY").ok();
        }
        Ok(cfg)
    }

    /// Returns the data directory. Defaults to "./data".
    pub fn data_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or("./data"))
    }

    pub fn keywords_path(&self) -> Option<PathBuf> {
        self.keywords_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    }

    /// Returns the generation timeout. Defaults to 30s.
    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs.unwrap_or(DEFAULT_AI_TIMEOUT_SECS))
    }

    /// Gemini first, then an OpenAI-compatible API (key or custom URL), else local-only.
    pub fn generator_choice(&self) -> GeneratorChoice {
        if let Some(api_key) = usable_key(self.gemini_api_key.as_ref()) {
            return GeneratorChoice::Gemini {
                api_key,
                model: self
                    .gemini_model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                api_base: self
                    .gemini_api_base
                    .clone()
                    .unwrap_or_else(|| GEMINI_API_BASE.to_string()),
            };
        }
        // A custom URL alone is enough: local servers (Ollama, vLLM) take no key.
        let api_key = usable_key(self.ai_api_key.as_ref());
        let api_url = self
            .ai_api_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());
        if api_key.is_some() || api_url.is_some() {
            return GeneratorChoice::OpenAi {
                api_key: api_key.unwrap_or_default(),
                model: self
                    .ai_model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                api_url: api_url.unwrap_or(DEFAULT_OPENAI_URL).to_string(),
            };
        }
        GeneratorChoice::None
    }

    pub fn huggingface_api_key(&self) -> Option<String> {
        usable_key(self.huggingface_api_key.as_ref())
    }

    pub fn hf_api_url_or_default(&self) -> String {
        self.hf_api_url
            .clone()
            .unwrap_or_else(|| HF_INFERENCE_BASE.to_string())
    }

    /// Returns the classifier request timeout. Defaults to 60s.
    pub fn hf_timeout(&self) -> Duration {
        Duration::from_secs(self.hf_timeout_secs.unwrap_or(DEFAULT_HF_TIMEOUT_SECS))
    }

    pub fn sentiment_model_or_default(&self) -> String {
        self.sentiment_model
            .clone()
            .unwrap_or_else(|| DEFAULT_PRIMARY_MODEL.to_string())
    }

    pub fn sentiment_fallback_model_or_default(&self) -> String {
        self.sentiment_fallback_model
            .clone()
            .unwrap_or_else(|| DEFAULT_SECONDARY_MODEL.to_string())
    }
}
