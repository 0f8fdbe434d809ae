//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/SQL types here; adapters map into these.

use crate::domain::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum review length (characters, after trimming) accepted for analysis.
pub const REVIEW_MIN_CHARS: usize = 10;
/// Maximum review length (characters) accepted for analysis.
pub const REVIEW_MAX_CHARS: usize = 5000;
/// Maximum product name length (characters).
pub const PRODUCT_NAME_MAX_CHARS: usize = 255;
/// Default and maximum page size when listing reviews.
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Review text with at least one non-whitespace character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewText(String);

impl ReviewText {
    pub fn new(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "review text cannot be empty".to_string(),
            ));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ReviewText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(DomainError::InvalidInput(format!(
                "invalid sentiment '{}': must be positive, negative, or neutral",
                other
            ))),
        }
    }
}

/// Tri-valued sentiment with the backend's confidence in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    pub score: f64,
}

/// Raw output of a classification backend, before label mapping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPrediction {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Pending,
    Processing,
    Completed,
    Partial,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Pending => "pending",
            AnalysisStatus::Processing => "processing",
            AnalysisStatus::Completed => "completed",
            AnalysisStatus::Partial => "partial",
            AnalysisStatus::Failed => "failed",
        }
    }

    /// Parse a stored status. Unknown values read back as `Pending`.
    pub fn parse_lossy(s: &str) -> Self {
        match s {
            "processing" => AnalysisStatus::Processing,
            "completed" => AnalysisStatus::Completed,
            "partial" => AnalysisStatus::Partial,
            "failed" => AnalysisStatus::Failed,
            _ => AnalysisStatus::Pending,
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A review submitted for analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub review_text: String,
    pub product_name: Option<String>,
}

impl NewReview {
    /// Build a validated request. Blank product names become `None`.
    pub fn new(
        review_text: impl Into<String>,
        product_name: Option<String>,
    ) -> Result<Self, DomainError> {
        let review_text = review_text.into();
        let len = review_text.trim().chars().count();
        if len < REVIEW_MIN_CHARS {
            return Err(DomainError::InvalidInput(format!(
                "review text must be at least {} characters",
                REVIEW_MIN_CHARS
            )));
        }
        if review_text.chars().count() > REVIEW_MAX_CHARS {
            return Err(DomainError::InvalidInput(format!(
                "review text must be at most {} characters",
                REVIEW_MAX_CHARS
            )));
        }
        let product_name = product_name
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        if let Some(p) = &product_name {
            if p.chars().count() > PRODUCT_NAME_MAX_CHARS {
                return Err(DomainError::InvalidInput(format!(
                    "product name must be at most {} characters",
                    PRODUCT_NAME_MAX_CHARS
                )));
            }
        }
        Ok(Self {
            review_text,
            product_name,
        })
    }
}

/// A stored review with its analysis results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub review_text: String,
    pub product_name: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub sentiment_score: Option<f64>,
    pub key_points: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub analysis_status: AnalysisStatus,
    pub error_message: Option<String>,
}

/// Pagination and filter for listing reviews. Newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewQuery {
    pub skip: u32,
    pub limit: u32,
    pub sentiment: Option<Sentiment>,
}

impl ReviewQuery {
    /// `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(skip: u32, limit: u32, sentiment: Option<Sentiment>) -> Self {
        Self {
            skip,
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            sentiment,
        }
    }
}

impl Default for ReviewQuery {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE, None)
    }
}

/// One page of reviews plus the total count matching the filter.
#[derive(Debug, Clone)]
pub struct ReviewPage {
    pub total: u64,
    pub reviews: Vec<Review>,
}
