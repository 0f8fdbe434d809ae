//! Bilingual (Indonesian + English) keyword table used by the key-point heuristic
//! and the sentiment override.
//!
//! Treated as data: the built-in table can be replaced by a JSON file with the same shape.

use crate::domain::DomainError;
use serde::{Deserialize, Serialize};
use std::path::Path;

const POSITIVE: &[&str] = &[
    "great", "excellent", "amazing", "love", "best", "good", "nice", "recommend", "happy",
    "perfect", "fantastic", "awesome", "wonderful", "satisfied", "worth", "quality", "fast",
    "quick", "easy",
    // Indonesian
    "bagus", "mantap", "suka", "puas", "keren", "recommended", "banget", "cepat", "mudah",
    "worth it", "oke", "ok", "top", "jos", "mantul",
];

const NEGATIVE: &[&str] = &[
    "bad", "poor", "terrible", "hate", "worst", "disappointed", "broken", "slow", "expensive",
    "waste", "horrible", "awful", "regret", "useless", "cheap", "fake", "defective", "damaged",
    // Indonesian
    "jelek", "kecewa", "rusak", "mahal", "lambat", "bohong", "palsu", "tidak bagus", "buruk",
    "parah", "zonk", "nyesel", "kapok", "gak",
];

const FEATURE: &[&str] = &[
    "battery", "screen", "camera", "design", "quality", "price", "delivery", "shipping", "fast",
    "size", "color", "package", "packaging", "performance", "speed", "material", "build",
    // Indonesian
    "baterai", "layar", "kamera", "desain", "kualitas", "harga", "pengiriman", "ongkir",
    "ukuran", "warna", "kemasan", "packing", "bahan", "model", "fitur",
];

/// Markers that force a `negative` sentiment before the classifier is consulted.
const STRONG_NEGATIVE: &[&str] = &["jelek", "buruk", "bad"];

/// Keyword lists, all lowercase. Matching is case-insensitive substring, no stemming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTable {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub feature: Vec<String>,
    pub strong_negative: Vec<String>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| w.to_string()).collect()
        }
        Self {
            positive: owned(POSITIVE),
            negative: owned(NEGATIVE),
            feature: owned(FEATURE),
            strong_negative: owned(STRONG_NEGATIVE),
        }
    }
}

impl KeywordTable {
    /// Load a table from a JSON file. Entries are lowercased on load.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            DomainError::InvalidInput(format!("read keyword table {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, DomainError> {
        let table: Self = serde_json::from_str(raw)
            .map_err(|e| DomainError::InvalidInput(format!("parse keyword table: {}", e)))?;
        Ok(table.normalized())
    }

    fn normalized(self) -> Self {
        fn lower(words: Vec<String>) -> Vec<String> {
            words
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        }
        Self {
            positive: lower(self.positive),
            negative: lower(self.negative),
            feature: lower(self.feature),
            strong_negative: lower(self.strong_negative),
        }
    }

    /// Positive and negative keywords, in that order.
    pub fn sentiment_keywords(&self) -> impl Iterator<Item = &str> {
        self.positive
            .iter()
            .chain(self.negative.iter())
            .map(String::as_str)
    }

    pub fn feature_keywords(&self) -> impl Iterator<Item = &str> {
        self.feature.iter().map(String::as_str)
    }

    /// First strong-negative marker contained in `lowered`, if any.
    pub fn strong_negative_in(&self, lowered: &str) -> Option<&str> {
        self.strong_negative
            .iter()
            .map(String::as_str)
            .find(|m| lowered.contains(m))
    }
}
