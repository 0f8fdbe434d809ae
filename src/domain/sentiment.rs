//! Sentiment rules applied around the external classifier: input truncation,
//! the strong-negative override and raw label mapping.

use crate::domain::{KeywordTable, Sentiment, SentimentResult};

/// Model input limit, in characters.
pub const MAX_CLASSIFIER_CHARS: usize = 4000;
/// Confidence reported when the override fires.
pub const OVERRIDE_SCORE: f64 = 0.99;

/// Cut `text` to at most `MAX_CLASSIFIER_CHARS` characters (on a char boundary).
pub fn truncate_for_model(text: &str) -> &str {
    match text.char_indices().nth(MAX_CLASSIFIER_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Force `negative` when the text contains a strong-negative marker.
///
/// Plain substring match: "not bad" also triggers it.
pub fn manual_override(text: &str, keywords: &KeywordTable) -> Option<SentimentResult> {
    let lowered = text.to_lowercase();
    keywords
        .strong_negative_in(&lowered)
        .map(|_| SentimentResult {
            sentiment: Sentiment::Negative,
            score: OVERRIDE_SCORE,
        })
}

/// Star rating encoded in labels like "1 star" / "4 stars".
fn star_rating(label: &str) -> Option<u8> {
    let mut parts = label.split_whitespace();
    let stars: u8 = parts.next()?.parse().ok()?;
    let unit = parts.next()?;
    if parts.next().is_some() || !unit.starts_with("star") || !(1..=5).contains(&stars) {
        return None;
    }
    Some(stars)
}

/// Map a backend label onto the tri-valued sentiment.
pub fn map_label(label: &str) -> Sentiment {
    let label = label.trim().to_lowercase();
    if let Some(stars) = star_rating(&label) {
        return match stars {
            1 | 2 => Sentiment::Negative,
            3 => Sentiment::Neutral,
            _ => Sentiment::Positive,
        };
    }
    if label.contains("positive") || matches!(label.as_str(), "pos" | "label_2" | "2") {
        Sentiment::Positive
    } else if label.contains("negative") || matches!(label.as_str(), "neg" | "label_0" | "0") {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}
