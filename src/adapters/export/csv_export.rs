//! CSV export of stored reviews. Uses the `csv` crate for safe serialization.
//!
//! Format: `id;created_at;product;sentiment;score;status;key_points;review`
//! (semicolon-delimited; key points joined with " | ").

use crate::domain::{DomainError, Review};
use std::path::Path;

const HEADER: [&str; 8] = [
    "id",
    "created_at",
    "product",
    "sentiment",
    "score",
    "status",
    "key_points",
    "review",
];

/// Convert reviews to a CSV string with a header row.
pub fn reviews_to_csv(reviews: &[Review]) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(Vec::new());

    wtr.write_record(HEADER)?;

    for review in reviews {
        let created = review.created_at.format("%Y-%m-%d %H:%M").to_string();
        let sentiment = review
            .sentiment
            .map(|s| s.as_str().to_string())
            .unwrap_or_default();
        let score = review
            .sentiment_score
            .map(|s| format!("{:.4}", s))
            .unwrap_or_default();
        let key_points = review
            .key_points
            .as_ref()
            .map(|p| p.join(" | "))
            .unwrap_or_default();
        // Newlines replaced for spreadsheet readability; csv handles quoting.
        let text = review.review_text.replace('\n', " ").replace('\r', "");

        wtr.write_record([
            review.id.to_string().as_str(),
            created.as_str(),
            review.product_name.as_deref().unwrap_or(""),
            sentiment.as_str(),
            score.as_str(),
            review.analysis_status.as_str(),
            key_points.as_str(),
            text.as_str(),
        ])?;
    }

    wtr.flush()?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))?;

    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })
}

/// Serialize `reviews` and write them to `path`.
pub async fn write_reviews_csv(reviews: &[Review], path: &Path) -> Result<(), DomainError> {
    let content = reviews_to_csv(reviews).map_err(|e| DomainError::Export(e.to_string()))?;
    tokio::fs::write(path, content)
        .await
        .map_err(|e| DomainError::Export(format!("write {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisStatus, Sentiment};
    use chrono::{TimeZone, Utc};

    fn review(text: &str) -> Review {
        Review {
            id: 7,
            review_text: text.to_string(),
            product_name: Some("Kettle".to_string()),
            sentiment: Some(Sentiment::Positive),
            sentiment_score: Some(0.87654),
            key_points: Some(vec!["Boils fast".to_string(), "Looks nice".to_string()]),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
            updated_at: None,
            analysis_status: AnalysisStatus::Completed,
            error_message: None,
        }
    }

    #[test]
    fn test_reviews_to_csv_basic() {
        let csv = reviews_to_csv(&[review("Boils fast and looks nice")]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id;created_at;product;sentiment;score;status;key_points;review"
        );
        assert_eq!(
            lines.next().unwrap(),
            "7;2024-01-01 09:30;Kettle;positive;0.8765;completed;Boils fast | Looks nice;Boils fast and looks nice"
        );
    }

    #[test]
    fn test_reviews_to_csv_special_chars() {
        let csv = reviews_to_csv(&[review("Nice; with \"quotes\" and\nnewlines")]).unwrap();
        assert!(csv.contains("\"Nice; with \"\"quotes\"\" and newlines\""));
    }

    #[test]
    fn test_reviews_to_csv_empty() {
        let csv = reviews_to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
