//! Key-point extraction use case.
//!
//! Delegates to the generative backend when one is configured; any failure there
//! (error, timeout) is treated as "delegate unavailable" and the local heuristic runs instead.

use crate::domain::key_points::{build_prompt, extract_fallback, parse_generated};
use crate::domain::{DomainError, KeywordTable, ReviewText};
use crate::ports::KeyPointGenerator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default budget for a single generative attempt.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

pub struct KeyPointExtractor {
    generator: Option<Arc<dyn KeyPointGenerator>>,
    keywords: Arc<KeywordTable>,
    timeout: Duration,
}

impl KeyPointExtractor {
    /// Create an extractor. `generator = None` means fallback-only mode.
    pub fn new(
        generator: Option<Arc<dyn KeyPointGenerator>>,
        keywords: Arc<KeywordTable>,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            keywords,
            timeout,
        }
    }

    /// Fallback-only extractor with the built-in keyword table.
    pub fn local() -> Self {
        Self::new(
            None,
            Arc::new(KeywordTable::default()),
            DEFAULT_GENERATION_TIMEOUT,
        )
    }

    /// Extract 1–5 key points. Fails only with `InvalidInput` for empty text.
    pub async fn extract(
        &self,
        text: &str,
        product: Option<&str>,
    ) -> Result<Vec<String>, DomainError> {
        let text = ReviewText::new(text)?;

        match self.try_generate(&text, product).await {
            Ok(points) => {
                info!(count = points.len(), "extracted key points (generative)");
                return Ok(points);
            }
            Err(DomainError::DelegateUnavailable(reason)) => {
                warn!(reason = %reason, "key-point delegate unavailable; using local heuristic");
            }
            Err(e) => return Err(e),
        }

        let points = extract_fallback(text.as_str(), product, &self.keywords);
        info!(count = points.len(), "extracted key points (fallback)");
        Ok(points)
    }

    /// Single generative attempt. Every failure maps to `DelegateUnavailable`.
    async fn try_generate(
        &self,
        text: &ReviewText,
        product: Option<&str>,
    ) -> Result<Vec<String>, DomainError> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            DomainError::DelegateUnavailable("no generative backend configured".to_string())
        })?;
        let prompt = build_prompt(text.as_str(), product);

        let response = tokio::time::timeout(self.timeout, generator.generate(&prompt))
            .await
            .map_err(|_| {
                DomainError::DelegateUnavailable(format!(
                    "generation timed out after {}s",
                    self.timeout.as_secs_f32()
                ))
            })?
            .map_err(|e| DomainError::DelegateUnavailable(e.to_string()))?;

        Ok(parse_generated(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockKeyPointGenerator;
    use crate::domain::key_points::NO_KEY_POINTS_SENTINEL;

    const REVIEW: &str = "The battery life is excellent. It arrived late. The box was plain.";

    fn extractor(generator: Option<Arc<dyn KeyPointGenerator>>) -> KeyPointExtractor {
        KeyPointExtractor::new(
            generator,
            Arc::new(KeywordTable::default()),
            Duration::from_millis(200),
        )
    }

    #[tokio::test]
    async fn test_rejects_blank_text() {
        let ex = KeyPointExtractor::local();
        assert!(matches!(
            ex.extract("  \n ", None).await,
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_uses_generator_output() {
        let mock = MockKeyPointGenerator::replying("* Excellent battery\n* Late delivery\n");
        let ex = extractor(Some(Arc::new(mock)));
        let points = ex.extract(REVIEW, Some("Phone")).await.unwrap();
        assert_eq!(points, vec!["Excellent battery", "Late delivery"]);
    }

    #[tokio::test]
    async fn test_degenerate_generator_output_yields_sentinel() {
        let mock = MockKeyPointGenerator::replying("No clear key points found");
        let ex = extractor(Some(Arc::new(mock)));
        let points = ex.extract(REVIEW, None).await.unwrap();
        assert_eq!(points, vec![NO_KEY_POINTS_SENTINEL]);
    }

    #[tokio::test]
    async fn test_generator_error_falls_back() {
        let ex = extractor(Some(Arc::new(MockKeyPointGenerator::failing())));
        let points = ex.extract(REVIEW, None).await.unwrap();
        assert_eq!(points, vec!["The battery life is excellent."]);
    }

    #[tokio::test]
    async fn test_generator_timeout_falls_back() {
        let slow = MockKeyPointGenerator::replying("* never seen").with_delay(5_000);
        let ex = extractor(Some(Arc::new(slow)));
        let points = ex.extract(REVIEW, None).await.unwrap();
        assert_eq!(points, vec!["The battery life is excellent."]);
    }

    #[tokio::test]
    async fn test_fallback_is_idempotent() {
        let ex = extractor(None);
        let first = ex.extract(REVIEW, Some("phone")).await.unwrap();
        let second = ex.extract(REVIEW, Some("phone")).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_prompt_is_sent_verbatim() {
        let mock = Arc::new(MockKeyPointGenerator::replying("* Good sound"));
        let ex = extractor(Some(mock.clone()));
        ex.extract(REVIEW, Some("Headphones")).await.unwrap();
        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains(REVIEW));
        assert!(prompts[0].contains("'Headphones'"));
    }
}
