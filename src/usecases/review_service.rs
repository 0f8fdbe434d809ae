//! Review service. Orchestrates analysis of submitted reviews and their storage.
//!
//! Coordinates between repository (data), sentiment analyzer, key-point extractor,
//! and CSV export.

use crate::adapters::export::write_reviews_csv;
use crate::domain::{AnalysisStatus, DomainError, NewReview, Review, ReviewPage, ReviewQuery};
use crate::ports::{AnalysisUpdate, ReviewRepo};
use crate::usecases::{KeyPointExtractor, SentimentAnalyzer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Service for analyzing and managing stored reviews.
///
/// `analyze_review` flow:
/// 1. Store the review with status `processing`
/// 2. Run sentiment analysis (failure recorded, not fatal)
/// 3. Extract key points (failure recorded, not fatal)
/// 4. Persist results with status `completed`, `partial` or `failed`
pub struct ReviewService {
    repo: Arc<dyn ReviewRepo>,
    sentiment: Arc<SentimentAnalyzer>,
    key_points: Arc<KeyPointExtractor>,
}

impl ReviewService {
    pub fn new(
        repo: Arc<dyn ReviewRepo>,
        sentiment: Arc<SentimentAnalyzer>,
        key_points: Arc<KeyPointExtractor>,
    ) -> Self {
        Self {
            repo,
            sentiment,
            key_points,
        }
    }

    /// Analyze and store a new review. Returns the stored record with results.
    pub async fn analyze_review(&self, review: NewReview) -> Result<Review, DomainError> {
        let preview: String = review.review_text.chars().take(50).collect();
        info!(preview = %preview, "analyzing review");

        let stored = self.repo.create(&review).await?;
        let mut update = AnalysisUpdate::default();
        let mut errors: Vec<String> = Vec::new();

        match self.sentiment.analyze(&review.review_text).await {
            Ok(result) => {
                update.sentiment = Some(result.sentiment);
                update.sentiment_score = Some(result.score);
            }
            Err(e) => {
                warn!(id = stored.id, error = %e, "sentiment analysis failed");
                errors.push(format!("Sentiment analysis failed: {}", e));
            }
        }

        match self
            .key_points
            .extract(&review.review_text, review.product_name.as_deref())
            .await
        {
            Ok(points) => update.key_points = Some(points),
            Err(e) => {
                warn!(id = stored.id, error = %e, "key points extraction failed");
                errors.push(format!("Key points extraction failed: {}", e));
            }
        }

        let status = match (update.sentiment.is_some(), update.key_points.is_some()) {
            (true, true) => AnalysisStatus::Completed,
            (false, false) => AnalysisStatus::Failed,
            _ => AnalysisStatus::Partial,
        };
        if !errors.is_empty() {
            update.error_message = Some(errors.join("; "));
        }

        let saved = match self.repo.save_analysis(stored.id, &update, status).await {
            Ok(saved) => saved,
            Err(e) => {
                error!(id = stored.id, error = %e, "failed to persist analysis");
                self.mark_failed(stored.id, &e).await;
                return Err(e);
            }
        };
        info!(id = saved.id, status = %saved.analysis_status, "review analyzed");
        Ok(saved)
    }

    /// Best effort: keep a review from staying `processing` after its results were lost.
    async fn mark_failed(&self, id: i64, cause: &DomainError) {
        let update = AnalysisUpdate {
            error_message: Some(format!("Saving analysis failed: {}", cause)),
            ..AnalysisUpdate::default()
        };
        if let Err(e) = self
            .repo
            .save_analysis(id, &update, AnalysisStatus::Failed)
            .await
        {
            warn!(id, error = %e, "could not mark review as failed");
        }
    }

    pub async fn list_reviews(&self, query: ReviewQuery) -> Result<ReviewPage, DomainError> {
        info!(
            skip = query.skip,
            limit = query.limit,
            sentiment = ?query.sentiment,
            "fetching reviews"
        );
        self.repo.list(&query).await
    }

    pub async fn get_review(&self, id: i64) -> Result<Review, DomainError> {
        self.repo.get(id).await?.ok_or(DomainError::NotFound(id))
    }

    pub async fn delete_review(&self, id: i64) -> Result<(), DomainError> {
        if !self.repo.delete(id).await? {
            return Err(DomainError::NotFound(id));
        }
        info!(id, "review deleted");
        Ok(())
    }

    /// Export all reviews to a CSV file in `dir`. Returns the file path.
    pub async fn export_csv(&self, dir: &Path) -> Result<PathBuf, DomainError> {
        let reviews = self.repo.all().await?;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| DomainError::Export(format!("create export dir: {}", e)))?;
        let filename = format!(
            "reviews_{}.csv",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        let path = dir.join(filename);
        write_reviews_csv(&reviews, &path).await?;
        info!(path = %path.display(), count = reviews.len(), "reviews exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockKeyPointGenerator;
    use crate::adapters::classifier::MockClassifierLoader;
    use crate::adapters::persistence::SqliteReviewRepo;
    use crate::domain::{KeywordTable, Sentiment};
    use std::time::Duration;

    async fn service(
        dir: &Path,
        loader: MockClassifierLoader,
        generator: Option<MockKeyPointGenerator>,
    ) -> ReviewService {
        let repo = Arc::new(SqliteReviewRepo::connect(dir).await.unwrap());
        let keywords = Arc::new(KeywordTable::default());
        let sentiment = Arc::new(SentimentAnalyzer::new(
            Arc::new(loader),
            "primary",
            "secondary",
            Arc::clone(&keywords),
        ));
        let generator = generator.map(|g| Arc::new(g) as Arc<dyn crate::ports::KeyPointGenerator>);
        let key_points = Arc::new(KeyPointExtractor::new(
            generator,
            keywords,
            Duration::from_secs(1),
        ));
        ReviewService::new(repo, sentiment, key_points)
    }

    fn new_review(text: &str) -> NewReview {
        NewReview::new(text, Some("Headphones".to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_review_completed() {
        let dir = tempfile::tempdir().unwrap();
        let loader = MockClassifierLoader::new().model("primary", "5 stars", 0.93);
        let svc = service(
            dir.path(),
            loader,
            Some(MockKeyPointGenerator::replying("- Great sound\n- Comfortable")),
        )
        .await;

        let review = svc
            .analyze_review(new_review("Great sound and very comfortable headphones."))
            .await
            .unwrap();
        assert_eq!(review.analysis_status, AnalysisStatus::Completed);
        assert_eq!(review.sentiment, Some(Sentiment::Positive));
        assert_eq!(review.sentiment_score, Some(0.93));
        assert_eq!(
            review.key_points,
            Some(vec!["Great sound".to_string(), "Comfortable".to_string()])
        );
        assert!(review.error_message.is_none());

        let fetched = svc.get_review(review.id).await.unwrap();
        assert_eq!(fetched.key_points, review.key_points);
    }

    #[tokio::test]
    async fn test_analyze_review_partial_when_classifier_missing() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), MockClassifierLoader::new(), None).await;

        let review = svc
            .analyze_review(new_review(
                "The battery life is excellent. It arrived late. The box was plain.",
            ))
            .await
            .unwrap();
        assert_eq!(review.analysis_status, AnalysisStatus::Partial);
        assert!(review.sentiment.is_none());
        assert_eq!(
            review.key_points,
            Some(vec!["The battery life is excellent.".to_string()])
        );
        let msg = review.error_message.unwrap();
        assert!(msg.starts_with("Sentiment analysis failed:"), "{msg}");
    }

    #[tokio::test]
    async fn test_list_filter_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let loader = MockClassifierLoader::new().model("primary", "4 stars", 0.8);
        let svc = service(dir.path(), loader, None).await;

        let good = svc
            .analyze_review(new_review("Nice headphones with clear sound."))
            .await
            .unwrap();
        let bad = svc
            .analyze_review(new_review("Bad headphones, broke in a week."))
            .await
            .unwrap();
        assert_eq!(bad.sentiment, Some(Sentiment::Negative));

        let negatives = svc
            .list_reviews(ReviewQuery::new(0, 10, Some(Sentiment::Negative)))
            .await
            .unwrap();
        assert_eq!(negatives.total, 1);
        assert_eq!(negatives.reviews[0].id, bad.id);

        svc.delete_review(good.id).await.unwrap();
        assert!(matches!(
            svc.get_review(good.id).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            svc.delete_review(good.id).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_export_csv_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let loader = MockClassifierLoader::new().model("primary", "3 stars", 0.5);
        let svc = service(dir.path(), loader, None).await;
        svc.analyze_review(new_review("Average headphones, nothing special."))
            .await
            .unwrap();

        let path = svc.export_csv(&dir.path().join("exports")).await.unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.starts_with("id;created_at;product;sentiment;score;status;key_points;review"));
        assert!(content.contains("neutral"));
    }

    /// Delegates to SQLite but rejects the first `save_analysis` call.
    struct FailFirstSave {
        inner: SqliteReviewRepo,
        saves: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ReviewRepo for FailFirstSave {
        async fn create(&self, review: &NewReview) -> Result<Review, DomainError> {
            self.inner.create(review).await
        }
        async fn get(&self, id: i64) -> Result<Option<Review>, DomainError> {
            self.inner.get(id).await
        }
        async fn list(&self, query: &ReviewQuery) -> Result<ReviewPage, DomainError> {
            self.inner.list(query).await
        }
        async fn save_analysis(
            &self,
            id: i64,
            update: &AnalysisUpdate,
            status: AnalysisStatus,
        ) -> Result<Review, DomainError> {
            let n = self
                .saves
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n == 0 {
                return Err(DomainError::Repo("disk I/O error".to_string()));
            }
            self.inner.save_analysis(id, update, status).await
        }
        async fn delete(&self, id: i64) -> Result<bool, DomainError> {
            self.inner.delete(id).await
        }
        async fn all(&self) -> Result<Vec<Review>, DomainError> {
            self.inner.all().await
        }
    }

    #[tokio::test]
    async fn test_failed_save_marks_review_failed() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(FailFirstSave {
            inner: SqliteReviewRepo::connect(dir.path()).await.unwrap(),
            saves: std::sync::atomic::AtomicUsize::new(0),
        });
        let keywords = Arc::new(KeywordTable::default());
        let sentiment = Arc::new(SentimentAnalyzer::new(
            Arc::new(MockClassifierLoader::new().model("primary", "5 stars", 0.9)),
            "primary",
            "secondary",
            Arc::clone(&keywords),
        ));
        let key_points = Arc::new(KeyPointExtractor::new(None, keywords, Duration::from_secs(1)));
        let svc = ReviewService::new(repo.clone(), sentiment, key_points);

        let result = svc
            .analyze_review(new_review("Great sound and the battery lasts all week."))
            .await;
        assert!(matches!(result, Err(DomainError::Repo(_))));

        let stored = repo.all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].analysis_status, AnalysisStatus::Failed);
        assert!(
            stored[0]
                .error_message
                .as_deref()
                .unwrap()
                .contains("disk I/O error")
        );
    }
}
