//! SQLite-backed review store via libsql. Implements ReviewRepo.
//!
//! Single `reviews` table keyed by an autoincrement id; key points are stored as a JSON array.
//! Database file: <data_dir>/reviews.db

use crate::domain::{AnalysisStatus, DomainError, NewReview, Review, ReviewPage, ReviewQuery};
use crate::ports::{AnalysisUpdate, ReviewRepo};
use chrono::{DateTime, Utc};
use libsql::{Connection, Database, Row, params};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const REVIEWS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    review_text TEXT NOT NULL,
    product_name TEXT,
    sentiment TEXT,
    sentiment_score REAL,
    key_points_json TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER,
    analysis_status TEXT NOT NULL DEFAULT 'pending',
    error_message TEXT
)"#;
const REVIEWS_CREATED_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_reviews_created ON reviews (created_at DESC)";
const REVIEWS_SENTIMENT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_reviews_sentiment ON reviews (sentiment)";

const SELECT_COLUMNS: &str = "id, review_text, product_name, sentiment, sentiment_score, \
     key_points_json, created_at, updated_at, analysis_status, error_message";

fn repo_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Repo(e.to_string())
}

/// SQLite review repository. One database file (reviews.db) in the given base directory.
pub struct SqliteReviewRepo {
    db: Database,
    db_path: PathBuf,
}

impl SqliteReviewRepo {
    /// Connect to (or create) the SQLite database and ensure the schema exists.
    /// Call this once at startup; the returned repo is safe to share via Arc.
    ///
    /// Sets WAL mode and synchronous=NORMAL for concurrent read/write.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(repo_err)?;
        let db_path = base.join("reviews.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(repo_err)?;
        let conn = db.connect().map_err(repo_err)?;

        // PRAGMA returns a row; use query and drain (execute fails when rows are returned).
        for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
            let mut rows = conn
                .query(pragma, ())
                .await
                .map_err(|e| DomainError::Repo(format!("{} failed: {}", pragma, e)))?;
            while rows.next().await.map_err(repo_err)?.is_some() {}
        }

        conn.execute(REVIEWS_TABLE, ()).await.map_err(repo_err)?;
        conn.execute(REVIEWS_CREATED_INDEX, ())
            .await
            .map_err(repo_err)?;
        conn.execute(REVIEWS_SENTIMENT_INDEX, ())
            .await
            .map_err(repo_err)?;

        info!(path = %db_path.display(), "SQLite review store connected (WAL)");

        Ok(Self { db, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<Connection, DomainError> {
        self.db.connect().map_err(repo_err)
    }

    fn now_millis() -> i64 {
        Utc::now().timestamp_millis()
    }

    fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_default()
    }

    fn key_points_to_json(points: &Option<Vec<String>>) -> Option<String> {
        points.as_ref().and_then(|p| serde_json::to_string(p).ok())
    }

    fn json_to_key_points(s: Option<&str>) -> Option<Vec<String>> {
        s.and_then(|s| serde_json::from_str(s).ok())
    }

    fn row_to_review(row: &Row) -> Result<Review, DomainError> {
        let id: i64 = row.get(0).map_err(repo_err)?;
        let review_text: String = row.get(1).map_err(repo_err)?;
        let product_name: Option<String> = row.get::<String>(2).ok();
        let sentiment = row
            .get::<String>(3)
            .ok()
            .and_then(|s| s.parse().ok());
        let sentiment_score: Option<f64> = row.get::<f64>(4).ok();
        let key_points_json: Option<String> = row.get::<String>(5).ok();
        let created_at: i64 = row.get(6).map_err(repo_err)?;
        let updated_at: Option<i64> = row.get::<i64>(7).ok();
        let status: String = row.get::<String>(8).unwrap_or_default();
        let error_message: Option<String> = row.get::<String>(9).ok();

        Ok(Review {
            id,
            review_text,
            product_name,
            sentiment,
            sentiment_score,
            key_points: Self::json_to_key_points(key_points_json.as_deref()),
            created_at: Self::millis_to_datetime(created_at),
            updated_at: updated_at.map(Self::millis_to_datetime),
            analysis_status: AnalysisStatus::parse_lossy(&status),
            error_message,
        })
    }

    async fn collect_reviews(mut rows: libsql::Rows) -> Result<Vec<Review>, DomainError> {
        let mut reviews = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            reviews.push(Self::row_to_review(&row)?);
        }
        Ok(reviews)
    }
}

#[async_trait::async_trait]
impl ReviewRepo for SqliteReviewRepo {
    async fn create(&self, review: &NewReview) -> Result<Review, DomainError> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO reviews (review_text, product_name, created_at, analysis_status)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                review.review_text.as_str(),
                review.product_name.clone(),
                Self::now_millis(),
                AnalysisStatus::Processing.as_str()
            ],
        )
        .await
        .map_err(repo_err)?;
        let id = conn.last_insert_rowid();
        debug!(id, "review stored");

        self.get(id)
            .await?
            .ok_or_else(|| DomainError::Repo(format!("review {} vanished after insert", id)))
    }

    async fn get(&self, id: i64) -> Result<Option<Review>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                &format!("SELECT {} FROM reviews WHERE id = ?1", SELECT_COLUMNS),
                params![id],
            )
            .await
            .map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => Ok(Some(Self::row_to_review(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, query: &ReviewQuery) -> Result<ReviewPage, DomainError> {
        let conn = self.conn()?;
        let limit = i64::from(query.limit);
        let skip = i64::from(query.skip);

        let (total, rows) = match query.sentiment {
            Some(sentiment) => {
                let mut count_rows = conn
                    .query(
                        "SELECT COUNT(*) FROM reviews WHERE sentiment = ?1",
                        params![sentiment.as_str()],
                    )
                    .await
                    .map_err(repo_err)?;
                let total = match count_rows.next().await.map_err(repo_err)? {
                    Some(row) => row.get::<i64>(0).map_err(repo_err)?,
                    None => 0,
                };
                let rows = conn
                    .query(
                        &format!(
                            "SELECT {} FROM reviews WHERE sentiment = ?1 \
                             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
                            SELECT_COLUMNS
                        ),
                        params![sentiment.as_str(), limit, skip],
                    )
                    .await
                    .map_err(repo_err)?;
                (total, rows)
            }
            None => {
                let mut count_rows = conn
                    .query("SELECT COUNT(*) FROM reviews", ())
                    .await
                    .map_err(repo_err)?;
                let total = match count_rows.next().await.map_err(repo_err)? {
                    Some(row) => row.get::<i64>(0).map_err(repo_err)?,
                    None => 0,
                };
                let rows = conn
                    .query(
                        &format!(
                            "SELECT {} FROM reviews \
                             ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
                            SELECT_COLUMNS
                        ),
                        params![limit, skip],
                    )
                    .await
                    .map_err(repo_err)?;
                (total, rows)
            }
        };

        Ok(ReviewPage {
            total: u64::try_from(total).unwrap_or_default(),
            reviews: Self::collect_reviews(rows).await?,
        })
    }

    async fn save_analysis(
        &self,
        id: i64,
        update: &AnalysisUpdate,
        status: AnalysisStatus,
    ) -> Result<Review, DomainError> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                r#"
                UPDATE reviews SET
                    sentiment = ?1,
                    sentiment_score = ?2,
                    key_points_json = ?3,
                    analysis_status = ?4,
                    error_message = ?5,
                    updated_at = ?6
                WHERE id = ?7
                "#,
                params![
                    update.sentiment.map(|s| s.as_str().to_string()),
                    update.sentiment_score,
                    Self::key_points_to_json(&update.key_points),
                    status.as_str(),
                    update.error_message.clone(),
                    Self::now_millis(),
                    id
                ],
            )
            .await
            .map_err(repo_err)?;
        if changed == 0 {
            return Err(DomainError::NotFound(id));
        }
        self.get(id).await?.ok_or(DomainError::NotFound(id))
    }

    async fn delete(&self, id: i64) -> Result<bool, DomainError> {
        let conn = self.conn()?;
        let changed = conn
            .execute("DELETE FROM reviews WHERE id = ?1", params![id])
            .await
            .map_err(repo_err)?;
        Ok(changed > 0)
    }

    async fn all(&self) -> Result<Vec<Review>, DomainError> {
        let conn = self.conn()?;
        let rows = conn
            .query(
                &format!(
                    "SELECT {} FROM reviews ORDER BY created_at DESC, id DESC",
                    SELECT_COLUMNS
                ),
                (),
            )
            .await
            .map_err(repo_err)?;
        Self::collect_reviews(rows).await
    }
}
