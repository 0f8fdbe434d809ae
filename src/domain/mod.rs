//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod key_points;
pub mod keywords;
pub mod sentiment;

pub use entities::{
    AnalysisStatus, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, NewReview, RawPrediction, Review,
    ReviewPage, ReviewQuery, ReviewText, Sentiment, SentimentResult,
};
pub use errors::DomainError;
pub use keywords::KeywordTable;
