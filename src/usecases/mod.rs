//! Application use cases. Orchestrate domain logic via ports.

pub mod key_point_service;
pub mod review_service;
pub mod sentiment_service;

pub use key_point_service::KeyPointExtractor;
pub use review_service::ReviewService;
pub use sentiment_service::SentimentAnalyzer;
