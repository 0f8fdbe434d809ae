//! Sentiment classifier adapters. Implement ClassifierLoader / SentimentClassifier.

pub mod huggingface;
pub mod mock_classifier;

pub use huggingface::{HuggingFaceClassifier, HuggingFaceLoader};
pub use mock_classifier::MockClassifierLoader;
