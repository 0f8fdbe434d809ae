//! AI adapter module. Implements KeyPointGenerator for LLM integration.
//!
//! Provides Gemini and OpenAI-compatible adapters plus a mock adapter for testing.

pub mod gemini_adapter;
pub mod mock_adapter;
pub mod openai_adapter;

pub use gemini_adapter::GeminiAdapter;
pub use mock_adapter::MockKeyPointGenerator;
pub use openai_adapter::OpenAiAdapter;
