//! OpenAI-compatible vision backend.
//!
//! Works with any chat completions endpoint that accepts multimodal content
//! parts and inline `data:` URLs (OpenAI, OpenRouter, Gemini's OpenAI
//! compatibility layer, vLLM, Ollama).
//!
//! # Example
//!
//! ```rust,no_run
//! use assetry_inference::config::SuggestionConfig;
//! use assetry_inference::openai::OpenAIVisionBackend;
//!
//! let config = SuggestionConfig::from_env();
//! let backend = OpenAIVisionBackend::new(config.inference).unwrap();
//! ```

mod backend;
mod error;
mod types;

pub use backend::OpenAIVisionBackend;
pub use error::{to_core_error, OpenAIErrorCode};
pub use types::*;
