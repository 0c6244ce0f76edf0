//! # assetry-inference
//!
//! Vision inference and the AI metadata suggestion pipeline for assetry.
//!
//! This crate provides:
//! - The [`VisionBackend`] trait and an OpenAI-compatible implementation
//! - [`SuggestionOrchestrator`], which turns one media item into a
//!   [`assetry_core::Suggestion`] or a classified error
//! - [`MediaSourceFetcher`] for suggestions from trusted remote URLs
//! - [`SuggestionConfig`], loaded from the environment
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use assetry_core::SuggestionContext;
//! use assetry_inference::{OpenAIVisionBackend, SuggestionConfig, SuggestionOrchestrator};
//!
//! let config = SuggestionConfig::from_env();
//! let backend = Arc::new(OpenAIVisionBackend::new(config.inference.clone())?);
//! let orchestrator = SuggestionOrchestrator::new(backend, &config.inference);
//!
//! let ctx = SuggestionContext::new(bytes, "image/jpeg", "harbor-at-dawn.jpg");
//! let outcome = orchestrator.suggest(&ctx).await?;
//! ```

pub mod config;
pub mod mock;
pub mod openai;
pub mod suggest;
pub mod vision;

pub use config::{InferenceConfig, MediaSourceConfig, SuggestionConfig};
pub use openai::OpenAIVisionBackend;
pub use suggest::{
    FallbackReason, FetchedMedia, MediaSourceFetcher, MediaSourcePolicy, SuggestionOrchestrator,
    SuggestionOutcome, SuggestionSource,
};
pub use vision::{ResponseFormat, VisionBackend, VisionRequest};
