//! AI metadata suggestion pipeline.
//!
//! - [`request`]: builds the multimodal request, or skips inference for media
//!   the model cannot look at
//! - [`parser`]: turns the raw reply into a suggestion, repairing truncation
//! - [`classify`]: maps call failures onto surfaced error classes
//! - [`orchestrator`]: runs the stages and decides between result and fallback
//! - [`source`]: trusted remote media fetching

pub mod classify;
pub mod fallback;
pub mod orchestrator;
pub mod parser;
pub mod request;
pub mod source;

pub use classify::classify_failure;
pub use fallback::{fallback_suggestion, title_from_filename};
pub use orchestrator::{
    FallbackReason, SuggestionOrchestrator, SuggestionOutcome, SuggestionSource, SuggestionStage,
};
pub use parser::{ParseOutcome, SuggestionResponseParser};
pub use request::{build_prompt, PreparedRequest, SuggestionRequestBuilder};
pub use source::{FetchedMedia, MediaSourceFetcher, MediaSourcePolicy};
