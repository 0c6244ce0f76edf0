//! Centralized default constants for assetry.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// MEDIA TYPES
// =============================================================================

/// Maximum length of a media type name, after trimming.
pub const MEDIA_TYPE_NAME_MAX_LEN: usize = 100;

/// Maximum number of custom fields on one media type.
pub const MEDIA_TYPE_MAX_FIELDS: usize = 50;

/// Color assigned when a create request omits one.
pub const MEDIA_TYPE_COLOR: &str = "#6366f1";

// =============================================================================
// SUGGESTIONS
// =============================================================================

/// Maximum characters in a suggested title.
pub const SUGGESTION_TITLE_MAX_CHARS: usize = 60;

/// Maximum words in suggested alt text.
pub const SUGGESTION_ALT_TEXT_MAX_WORDS: usize = 10;

/// Minimum number of tags the model is asked for.
pub const SUGGESTION_TAGS_MIN: usize = 3;

/// Maximum number of tags the model is asked for.
pub const SUGGESTION_TAGS_MAX: usize = 5;

// =============================================================================
// INFERENCE
// =============================================================================

/// Default OpenAI-compatible endpoint for the multimodal model.
pub const INFERENCE_BASE_URL: &str = "https://api.openai.com/v1";

/// Default multimodal model.
pub const INFERENCE_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature for metadata suggestions. Low, so repeated runs agree.
pub const INFERENCE_TEMPERATURE: f32 = 0.4;

/// Upper bound on generated tokens. The JSON reply is small.
pub const INFERENCE_MAX_OUTPUT_TOKENS: u32 = 1024;

/// HTTP timeout for one inference call, in seconds.
pub const INFERENCE_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// MEDIA SOURCES
// =============================================================================

/// Largest remote media file fetched for a suggestion (20 MiB).
pub const MEDIA_SOURCE_MAX_BYTES: usize = 20 * 1024 * 1024;

/// Timeout for fetching a remote media file, in seconds.
pub const MEDIA_SOURCE_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Maximum request body accepted by the API (base64 uploads), in bytes.
pub const SERVER_BODY_LIMIT_BYTES: usize = 32 * 1024 * 1024;

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

/// API key for the inference service. Optional at startup.
pub const ENV_INFERENCE_API_KEY: &str = "INFERENCE_API_KEY";

/// Base URL override for the inference service.
pub const ENV_INFERENCE_BASE_URL: &str = "INFERENCE_BASE_URL";

/// Model override for the inference service.
pub const ENV_INFERENCE_MODEL: &str = "INFERENCE_MODEL";

/// Temperature override.
pub const ENV_INFERENCE_TEMPERATURE: &str = "INFERENCE_TEMPERATURE";

/// Max output tokens override.
pub const ENV_INFERENCE_MAX_OUTPUT_TOKENS: &str = "INFERENCE_MAX_OUTPUT_TOKENS";

/// Timeout override, in seconds.
pub const ENV_INFERENCE_TIMEOUT: &str = "INFERENCE_TIMEOUT";

/// Comma-separated hosts media may be fetched from.
pub const ENV_MEDIA_SOURCE_HOSTS: &str = "MEDIA_SOURCE_HOSTS";

/// Remote fetch size limit override, in bytes.
pub const ENV_MEDIA_SOURCE_MAX_BYTES: &str = "MEDIA_SOURCE_MAX_BYTES";
