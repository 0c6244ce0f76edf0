//! Suggestion pipeline configuration.
//!
//! Loaded once at startup with [`SuggestionConfig::from_env`] and passed
//! explicitly to the backend, the orchestrator and the media source fetcher.
//! A missing API key is not a load error; every suggestion request fails with
//! [`assetry_core::Error::Config`] until one is provided.

use std::fmt;

use tracing::{info, warn};

use assetry_core::defaults::{
    ENV_INFERENCE_API_KEY, ENV_INFERENCE_BASE_URL, ENV_INFERENCE_MAX_OUTPUT_TOKENS,
    ENV_INFERENCE_MODEL, ENV_INFERENCE_TEMPERATURE, ENV_INFERENCE_TIMEOUT,
    ENV_MEDIA_SOURCE_HOSTS, ENV_MEDIA_SOURCE_MAX_BYTES, INFERENCE_BASE_URL,
    INFERENCE_MAX_OUTPUT_TOKENS, INFERENCE_MODEL, INFERENCE_TEMPERATURE, INFERENCE_TIMEOUT_SECS,
    MEDIA_SOURCE_MAX_BYTES, MEDIA_SOURCE_TIMEOUT_SECS,
};

/// Connection and sampling settings for the multimodal model.
#[derive(Clone)]
pub struct InferenceConfig {
    /// Bearer credential. `None` disables suggestions.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_seconds: u64,
}

impl InferenceConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: INFERENCE_BASE_URL.to_string(),
            model: INFERENCE_MODEL.to_string(),
            temperature: INFERENCE_TEMPERATURE,
            max_output_tokens: INFERENCE_MAX_OUTPUT_TOKENS,
            timeout_seconds: INFERENCE_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Where remote media may be fetched from, and how much of it.
#[derive(Debug, Clone)]
pub struct MediaSourceConfig {
    /// Trusted hosts. A URL host must equal one of these or be a subdomain.
    pub allowed_hosts: Vec<String>,
    pub max_bytes: usize,
    pub timeout_seconds: u64,
}

impl Default for MediaSourceConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: Vec::new(),
            max_bytes: MEDIA_SOURCE_MAX_BYTES,
            timeout_seconds: MEDIA_SOURCE_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SuggestionConfig {
    pub inference: InferenceConfig,
    pub media_source: MediaSourceConfig,
}

impl SuggestionConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for each variable name.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let inference = InferenceConfig {
            api_key: non_empty(ENV_INFERENCE_API_KEY),
            base_url: non_empty(ENV_INFERENCE_BASE_URL).unwrap_or(defaults.inference.base_url),
            model: non_empty(ENV_INFERENCE_MODEL).unwrap_or(defaults.inference.model),
            temperature: parse_or(
                ENV_INFERENCE_TEMPERATURE,
                non_empty(ENV_INFERENCE_TEMPERATURE),
                defaults.inference.temperature,
            ),
            max_output_tokens: parse_or(
                ENV_INFERENCE_MAX_OUTPUT_TOKENS,
                non_empty(ENV_INFERENCE_MAX_OUTPUT_TOKENS),
                defaults.inference.max_output_tokens,
            ),
            timeout_seconds: parse_or(
                ENV_INFERENCE_TIMEOUT,
                non_empty(ENV_INFERENCE_TIMEOUT),
                defaults.inference.timeout_seconds,
            ),
        };

        let media_source = MediaSourceConfig {
            allowed_hosts: non_empty(ENV_MEDIA_SOURCE_HOSTS)
                .map(|v| parse_host_list(&v))
                .unwrap_or_default(),
            max_bytes: parse_or(
                ENV_MEDIA_SOURCE_MAX_BYTES,
                non_empty(ENV_MEDIA_SOURCE_MAX_BYTES),
                defaults.media_source.max_bytes,
            ),
            timeout_seconds: defaults.media_source.timeout_seconds,
        };

        if inference.api_key.is_none() {
            warn!(
                subsystem = "inference",
                component = "config",
                "{} is not set; AI suggestions will be rejected",
                ENV_INFERENCE_API_KEY
            );
        }
        info!(
            subsystem = "inference",
            component = "config",
            model = %inference.model,
            base_url = %inference.base_url,
            allowed_hosts = media_source.allowed_hosts.len(),
            "Suggestion configuration loaded"
        );

        Self {
            inference,
            media_source,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(v) => v.parse().unwrap_or_else(|_| {
            warn!(
                subsystem = "inference",
                component = "config",
                "Ignoring unparseable {}={}",
                key,
                v
            );
            default
        }),
    }
}

/// Split a comma-separated host list, lowercasing and dropping blanks and
/// leading dots.
pub fn parse_host_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|h| h.trim().trim_start_matches('.').to_lowercase())
        .filter(|h| !h.is_empty())
        .collect()
}
