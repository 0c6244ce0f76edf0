//! Runs one suggestion request end to end.
//!
//! ```text
//! Building -> Calling -> Parsing -> Reconciling -> Done
//!     |          |          |
//!     |          +----------+--> Fallback  (unclassified failure)
//!     +--> Fallback (media the model cannot look at)
//! ```
//!
//! A missing credential fails at `Building`. Classified failures at `Calling`
//! (auth, quota, payload size, model availability) are returned to the caller;
//! every other failure produces the filename-derived fallback suggestion.
//! Single attempt, no retry.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use assetry_core::defaults::{SUGGESTION_ALT_TEXT_MAX_WORDS, SUGGESTION_TITLE_MAX_CHARS};
use assetry_core::{reconcile_tags, Error, Result, Suggestion, SuggestionContext};

use super::classify::classify_failure;
use super::fallback::fallback_suggestion;
use super::parser::SuggestionResponseParser;
use super::request::{PreparedRequest, SuggestionRequestBuilder};
use crate::config::InferenceConfig;
use crate::vision::VisionBackend;

/// Pipeline stage, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionStage {
    Building,
    Calling,
    Parsing,
    Reconciling,
    Done,
    Fallback,
}

impl SuggestionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Calling => "calling",
            Self::Parsing => "parsing",
            Self::Reconciling => "reconciling",
            Self::Done => "done",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for SuggestionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the fallback suggestion was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The media kind is not sent to the model.
    UnsupportedMedia,
    /// The inference call failed without a classified cause.
    InferenceFailed,
    /// The reply could not be parsed, even after repair.
    UnparseableResponse,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedMedia => "unsupported_media",
            Self::InferenceFailed => "inference_failed",
            Self::UnparseableResponse => "unparseable_response",
        }
    }
}

/// Where a suggestion came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionSource {
    Inference { model: String, repaired: bool },
    Fallback { reason: FallbackReason },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionOutcome {
    pub suggestion: Suggestion,
    pub source: SuggestionSource,
}

impl SuggestionOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, SuggestionSource::Fallback { .. })
    }
}

/// Drives [`SuggestionRequestBuilder`], a [`VisionBackend`] and
/// [`SuggestionResponseParser`] for one media item at a time. Holds no
/// per-request state, so one instance serves concurrent requests.
#[derive(Clone)]
pub struct SuggestionOrchestrator {
    backend: Arc<dyn VisionBackend>,
    builder: SuggestionRequestBuilder,
    credentials_configured: bool,
}

impl SuggestionOrchestrator {
    pub fn new(backend: Arc<dyn VisionBackend>, config: &InferenceConfig) -> Self {
        Self {
            backend,
            builder: SuggestionRequestBuilder::from_config(config),
            credentials_configured: config.has_api_key(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials_configured
    }

    pub async fn suggest(&self, ctx: &SuggestionContext) -> Result<SuggestionOutcome> {
        let start = Instant::now();
        let kind = ctx.media_kind();

        // Building
        if !self.credentials_configured {
            warn!(
                subsystem = "inference",
                component = "suggest",
                stage = %SuggestionStage::Building,
                "Suggestion rejected: inference API key is not configured"
            );
            return Err(Error::Config(
                "inference API key is not configured".to_string(),
            ));
        }
        let request = match self.builder.build(ctx) {
            PreparedRequest::Inference(request) => request,
            PreparedRequest::Skip(suggestion) => {
                debug!(
                    subsystem = "inference",
                    component = "suggest",
                    stage = %SuggestionStage::Fallback,
                    mime_type = %ctx.mime_type,
                    media_kind = %kind,
                    "Media kind not sent to inference; using filename suggestion"
                );
                return Ok(SuggestionOutcome {
                    suggestion,
                    source: SuggestionSource::Fallback {
                        reason: FallbackReason::UnsupportedMedia,
                    },
                });
            }
        };

        // Calling
        let raw = match self.backend.generate(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                let err = classify_failure(e);
                if err.is_classified_inference() {
                    warn!(
                        subsystem = "inference",
                        component = "suggest",
                        stage = %SuggestionStage::Calling,
                        model = %request.model,
                        error = %err,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Inference call failed"
                    );
                    return Err(err);
                }
                return Ok(self.fall_back(
                    ctx,
                    SuggestionStage::Calling,
                    FallbackReason::InferenceFailed,
                    &err,
                ));
            }
        };

        // Parsing
        let parsed = match SuggestionResponseParser::parse(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                return Ok(self.fall_back(
                    ctx,
                    SuggestionStage::Parsing,
                    FallbackReason::UnparseableResponse,
                    &err,
                ));
            }
        };
        let repaired = parsed.is_repaired();

        // Reconciling
        let mut suggestion = parsed.into_suggestion();
        suggestion.tags = reconcile_tags(suggestion.tags.as_deref(), ctx.default_tags());
        suggestion.title = suggestion
            .title
            .map(|t| clamp_chars(&t, SUGGESTION_TITLE_MAX_CHARS));
        suggestion.alt_text = suggestion
            .alt_text
            .map(|a| clamp_words(&a, SUGGESTION_ALT_TEXT_MAX_WORDS));

        info!(
            subsystem = "inference",
            component = "suggest",
            stage = %SuggestionStage::Done,
            model = %request.model,
            media_kind = %kind,
            response_len = raw.len(),
            repaired,
            tag_count = suggestion.tags.as_ref().map_or(0, Vec::len),
            duration_ms = start.elapsed().as_millis() as u64,
            "Suggestion complete"
        );

        Ok(SuggestionOutcome {
            suggestion,
            source: SuggestionSource::Inference {
                model: request.model.clone(),
                repaired,
            },
        })
    }

    fn fall_back(
        &self,
        ctx: &SuggestionContext,
        stage: SuggestionStage,
        reason: FallbackReason,
        err: &Error,
    ) -> SuggestionOutcome {
        warn!(
            subsystem = "inference",
            component = "suggest",
            stage = %stage,
            fallback_reason = reason.as_str(),
            filename = %ctx.filename,
            error = %err,
            "Falling back to filename suggestion"
        );
        SuggestionOutcome {
            suggestion: fallback_suggestion(ctx),
            source: SuggestionSource::Fallback { reason },
        }
    }
}

/// At most `max` characters, trailing whitespace removed.
fn clamp_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    text.chars().take(max).collect::<String>().trim_end().to_string()
}

/// At most `max` whitespace-separated words.
fn clamp_words(text: &str, max: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max {
        return text.to_string();
    }
    words[..max].join(" ")
}
