//! Builds the multimodal request for one media item.
//!
//! Pure construction: no I/O, no logging. Media the model cannot look at
//! short-circuits to a filename-derived suggestion.

use assetry_core::defaults::{
    SUGGESTION_ALT_TEXT_MAX_WORDS, SUGGESTION_TAGS_MAX, SUGGESTION_TAGS_MIN,
    SUGGESTION_TITLE_MAX_CHARS,
};
use assetry_core::{MediaKind, MediaTypeContext, Suggestion, SuggestionContext};

use super::fallback::fallback_suggestion;
use crate::config::InferenceConfig;
use crate::vision::{ResponseFormat, VisionRequest};

/// Result of building a request for one media item.
#[derive(Debug, Clone)]
pub enum PreparedRequest<'a> {
    /// Send this to the vision backend.
    Inference(VisionRequest<'a>),
    /// No inference for this media kind; use this suggestion as-is.
    Skip(Suggestion),
}

#[derive(Debug, Clone)]
pub struct SuggestionRequestBuilder {
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl SuggestionRequestBuilder {
    pub fn new(model: impl Into<String>, temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            model: model.into(),
            temperature,
            max_output_tokens,
        }
    }

    pub fn from_config(config: &InferenceConfig) -> Self {
        Self::new(
            config.model.clone(),
            config.temperature,
            config.max_output_tokens,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn build<'a>(&self, ctx: &'a SuggestionContext) -> PreparedRequest<'a> {
        let kind = ctx.media_kind();
        if kind == MediaKind::Other {
            return PreparedRequest::Skip(fallback_suggestion(ctx));
        }

        PreparedRequest::Inference(VisionRequest {
            model: self.model.clone(),
            prompt: build_prompt(kind, ctx.media_type.as_ref()),
            media: &ctx.data,
            mime_type: effective_mime_type(ctx, kind),
            response_format: ResponseFormat::Json,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        })
    }
}

/// The MIME type sent with the inline media. Generic types are replaced by
/// what the bytes look like, then by a type matching the media kind.
fn effective_mime_type(ctx: &SuggestionContext, kind: MediaKind) -> String {
    let declared = ctx.mime_type.trim().to_lowercase();
    if !declared.is_empty() && declared != "application/octet-stream" {
        return declared;
    }
    if let Some(detected) = infer::get(&ctx.data) {
        return detected.mime_type().to_string();
    }
    match kind {
        MediaKind::Video => "video/mp4".to_string(),
        _ => "image/jpeg".to_string(),
    }
}

/// Prompt text for an image or video, with the media type as context.
pub fn build_prompt(kind: MediaKind, media_type: Option<&MediaTypeContext>) -> String {
    let subject = match kind {
        MediaKind::Video => "video",
        _ => "image",
    };

    let mut prompt = format!(
        "You are helping catalog a digital asset library. Look at this {subject} and \
         suggest metadata for it.\n\n\
         Provide:\n\
         - title: a concise title of at most {title} characters\n\
         - description: one or two sentences describing the {subject}\n\
         - altText: alt text for screen readers of at most {alt} words\n\
         - tags: {min} to {max} short lowercase keywords\n",
        subject = subject,
        title = SUGGESTION_TITLE_MAX_CHARS,
        alt = SUGGESTION_ALT_TEXT_MAX_WORDS,
        min = SUGGESTION_TAGS_MIN,
        max = SUGGESTION_TAGS_MAX,
    );

    if let Some(media_type) = media_type {
        prompt.push_str(&format!(
            "\nThis {subject} is categorized as \"{}\".",
            media_type.name
        ));
        if let Some(description) = media_type.description.as_deref().map(str::trim) {
            if !description.is_empty() {
                prompt.push_str(&format!(" Category description: {}.", description));
            }
        }
        if !media_type.default_tags.is_empty() {
            prompt.push_str(&format!(
                " Items in this category are usually tagged: {}.",
                media_type.default_tags.join(", ")
            ));
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "\nRespond with a single JSON object with exactly these keys: \
         \"title\", \"description\", \"altText\", \"tags\" (an array of strings). \
         Do not include any other text.",
    );
    prompt
}
