//! AI metadata suggestion handlers.
//!
//! Both endpoints resolve the optional media type into suggestion context and
//! hand the media to [`assetry_inference::SuggestionOrchestrator`]. With a media
//! type, a filename extension outside its allowed formats is refused before
//! any download or inference. Classified
//! inference failures come back as errors with a user-facing message; anything
//! else yields a fallback suggestion with `source.kind = "fallback"`.

use axum::{extract::State, Json};
use base64::Engine;
use serde::Deserialize;
use uuid::Uuid;

use assetry_core::{
    check_media_format, Error, MediaTypeContext, MediaTypeDefinition, SuggestionContext,
};
use assetry_inference::suggest::source::filename_from_url;
use assetry_inference::SuggestionOutcome;

use crate::{ApiError, AppState};

/// Request body for a suggestion on uploaded media.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SuggestMetadataRequest {
    /// Base64-encoded media bytes.
    pub data: String,
    /// Declared MIME type. Sniffed from the bytes when generic or absent.
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    pub filename: String,
    /// Media type whose name, description and default tags guide the model.
    #[serde(default)]
    pub media_type_id: Option<Uuid>,
}

fn default_mime_type() -> String {
    "application/octet-stream".to_string()
}

/// Request body for a suggestion on media at a trusted URL.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SuggestFromUrlRequest {
    /// HTTPS URL on a trusted host.
    pub url: String,
    /// Overrides the filename taken from the URL path.
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub media_type_id: Option<Uuid>,
}

/// Suggest a title, description, alt text and tags for uploaded media.
///
/// # Returns
/// - 200 OK with `suggestion` and its `source`
/// - 400 Bad Request if `data` is not valid base64 or is empty, or the
///   filename's format is not allowed by the media type
/// - 404 Not Found if `media_type_id` doesn't exist
/// - 413/429/503 for classified inference failures
#[utoipa::path(post, path = "/api/v1/suggestions", tag = "Suggestions",
    request_body = SuggestMetadataRequest,
    responses(
        (status = 200, description = "Suggestion produced"),
        (status = 400, description = "Invalid media payload or format not allowed"),
        (status = 404, description = "Media type not found"),
        (status = 413, description = "Media too large for the model"),
        (status = 429, description = "Inference quota exhausted"),
        (status = 503, description = "Inference not configured or unavailable"),
    ))]
pub async fn suggest_metadata(
    State(state): State<AppState>,
    Json(req): Json<SuggestMetadataRequest>,
) -> Result<Json<SuggestionOutcome>, ApiError> {
    let data = base64::engine::general_purpose::STANDARD
        .decode(req.data.trim())
        .map_err(|e| ApiError::BadRequest(format!("Invalid base64 media data: {}", e)))?;
    if data.is_empty() {
        return Err(ApiError::BadRequest("Media data is empty".into()));
    }

    let media_type = resolve_media_type(&state, req.media_type_id, &req.filename).await?;
    let ctx = context(data, req.mime_type, req.filename, media_type);
    Ok(Json(state.orchestrator.suggest(&ctx).await?))
}

/// Suggest metadata for media fetched from a trusted HTTPS host.
///
/// The URL is checked against the allow-list before any request is made.
#[utoipa::path(post, path = "/api/v1/suggestions/from-url", tag = "Suggestions",
    request_body = SuggestFromUrlRequest,
    responses(
        (status = 200, description = "Suggestion produced"),
        (status = 400, description = "Format not allowed by the media type"),
        (status = 403, description = "URL is not a trusted media source"),
        (status = 404, description = "Media type not found"),
        (status = 413, description = "Media exceeds the download limit"),
        (status = 503, description = "Inference not configured or unavailable"),
    ))]
pub async fn suggest_metadata_from_url(
    State(state): State<AppState>,
    Json(req): Json<SuggestFromUrlRequest>,
) -> Result<Json<SuggestionOutcome>, ApiError> {
    let url = state.fetcher.policy().check(&req.url)?;
    if !state.orchestrator.is_configured() {
        return Err(Error::Config("inference API key is not set".to_string()).into());
    }

    let filename = req
        .filename
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| filename_from_url(&url));
    let media_type = resolve_media_type(&state, req.media_type_id, &filename).await?;

    let media = state.fetcher.fetch(&req.url).await?;
    let ctx = context(media.data, media.mime_type, filename, media_type);
    Ok(Json(state.orchestrator.suggest(&ctx).await?))
}

async fn resolve_media_type(
    state: &AppState,
    media_type_id: Option<Uuid>,
    filename: &str,
) -> Result<Option<MediaTypeDefinition>, ApiError> {
    let Some(id) = media_type_id else {
        return Ok(None);
    };
    let def = state.registry.get(id).await?;
    check_media_format(&def, filename)?;
    Ok(Some(def))
}

fn context(
    data: Vec<u8>,
    mime_type: String,
    filename: String,
    media_type: Option<MediaTypeDefinition>,
) -> SuggestionContext {
    let ctx = SuggestionContext::new(data, mime_type, filename);
    match media_type {
        Some(def) => ctx.with_media_type(MediaTypeContext::from(&def)),
        None => ctx,
    }
}
