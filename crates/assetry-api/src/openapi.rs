//! OpenAPI document generated from the handler annotations.

use axum::Json;
use utoipa::OpenApi;

use crate::handlers::{dimensions, media_types, suggestions};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Assetry API",
        description = "Digital asset management: media type schemas and AI metadata suggestions"
    ),
    paths(
        media_types::list_media_types,
        media_types::get_media_type,
        media_types::create_media_type,
        media_types::update_media_type,
        media_types::delete_media_type,
        media_types::validate_media_metadata,
        dimensions::list_aspect_ratios,
        dimensions::link_dimensions,
        suggestions::suggest_metadata,
        suggestions::suggest_metadata_from_url,
    ),
    components(schemas(
        assetry_core::MediaTypeDefinition,
        assetry_core::CreateMediaTypeRequest,
        assetry_core::UpdateMediaTypeRequest,
        assetry_core::FieldSchema,
        assetry_core::FieldType,
        assetry_core::DimensionConstraint,
        assetry_core::AspectRatio,
        assetry_core::Suggestion,
        media_types::ValidateMetadataRequest,
        media_types::ValidateMetadataResponse,
        dimensions::EditedSide,
        dimensions::LinkDimensionsRequest,
        dimensions::LinkDimensionsResponse,
        suggestions::SuggestMetadataRequest,
        suggestions::SuggestFromUrlRequest,
    )),
    tags(
        (name = "Media Types", description = "Media type schema CRUD"),
        (name = "Dimensions", description = "Aspect-ratio linked dimensions"),
        (name = "Suggestions", description = "AI metadata suggestions")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
