//! Media type HTTP handlers.
//!
//! REST endpoints over [`assetry_core::MediaTypeRegistry`]. Every write goes
//! through the registry, so schema rules and the delete guard apply here the
//! same way they apply to any other caller.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use assetry_core::{
    validate_metadata, CreateMediaTypeRequest, MediaTypeDefinition, UpdateMediaTypeRequest,
};

use crate::{ApiError, AppState};

/// Request body for metadata validation.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ValidateMetadataRequest {
    /// Field name to value. Keys must match fields of the media type.
    #[schema(value_type = Object)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ValidateMetadataResponse {
    pub valid: bool,
}

/// List all media types, sorted by name.
#[utoipa::path(get, path = "/api/v1/media-types", tag = "Media Types",
    responses(
        (status = 200, description = "All media types", body = [MediaTypeDefinition]),
    ))]
pub async fn list_media_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<MediaTypeDefinition>>, ApiError> {
    Ok(Json(state.registry.list().await?))
}

/// Get a media type by id.
#[utoipa::path(get, path = "/api/v1/media-types/{id}", tag = "Media Types",
    params(("id" = Uuid, Path, description = "Media type id")),
    responses(
        (status = 200, description = "Media type", body = MediaTypeDefinition),
        (status = 404, description = "Media type not found"),
    ))]
pub async fn get_media_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MediaTypeDefinition>, ApiError> {
    Ok(Json(state.registry.get(id).await?))
}

/// Create a media type.
///
/// # Returns
/// - 201 Created with the stored definition
/// - 400 Bad Request naming the first field that violates a schema rule
#[utoipa::path(post, path = "/api/v1/media-types", tag = "Media Types",
    request_body = CreateMediaTypeRequest,
    responses(
        (status = 201, description = "Media type created", body = MediaTypeDefinition),
        (status = 400, description = "Schema validation failed"),
    ))]
pub async fn create_media_type(
    State(state): State<AppState>,
    Json(req): Json<CreateMediaTypeRequest>,
) -> Result<(StatusCode, Json<MediaTypeDefinition>), ApiError> {
    let def = state.registry.create(req).await?;
    Ok((StatusCode::CREATED, Json(def)))
}

/// Partially update a media type. Absent fields keep their stored value; the
/// merged definition must pass every schema rule.
#[utoipa::path(patch, path = "/api/v1/media-types/{id}", tag = "Media Types",
    params(("id" = Uuid, Path, description = "Media type id")),
    request_body = UpdateMediaTypeRequest,
    responses(
        (status = 200, description = "Media type updated", body = MediaTypeDefinition),
        (status = 400, description = "Schema validation failed"),
        (status = 404, description = "Media type not found"),
    ))]
pub async fn update_media_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMediaTypeRequest>,
) -> Result<Json<MediaTypeDefinition>, ApiError> {
    Ok(Json(state.registry.update(id, req).await?))
}

/// Delete a media type.
///
/// # Returns
/// - 204 No Content on success
/// - 404 Not Found if the media type doesn't exist
/// - 409 Conflict while media items still reference it
#[utoipa::path(delete, path = "/api/v1/media-types/{id}", tag = "Media Types",
    params(("id" = Uuid, Path, description = "Media type id")),
    responses(
        (status = 204, description = "Media type deleted"),
        (status = 404, description = "Media type not found"),
        (status = 409, description = "Media type still referenced"),
    ))]
pub async fn delete_media_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.registry.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check a metadata map against the fields of a media type.
#[utoipa::path(post, path = "/api/v1/media-types/{id}/validate-metadata", tag = "Media Types",
    params(("id" = Uuid, Path, description = "Media type id")),
    request_body = ValidateMetadataRequest,
    responses(
        (status = 200, description = "Metadata is valid", body = ValidateMetadataResponse),
        (status = 400, description = "A field value is invalid"),
        (status = 404, description = "Media type not found"),
    ))]
pub async fn validate_media_metadata(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ValidateMetadataRequest>,
) -> Result<Json<ValidateMetadataResponse>, ApiError> {
    let def = state.registry.get(id).await?;
    validate_metadata(&def, &req.metadata)?;
    Ok(Json(ValidateMetadataResponse { valid: true }))
}
