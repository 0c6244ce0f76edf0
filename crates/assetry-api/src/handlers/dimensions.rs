//! Dimension linking endpoints for media type authoring forms.
//!
//! The form posts the side the user just edited along with the current pair
//! and ratio; the response is the pair to display.

use axum::Json;
use serde::{Deserialize, Serialize};

use assetry_core::{
    on_height_change, on_ratio_change, on_width_change, AspectRatio, Dimension, DimensionPair,
};

/// Which input the user changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EditedSide {
    Width,
    Height,
    AspectRatio,
}

/// Request body for a linked dimension recompute.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LinkDimensionsRequest {
    pub edited: EditedSide,
    /// Raw form value: a number, a numeric string, or null.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub width: Option<serde_json::Value>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub height: Option<serde_json::Value>,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Serialize, PartialEq, Eq, utoipa::ToSchema)]
pub struct LinkDimensionsResponse {
    /// `null` when the side has no usable value.
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// True when the ratio links width and height.
    pub linked: bool,
}

impl LinkDimensionsResponse {
    fn new(pair: DimensionPair, ratio: &AspectRatio) -> Self {
        Self {
            width: pair.width.pixels(),
            height: pair.height.pixels(),
            linked: ratio.linked_value().is_some(),
        }
    }
}

/// Aspect ratios offered by the authoring form.
#[utoipa::path(get, path = "/api/v1/aspect-ratios", tag = "Dimensions",
    responses((status = 200, description = "Aspect ratio presets", body = [AspectRatio])))]
pub async fn list_aspect_ratios() -> Json<Vec<AspectRatio>> {
    Json(AspectRatio::presets())
}

/// Recompute the linked side after an edit.
///
/// Input that is not a finite non-negative integer becomes `null` instead of
/// zero; a free ratio leaves the other side unchanged.
#[utoipa::path(post, path = "/api/v1/dimensions/link", tag = "Dimensions",
    request_body = LinkDimensionsRequest,
    responses((status = 200, description = "Recomputed pair", body = LinkDimensionsResponse)))]
pub async fn link_dimensions(
    Json(req): Json<LinkDimensionsRequest>,
) -> Json<LinkDimensionsResponse> {
    let width = dimension_from_json(req.width.as_ref());
    let height = dimension_from_json(req.height.as_ref());
    let ratio = &req.aspect_ratio;

    let pair = match req.edited {
        EditedSide::Width => on_width_change(width, ratio, height),
        EditedSide::Height => on_height_change(height, ratio, width),
        EditedSide::AspectRatio => on_ratio_change(ratio, DimensionPair { width, height }),
    };

    Json(LinkDimensionsResponse::new(pair, ratio))
}

/// Read one side of a form payload.
fn dimension_from_json(value: Option<&serde_json::Value>) -> Dimension {
    match value {
        Some(serde_json::Value::Number(n)) => match n.as_f64() {
            Some(v) if v.fract() == 0.0 => Dimension::from_f64(v),
            _ => Dimension::Empty,
        },
        Some(serde_json::Value::String(s)) => Dimension::parse(s),
        _ => Dimension::Empty,
    }
}
