//! Core data models for assetry.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// FIELD SCHEMA
// =============================================================================

/// Value type of a custom metadata field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Date,
    Select,
    Boolean,
    Url,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Number => write!(f, "number"),
            Self::Date => write!(f, "date"),
            Self::Select => write!(f, "select"),
            Self::Boolean => write!(f, "boolean"),
            Self::Url => write!(f, "url"),
        }
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "string" => Ok(Self::Text),
            "number" | "numeric" => Ok(Self::Number),
            "date" => Ok(Self::Date),
            "select" | "enum" => Ok(Self::Select),
            "boolean" | "bool" => Ok(Self::Boolean),
            "url" | "link" => Ok(Self::Url),
            _ => Err(format!("Invalid field type: {}", s)),
        }
    }
}

/// One custom metadata field on a media type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FieldSchema {
    /// Stable field identifier. Assigned on create when left empty.
    #[serde(default)]
    pub id: String,
    /// Machine name, unique within the owning media type (case-sensitive).
    pub name: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Allowed values, `select` fields only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl FieldSchema {
    /// Convenience constructor for a plain field with no constraints.
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            label: label.into(),
            field_type,
            required: false,
            options: None,
            validation_regex: None,
            placeholder: None,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_validation_regex(mut self, pattern: impl Into<String>) -> Self {
        self.validation_regex = Some(pattern.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

// =============================================================================
// DIMENSION CONSTRAINT
// =============================================================================

/// A named aspect ratio. `value` is width divided by height; `None` unlinks
/// width and height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AspectRatio {
    pub label: String,
    pub value: Option<f64>,
}

impl AspectRatio {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value: Some(value),
        }
    }

    /// The "None" ratio: width and height vary independently.
    pub fn free() -> Self {
        Self {
            label: "None".to_string(),
            value: None,
        }
    }

    /// The ratio value when it can link width and height (finite and positive).
    pub fn linked_value(&self) -> Option<f64> {
        self.value.filter(|r| r.is_finite() && *r > 0.0)
    }

    /// Ratios offered by the authoring form.
    pub fn presets() -> Vec<AspectRatio> {
        vec![
            AspectRatio::free(),
            AspectRatio::new("1:1", 1.0),
            AspectRatio::new("4:3", 4.0 / 3.0),
            AspectRatio::new("3:2", 3.0 / 2.0),
            AspectRatio::new("16:9", 16.0 / 9.0),
            AspectRatio::new("9:16", 9.0 / 16.0),
            AspectRatio::new("21:9", 21.0 / 9.0),
        ]
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::free()
    }
}

/// Minimum pixel dimensions for a media type, optionally linked by an aspect ratio.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DimensionConstraint {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height: Option<u32>,
}

// =============================================================================
// MEDIA TYPE DEFINITION
// =============================================================================

/// A user-authored schema for one category of media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MediaTypeDefinition {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `#RGB` or `#RRGGBB`.
    pub color: String,
    /// Normalized file extensions (lowercase, no leading dot).
    pub allowed_formats: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
    #[serde(default)]
    pub default_tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_constraint: Option<DimensionConstraint>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaTypeDefinition {
    /// Merge a partial update over this definition. No validation happens here;
    /// the registry validates the merged result before persisting it.
    pub fn merged_with(&self, req: &UpdateMediaTypeRequest) -> MediaTypeDefinition {
        let mut merged = self.clone();
        if let Some(name) = &req.name {
            merged.name = name.clone();
        }
        if let Some(description) = &req.description {
            merged.description = if description.trim().is_empty() {
                None
            } else {
                Some(description.clone())
            };
        }
        if let Some(color) = &req.color {
            merged.color = color.clone();
        }
        if let Some(formats) = &req.allowed_formats {
            merged.allowed_formats = formats.clone();
        }
        if let Some(fields) = &req.fields {
            merged.fields = fields.clone();
        }
        if let Some(tags) = &req.default_tags {
            merged.default_tags = tags.clone();
        }
        if let Some(constraint) = &req.dimension_constraint {
            merged.dimension_constraint = constraint.clone();
        }
        merged
    }

    /// True when `format` (extension, any case, with or without a dot) is allowed.
    pub fn allows_format(&self, format: &str) -> bool {
        let wanted = format.trim().trim_start_matches('.').to_lowercase();
        self.allowed_formats.iter().any(|f| *f == wanted)
    }
}

/// Request to create a media type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateMediaTypeRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub allowed_formats: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
    #[serde(default)]
    pub default_tags: Vec<String>,
    #[serde(default)]
    pub dimension_constraint: Option<DimensionConstraint>,
}

fn default_color() -> String {
    crate::defaults::MEDIA_TYPE_COLOR.to_string()
}

/// Partial update of a media type. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateMediaTypeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// An empty string clears the description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_formats: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldSchema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_tags: Option<Vec<String>>,
    /// `null` removes the constraint; absent keeps it.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<DimensionConstraint>)]
    pub dimension_constraint: Option<Option<DimensionConstraint>>,
}

/// Keeps a present `null` as `Some(None)` so it differs from an absent key.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// =============================================================================
// SUGGESTIONS
// =============================================================================

/// AI-produced candidate metadata. Every field is optional so partial and
/// fallback results are representable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Suggestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Suggestion {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.alt_text.is_none()
            && self.tags.is_none()
    }
}

/// The slice of a media type the suggestion pipeline needs as context.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MediaTypeContext {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub default_tags: Vec<String>,
}

impl From<&MediaTypeDefinition> for MediaTypeContext {
    fn from(def: &MediaTypeDefinition) -> Self {
        Self {
            name: def.name.clone(),
            description: def.description.clone(),
            default_tags: def.default_tags.clone(),
        }
    }
}

/// Input to one suggestion request. Not mutated while the request runs.
#[derive(Debug, Clone)]
pub struct SuggestionContext {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
    pub media_type: Option<MediaTypeContext>,
}

impl SuggestionContext {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            filename: filename.into(),
            media_type: None,
        }
    }

    pub fn with_media_type(mut self, media_type: MediaTypeContext) -> Self {
        self.media_type = Some(media_type);
        self
    }

    /// Default tags of the media type context; empty when there is none.
    pub fn default_tags(&self) -> &[String] {
        self.media_type
            .as_ref()
            .map(|m| m.default_tags.as_slice())
            .unwrap_or(&[])
    }

    pub fn media_kind(&self) -> MediaKind {
        MediaKind::classify(&self.mime_type, &self.filename)
    }
}

/// Coarse media classification that decides whether inference is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "avif", "heic", "heif", "bmp", "tif", "tiff", "svg",
];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "mkv", "avi", "m4v", "mpeg", "mpg"];

impl MediaKind {
    /// Classify by MIME type. Generic or missing MIME types fall back to the
    /// filename extension.
    pub fn classify(mime_type: &str, filename: &str) -> Self {
        let mime = mime_type.trim().to_lowercase();
        if mime.starts_with("image/") {
            return Self::Image;
        }
        if mime.starts_with("video/") {
            return Self::Video;
        }
        if !mime.is_empty() && mime != "application/octet-stream" {
            return Self::Other;
        }

        let ext = match filename.rsplit_once('.') {
            Some((_, ext)) => ext.to_lowercase(),
            None => return Self::Other,
        };
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_definition() -> MediaTypeDefinition {
        let now = Utc::now();
        MediaTypeDefinition {
            id: Uuid::new_v4(),
            name: "Product Shot".to_string(),
            description: Some("Catalog photography".to_string()),
            color: "#ff8800".to_string(),
            allowed_formats: vec!["jpg".to_string(), "png".to_string()],
            fields: vec![FieldSchema::new("sku", "SKU", FieldType::Text)],
            default_tags: vec!["product".to_string()],
            dimension_constraint: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_field_type_roundtrip_strings() {
        for ft in [
            FieldType::Text,
            FieldType::Number,
            FieldType::Date,
            FieldType::Select,
            FieldType::Boolean,
            FieldType::Url,
        ] {
            assert_eq!(ft.to_string().parse::<FieldType>().unwrap(), ft);
        }
        assert!("color".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_field_schema_serializes_type_key() {
        let field = FieldSchema::new("status", "Status", FieldType::Select).with_options(["a"]);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "select");
        assert_eq!(json["options"][0], "a");
        assert!(json.get("validation_regex").is_none());
    }

    #[test]
    fn test_field_schema_deserializes_minimal() {
        let field: FieldSchema =
            serde_json::from_str(r#"{"name":"sku","label":"SKU","type":"text"}"#).unwrap();
        assert_eq!(field.id, "");
        assert!(!field.required);
        assert_eq!(field.field_type, FieldType::Text);
    }

    #[test]
    fn test_aspect_ratio_linked_value() {
        assert_eq!(AspectRatio::new("16:9", 16.0 / 9.0).linked_value(), Some(16.0 / 9.0));
        assert_eq!(AspectRatio::free().linked_value(), None);
        assert_eq!(AspectRatio::new("bad", 0.0).linked_value(), None);
        assert_eq!(AspectRatio::new("bad", f64::NAN).linked_value(), None);
        assert_eq!(AspectRatio::new("bad", -1.0).linked_value(), None);
    }

    #[test]
    fn test_aspect_ratio_presets_start_with_none() {
        let presets = AspectRatio::presets();
        assert_eq!(presets[0].label, "None");
        assert!(presets[0].value.is_none());
        assert!(presets.iter().skip(1).all(|p| p.linked_value().is_some()));
    }

    #[test]
    fn test_merged_with_keeps_absent_fields() {
        let def = sample_definition();
        let merged = def.merged_with(&UpdateMediaTypeRequest {
            color: Some("#000".to_string()),
            ..Default::default()
        });
        assert_eq!(merged.color, "#000");
        assert_eq!(merged.name, def.name);
        assert_eq!(merged.fields, def.fields);
        assert_eq!(merged.default_tags, def.default_tags);
    }

    #[test]
    fn test_merged_with_empty_description_clears() {
        let def = sample_definition();
        let merged = def.merged_with(&UpdateMediaTypeRequest {
            description: Some("  ".to_string()),
            ..Default::default()
        });
        assert!(merged.description.is_none());
    }

    #[test]
    fn test_patch_null_clears_dimension_constraint() {
        let mut def = sample_definition();
        def.dimension_constraint = Some(DimensionConstraint {
            enabled: true,
            min_width: Some(1920),
            ..Default::default()
        });

        let absent: UpdateMediaTypeRequest =
            serde_json::from_str(r##"{"color":"#000"}"##).unwrap();
        assert!(absent.dimension_constraint.is_none());
        assert_eq!(
            def.merged_with(&absent).dimension_constraint,
            def.dimension_constraint
        );

        let cleared: UpdateMediaTypeRequest =
            serde_json::from_str(r#"{"dimension_constraint":null}"#).unwrap();
        assert_eq!(cleared.dimension_constraint, Some(None));
        assert!(def.merged_with(&cleared).dimension_constraint.is_none());

        let replaced: UpdateMediaTypeRequest =
            serde_json::from_str(r#"{"dimension_constraint":{"enabled":false}}"#).unwrap();
        assert_eq!(
            def.merged_with(&replaced).dimension_constraint,
            Some(DimensionConstraint::default())
        );
    }

    #[test]
    fn test_allows_format_normalizes_input() {
        let def = sample_definition();
        assert!(def.allows_format("JPG"));
        assert!(def.allows_format(".png"));
        assert!(!def.allows_format("gif"));
    }

    #[test]
    fn test_create_request_defaults_color() {
        let req: CreateMediaTypeRequest =
            serde_json::from_str(r#"{"name":"Logo","allowed_formats":["svg"]}"#).unwrap();
        assert_eq!(req.color, crate::defaults::MEDIA_TYPE_COLOR);
        assert!(req.fields.is_empty());
    }

    #[test]
    fn test_suggestion_skips_absent_fields() {
        let s = Suggestion {
            title: Some("Sunset".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json, serde_json::json!({"title": "Sunset"}));
        assert!(!s.is_empty());
        assert!(Suggestion::default().is_empty());
    }

    #[test]
    fn test_media_type_context_from_definition() {
        let def = sample_definition();
        let ctx = MediaTypeContext::from(&def);
        assert_eq!(ctx.name, "Product Shot");
        assert_eq!(ctx.default_tags, vec!["product".to_string()]);
    }

    #[test]
    fn test_media_kind_classify_by_mime() {
        assert_eq!(MediaKind::classify("image/png", "x.bin"), MediaKind::Image);
        assert_eq!(MediaKind::classify("Video/MP4", "x"), MediaKind::Video);
        assert_eq!(MediaKind::classify("application/pdf", "x.png"), MediaKind::Other);
    }

    #[test]
    fn test_media_kind_classify_falls_back_to_extension() {
        assert_eq!(
            MediaKind::classify("application/octet-stream", "clip.MOV"),
            MediaKind::Video
        );
        assert_eq!(MediaKind::classify("", "photo.jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::classify("", "notes.txt"), MediaKind::Other);
        assert_eq!(MediaKind::classify("", "README"), MediaKind::Other);
    }

    #[test]
    fn test_suggestion_context_default_tags() {
        let ctx = SuggestionContext::new(vec![1], "image/png", "a.png");
        assert!(ctx.default_tags().is_empty());
        let ctx = ctx.with_media_type(MediaTypeContext {
            name: "Webinar".to_string(),
            description: None,
            default_tags: vec!["webinar".to_string()],
        });
        assert_eq!(ctx.default_tags(), &["webinar".to_string()]);
        assert_eq!(ctx.media_kind(), MediaKind::Image);
    }
}
