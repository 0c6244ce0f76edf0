//! Structural validation for media type definitions and their field schemas.
//!
//! Every check returns [`Error::SchemaValidation`] naming the offending field
//! (`name`, `color`, `allowed_formats`, `fields.<name>.options`, ...). The
//! checks are pure; persistence and the uniqueness scan live in
//! [`crate::registry`].

use std::collections::HashSet;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::defaults::{MEDIA_TYPE_MAX_FIELDS, MEDIA_TYPE_NAME_MAX_LEN};
use crate::models::{DimensionConstraint, FieldSchema, FieldType, MediaTypeDefinition};
use crate::{Error, Result};

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("hex color pattern is valid")
});

/// Key used for case- and whitespace-insensitive name comparison.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Validate a media type name and return it trimmed.
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::schema("name", "must not be empty"));
    }
    if trimmed.chars().count() > MEDIA_TYPE_NAME_MAX_LEN {
        return Err(Error::schema(
            "name",
            format!("must be at most {} characters", MEDIA_TYPE_NAME_MAX_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

/// Reject `name` if another definition already uses it, ignoring case and
/// surrounding whitespace. `exclude` skips the definition being updated.
pub fn check_name_available(
    name: &str,
    existing: &[MediaTypeDefinition],
    exclude: Option<Uuid>,
) -> Result<()> {
    let key = name_key(name);
    let clash = existing
        .iter()
        .filter(|def| Some(def.id) != exclude)
        .find(|def| name_key(&def.name) == key);
    match clash {
        Some(def) => Err(Error::schema(
            "name",
            format!("a media type named '{}' already exists", def.name.trim()),
        )),
        None => Ok(()),
    }
}

pub fn validate_color(color: &str) -> Result<()> {
    if HEX_COLOR.is_match(color) {
        Ok(())
    } else {
        Err(Error::schema(
            "color",
            format!("'{}' is not a hex color like #RGB or #RRGGBB", color),
        ))
    }
}

/// Normalize allowed formats (trim, drop leading dot, lowercase, dedup) and
/// require at least one.
pub fn normalize_formats(formats: &[String]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(formats.len());
    for raw in formats {
        let format = raw.trim().trim_start_matches('.').to_lowercase();
        if format.is_empty() {
            return Err(Error::schema(
                "allowed_formats",
                "formats must not be blank",
            ));
        }
        if seen.insert(format.clone()) {
            normalized.push(format);
        }
    }
    if normalized.is_empty() {
        return Err(Error::schema(
            "allowed_formats",
            "at least one file format is required",
        ));
    }
    Ok(normalized)
}

/// Validate the field list in passes: unique names, then every field's
/// shape (name, label, select options), then every validation regex. The
/// first failing pass decides the error.
pub fn validate_fields(fields: &[FieldSchema]) -> Result<()> {
    if fields.len() > MEDIA_TYPE_MAX_FIELDS {
        return Err(Error::schema(
            "fields",
            format!("at most {} fields are allowed", MEDIA_TYPE_MAX_FIELDS),
        ));
    }

    let mut names = HashSet::new();
    for field in fields {
        if !names.insert(field.name.as_str()) {
            return Err(Error::schema(
                format!("fields.{}", field.name),
                "field names must be unique within a media type",
            ));
        }
    }

    fields.iter().try_for_each(validate_field_shape)?;
    fields.iter().try_for_each(validate_field_pattern)
}

/// Validate one field schema in isolation.
pub fn validate_field(field: &FieldSchema) -> Result<()> {
    validate_field_shape(field)?;
    validate_field_pattern(field)
}

fn validate_field_shape(field: &FieldSchema) -> Result<()> {
    if field.name.trim().is_empty() {
        return Err(Error::schema("fields", "field name must not be empty"));
    }
    let path = format!("fields.{}", field.name);
    if field.label.trim().is_empty() {
        return Err(Error::schema(format!("{}.label", path), "must not be empty"));
    }

    match (&field.field_type, &field.options) {
        (FieldType::Select, None) => {
            return Err(Error::schema(
                format!("{}.options", path),
                "select fields need at least one option",
            ));
        }
        (FieldType::Select, Some(options)) => validate_options(&path, options)?,
        (_, Some(options)) if !options.is_empty() => {
            return Err(Error::schema(
                format!("{}.options", path),
                format!("options are only allowed on select fields, not {}", field.field_type),
            ));
        }
        _ => {}
    }

    Ok(())
}

fn validate_field_pattern(field: &FieldSchema) -> Result<()> {
    if let Some(pattern) = &field.validation_regex {
        Regex::new(pattern).map_err(|e| {
            Error::schema(
                format!("fields.{}.validation_regex", field.name),
                format!("pattern does not compile: {}", e),
            )
        })?;
    }

    Ok(())
}

fn validate_options(path: &str, options: &[String]) -> Result<()> {
    if options.is_empty() {
        return Err(Error::schema(
            format!("{}.options", path),
            "select fields need at least one option",
        ));
    }
    let mut seen = HashSet::new();
    for option in options {
        if option.trim().is_empty() {
            return Err(Error::schema(
                format!("{}.options", path),
                "options must not be blank",
            ));
        }
        if !seen.insert(option.as_str()) {
            return Err(Error::schema(
                format!("{}.options", path),
                format!("duplicate option '{}'", option),
            ));
        }
    }
    Ok(())
}

pub fn validate_dimension_constraint(constraint: &DimensionConstraint) -> Result<()> {
    if constraint.enabled {
        if let Some(value) = constraint.aspect_ratio.value {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::schema(
                    "dimension_constraint.aspect_ratio",
                    format!("ratio '{}' must be a positive number", constraint.aspect_ratio.label),
                ));
            }
        }
    }
    Ok(())
}

/// Run every structural check on a full definition, in order, and return the
/// canonical form that gets persisted: trimmed name and description,
/// normalized formats, trimmed default tags, field ids assigned, and the
/// dimension pair re-derived from its ratio.
///
/// `existing` is the uniqueness scan; `exclude` is the id being updated.
pub fn prepare_definition(
    mut def: MediaTypeDefinition,
    existing: &[MediaTypeDefinition],
    exclude: Option<Uuid>,
) -> Result<MediaTypeDefinition> {
    def.name = validate_name(&def.name)?;
    check_name_available(&def.name, existing, exclude)?;
    validate_color(&def.color)?;
    def.allowed_formats = normalize_formats(&def.allowed_formats)?;
    validate_fields(&def.fields)?;
    if let Some(constraint) = &mut def.dimension_constraint {
        validate_dimension_constraint(constraint)?;
        constraint.canonicalize();
    }

    def.description = def
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    def.default_tags = def
        .default_tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    for field in &mut def.fields {
        if field.id.trim().is_empty() {
            field.id = Uuid::now_v7().to_string();
        }
    }

    Ok(def)
}

/// Check a metadata value against its field schema. `None` or JSON null means
/// the value is absent.
pub fn validate_field_value(field: &FieldSchema, value: Option<&JsonValue>) -> Result<()> {
    let path = format!("metadata.{}", field.name);
    let value = match value {
        None | Some(JsonValue::Null) => {
            return if field.required {
                Err(Error::schema(path, "is required"))
            } else {
                Ok(())
            };
        }
        Some(v) => v,
    };

    let text = match (field.field_type, value) {
        (FieldType::Number, JsonValue::Number(_)) => return Ok(()),
        (FieldType::Boolean, JsonValue::Bool(_)) => return Ok(()),
        (FieldType::Number, _) => return Err(Error::schema(path, "must be a number")),
        (FieldType::Boolean, _) => return Err(Error::schema(path, "must be true or false")),
        (_, JsonValue::String(s)) => s.as_str(),
        (ft, _) => return Err(Error::schema(path, format!("must be a {} string", ft))),
    };

    if field.required && text.trim().is_empty() {
        return Err(Error::schema(path, "is required"));
    }

    match field.field_type {
        FieldType::Date => {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map_err(|_| Error::schema(path.clone(), "must be a date like 2024-01-31"))?;
        }
        FieldType::Url => {
            let url = reqwest::Url::parse(text)
                .map_err(|_| Error::schema(path.clone(), "must be an absolute URL"))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(Error::schema(path, "must be an http or https URL"));
            }
        }
        FieldType::Select => {
            let allowed = field.options.as_deref().unwrap_or(&[]);
            if !allowed.iter().any(|o| o == text) {
                return Err(Error::schema(
                    path,
                    format!("'{}' is not one of the allowed options", text),
                ));
            }
        }
        _ => {}
    }

    if let Some(pattern) = &field.validation_regex {
        let re = Regex::new(pattern).map_err(|e| {
            Error::schema(
                format!("fields.{}.validation_regex", field.name),
                format!("pattern does not compile: {}", e),
            )
        })?;
        if !re.is_match(text) {
            return Err(Error::schema(path, format!("does not match {}", pattern)));
        }
    }

    Ok(())
}

/// Reject a filename whose extension is not one of the definition's allowed
/// formats. Names without an extension pass, since nothing is known about them.
pub fn check_media_format(def: &MediaTypeDefinition, filename: &str) -> Result<()> {
    let extension = std::path::Path::new(filename.trim())
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty());
    match extension {
        Some(ext) if !def.allows_format(ext) => Err(Error::schema(
            "filename",
            format!(
                "'{}' files are not accepted by media type '{}' (allowed: {})",
                ext.to_lowercase(),
                def.name,
                def.allowed_formats.join(", ")
            ),
        )),
        _ => Ok(()),
    }
}

/// Validate a metadata object against every field of a definition. Keys with
/// no matching field are rejected.
pub fn validate_metadata(
    def: &MediaTypeDefinition,
    metadata: &serde_json::Map<String, JsonValue>,
) -> Result<()> {
    for key in metadata.keys() {
        if !def.fields.iter().any(|f| &f.name == key) {
            return Err(Error::schema(
                format!("metadata.{}", key),
                format!("'{}' has no field named '{}'", def.name, key),
            ));
        }
    }
    def.fields
        .iter()
        .try_for_each(|field| validate_field_value(field, metadata.get(&field.name)))
}
