//! # assetry-core
//!
//! Core types, traits, and the media type schema engine for assetry.
//!
//! This crate provides:
//! - Media type, field schema, and suggestion data models
//! - Structural validation of media type definitions ([`schema`])
//! - Linked width/height computation for dimension constraints ([`dimensions`])
//! - Tag normalization and reconciliation ([`tags`])
//! - Repository traits and the [`MediaTypeRegistry`] lifecycle service

pub mod defaults;
pub mod dimensions;
pub mod error;
pub mod logging;
pub mod models;
pub mod registry;
pub mod schema;
pub mod tags;
pub mod traits;

// Re-export commonly used types at crate root
pub use dimensions::{
    height_for_width, on_height_change, on_ratio_change, on_width_change, width_for_height,
    Dimension, DimensionPair,
};
pub use error::{Error, Result};
pub use models::*;
pub use registry::MediaTypeRegistry;
pub use schema::{
    check_media_format, prepare_definition, validate_field_value, validate_metadata,
};
pub use tags::{normalize_tag, normalize_tags, reconcile_tags};
pub use traits::*;
