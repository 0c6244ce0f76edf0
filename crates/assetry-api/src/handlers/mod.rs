//! HTTP handlers for assetry-api.

pub mod dimensions;
pub mod media_types;
pub mod suggestions;
