//! Core traits for assetry abstractions.
//!
//! These traits define the interfaces that persistence implementations
//! (PostgreSQL, in-memory) satisfy. The schema engine only talks to storage
//! through them.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::MediaTypeDefinition;
use crate::Result;

// =============================================================================
// MEDIA TYPE REPOSITORY
// =============================================================================

/// Storage for media type definitions.
///
/// Implementations store what they are given; validation happens in
/// [`crate::registry::MediaTypeRegistry`] before any call here.
#[async_trait]
pub trait MediaTypeRepository: Send + Sync {
    /// Persist a new definition and return the stored record.
    async fn insert(&self, def: MediaTypeDefinition) -> Result<MediaTypeDefinition>;

    /// Replace the stored definition `id` with an already-merged record.
    async fn patch(&self, id: Uuid, def: MediaTypeDefinition) -> Result<MediaTypeDefinition>;

    /// Fetch one definition.
    async fn get(&self, id: Uuid) -> Result<Option<MediaTypeDefinition>>;

    /// Every definition, used for the name-uniqueness scan and listings.
    async fn list_all(&self) -> Result<Vec<MediaTypeDefinition>>;

    /// Remove a definition. Reference checks happen before this is called.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// MEDIA REFERENCES
// =============================================================================

/// Read side of the media store, used to guard deletes.
#[async_trait]
pub trait MediaReferenceCounter: Send + Sync {
    /// Number of media items whose media type is `definition_id`.
    async fn count_references(&self, definition_id: Uuid) -> Result<i64>;
}
