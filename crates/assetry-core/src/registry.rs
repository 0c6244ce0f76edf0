//! Media type lifecycle: validated create, merge-and-revalidate update, and
//! reference-guarded delete.
//!
//! Name uniqueness is a scan over [`MediaTypeRepository::list_all`] followed by
//! the write. Two concurrent creates with the same name can both pass the scan;
//! the PostgreSQL store closes that gap with a unique index on the normalized
//! name, and the duplicate write surfaces as a `name` validation error.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{CreateMediaTypeRequest, MediaTypeDefinition, UpdateMediaTypeRequest};
use crate::schema::prepare_definition;
use crate::traits::{MediaReferenceCounter, MediaTypeRepository};
use crate::{Error, Result};

/// Service owning every write to media type definitions.
#[derive(Clone)]
pub struct MediaTypeRegistry {
    repo: Arc<dyn MediaTypeRepository>,
    references: Arc<dyn MediaReferenceCounter>,
}

impl MediaTypeRegistry {
    pub fn new(
        repo: Arc<dyn MediaTypeRepository>,
        references: Arc<dyn MediaReferenceCounter>,
    ) -> Self {
        Self { repo, references }
    }

    pub async fn get(&self, id: Uuid) -> Result<MediaTypeDefinition> {
        self.repo
            .get(id)
            .await?
            .ok_or(Error::MediaTypeNotFound(id))
    }

    /// All definitions, sorted by name (case-insensitive).
    pub async fn list(&self) -> Result<Vec<MediaTypeDefinition>> {
        let mut all = self.repo.list_all().await?;
        all.sort_by_key(|d| d.name.to_lowercase());
        Ok(all)
    }

    /// Validate and persist a new definition. Nothing is written on failure.
    pub async fn create(&self, req: CreateMediaTypeRequest) -> Result<MediaTypeDefinition> {
        let start = Instant::now();
        let now = Utc::now();
        let candidate = MediaTypeDefinition {
            id: Uuid::now_v7(),
            name: req.name,
            description: req.description,
            color: req.color,
            allowed_formats: req.allowed_formats,
            fields: req.fields,
            default_tags: req.default_tags,
            dimension_constraint: req.dimension_constraint,
            created_at: now,
            updated_at: now,
        };

        let existing = self.repo.list_all().await?;
        let def = prepare_definition(candidate, &existing, None).inspect_err(|e| {
            debug!(
                subsystem = "schema",
                component = "registry",
                op = "create",
                error = %e,
                "Media type rejected"
            );
        })?;

        let stored = self.repo.insert(def).await?;
        info!(
            subsystem = "schema",
            component = "registry",
            op = "create",
            media_type_id = %stored.id,
            media_type_name = %stored.name,
            field_count = stored.fields.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Media type created"
        );
        Ok(stored)
    }

    /// Merge `req` over the stored definition, re-run every invariant against
    /// the merged result, and persist it. Nothing is written on failure.
    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateMediaTypeRequest,
    ) -> Result<MediaTypeDefinition> {
        let current = self.get(id).await?;
        let mut merged = current.merged_with(&req);
        merged.updated_at = Utc::now();

        let existing = self.repo.list_all().await?;
        let def = prepare_definition(merged, &existing, Some(id)).inspect_err(|e| {
            debug!(
                subsystem = "schema",
                component = "registry",
                op = "update",
                media_type_id = %id,
                error = %e,
                "Media type update rejected"
            );
        })?;

        let stored = self.repo.patch(id, def).await?;
        info!(
            subsystem = "schema",
            component = "registry",
            op = "update",
            media_type_id = %id,
            "Media type updated"
        );
        Ok(stored)
    }

    /// Delete a definition unless media items still reference it.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        // Missing ids report not-found before the reference check.
        self.get(id).await?;

        let references = self.references.count_references(id).await?;
        if references > 0 {
            warn!(
                subsystem = "schema",
                component = "registry",
                op = "delete",
                media_type_id = %id,
                references,
                "Delete refused: media type still in use"
            );
            return Err(Error::ReferentialIntegrity { id, references });
        }

        self.repo.delete(id).await?;
        info!(
            subsystem = "schema",
            component = "registry",
            op = "delete",
            media_type_id = %id,
            "Media type deleted"
        );
        Ok(())
    }
}
