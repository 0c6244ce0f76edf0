//! In-memory stores for running without PostgreSQL and for tests.
//!
//! [`InMemoryMediaTypeRepository`] enforces the same normalized-name
//! uniqueness as the `idx_media_type_name_unique` index so both backends
//! reject the same writes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use assetry_core::schema::name_key;
use assetry_core::{
    Error, MediaReferenceCounter, MediaTypeDefinition, MediaTypeRepository, Result,
};

#[derive(Clone, Default)]
pub struct InMemoryMediaTypeRepository {
    inner: Arc<RwLock<HashMap<Uuid, MediaTypeDefinition>>>,
}

impl InMemoryMediaTypeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

fn ensure_name_free(
    store: &HashMap<Uuid, MediaTypeDefinition>,
    name: &str,
    exclude: Option<Uuid>,
) -> Result<()> {
    let key = name_key(name);
    let taken = store
        .values()
        .any(|d| Some(d.id) != exclude && name_key(&d.name) == key);
    if taken {
        return Err(Error::schema(
            "name",
            "a media type with this name already exists",
        ));
    }
    Ok(())
}

#[async_trait]
impl MediaTypeRepository for InMemoryMediaTypeRepository {
    async fn insert(&self, def: MediaTypeDefinition) -> Result<MediaTypeDefinition> {
        let mut store = self.inner.write().await;
        ensure_name_free(&store, &def.name, None)?;
        store.insert(def.id, def.clone());
        Ok(def)
    }

    async fn patch(&self, id: Uuid, def: MediaTypeDefinition) -> Result<MediaTypeDefinition> {
        let mut store = self.inner.write().await;
        if !store.contains_key(&id) {
            return Err(Error::MediaTypeNotFound(id));
        }
        ensure_name_free(&store, &def.name, Some(id))?;
        let stored = MediaTypeDefinition { id, ..def };
        store.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: Uuid) -> Result<Option<MediaTypeDefinition>> {
        Ok(self.inner.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<MediaTypeDefinition>> {
        Ok(self.inner.read().await.values().cloned().collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        match self.inner.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(Error::MediaTypeNotFound(id)),
        }
    }
}

/// Tracks which media items point at which media type.
#[derive(Clone, Default)]
pub struct InMemoryMediaIndex {
    inner: Arc<RwLock<HashMap<Uuid, Uuid>>>,
}

impl InMemoryMediaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a media item of the given type and return its id.
    pub async fn attach(&self, media_type_id: Uuid) -> Uuid {
        let media_id = Uuid::now_v7();
        self.inner.write().await.insert(media_id, media_type_id);
        media_id
    }

    /// Forget a media item. Returns false if it was not tracked.
    pub async fn detach(&self, media_id: Uuid) -> bool {
        self.inner.write().await.remove(&media_id).is_some()
    }
}

#[async_trait]
impl MediaReferenceCounter for InMemoryMediaIndex {
    async fn count_references(&self, definition_id: Uuid) -> Result<i64> {
        let count = self
            .inner
            .read()
            .await
            .values()
            .filter(|t| **t == definition_id)
            .count();
        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn definition(name: &str) -> MediaTypeDefinition {
        let now = Utc::now();
        MediaTypeDefinition {
            id: Uuid::now_v7(),
            name: name.to_string(),
            description: None,
            color: "#6366f1".to_string(),
            allowed_formats: vec!["jpg".to_string()],
            fields: vec![],
            default_tags: vec![],
            dimension_constraint: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_normalized_duplicate() {
        let repo = InMemoryMediaTypeRepository::new();
        repo.insert(definition("Blog Image")).await.unwrap();

        let err = repo.insert(definition("  blog image ")).await.unwrap_err();
        assert!(matches!(err, Error::SchemaValidation { ref field, .. } if field == "name"));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_patch_may_keep_own_name() {
        let repo = InMemoryMediaTypeRepository::new();
        let stored = repo.insert(definition("Poster")).await.unwrap();

        let mut changed = stored.clone();
        changed.name = "POSTER".to_string();
        let patched = repo.patch(stored.id, changed).await.unwrap();
        assert_eq!(patched.name, "POSTER");
    }

    #[tokio::test]
    async fn test_patch_missing_is_not_found() {
        let repo = InMemoryMediaTypeRepository::new();
        let def = definition("Ghost");
        let err = repo.patch(def.id, def).await.unwrap_err();
        assert!(matches!(err, Error::MediaTypeNotFound(_)));
    }

    #[tokio::test]
    async fn test_media_index_counts_by_type() {
        let index = InMemoryMediaIndex::new();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let first = index.attach(a).await;
        index.attach(a).await;
        index.attach(b).await;

        assert_eq!(index.count_references(a).await.unwrap(), 2);
        assert!(index.detach(first).await);
        assert!(!index.detach(first).await);
        assert_eq!(index.count_references(a).await.unwrap(), 1);
        assert_eq!(index.count_references(Uuid::now_v7()).await.unwrap(), 0);
    }
}
