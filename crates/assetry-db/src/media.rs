//! Read access to the `media` table for reference checks.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use assetry_core::{Error, MediaReferenceCounter, Result};

pub struct PgMediaReferenceCounter {
    pool: Pool<Postgres>,
}

impl PgMediaReferenceCounter {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaReferenceCounter for PgMediaReferenceCounter {
    async fn count_references(&self, definition_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM media WHERE media_type_id = $1")
                .bind(definition_id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(count)
    }
}
