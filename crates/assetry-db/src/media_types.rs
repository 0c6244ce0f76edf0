//! PostgreSQL implementation of MediaTypeRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use assetry_core::{
    DimensionConstraint, Error, FieldSchema, MediaTypeDefinition, MediaTypeRepository, Result,
};

const SELECT_COLUMNS: &str = "id, name, description, color, allowed_formats, fields, \
                              default_tags, dimension_constraint, created_at, updated_at";

pub struct PgMediaTypeRepository {
    pool: Pool<Postgres>,
}

impl PgMediaTypeRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn row_to_definition(row: &PgRow) -> Result<MediaTypeDefinition> {
        let fields: Json<Vec<FieldSchema>> = row.try_get("fields")?;
        let dimension_constraint: Option<Json<DimensionConstraint>> =
            row.try_get("dimension_constraint")?;
        Ok(MediaTypeDefinition {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            color: row.try_get("color")?,
            allowed_formats: row.try_get("allowed_formats")?,
            fields: fields.0,
            default_tags: row.try_get("default_tags")?,
            dimension_constraint: dimension_constraint.map(|c| c.0),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Unique-index violations on the name become the same validation error the
/// registry's scan produces.
fn map_write_error(e: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            debug!(
                subsystem = "database",
                component = "media_types",
                constraint = db_err.constraint().unwrap_or_default(),
                "Unique violation on media type write"
            );
            return Error::schema("name", "a media type with this name already exists");
        }
    }
    Error::Database(e)
}

#[async_trait]
impl MediaTypeRepository for PgMediaTypeRepository {
    async fn insert(&self, def: MediaTypeDefinition) -> Result<MediaTypeDefinition> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO media_type (
                id, name, description, color, allowed_formats, fields,
                default_tags, dimension_constraint, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(def.id)
        .bind(&def.name)
        .bind(&def.description)
        .bind(&def.color)
        .bind(&def.allowed_formats)
        .bind(Json(&def.fields))
        .bind(&def.default_tags)
        .bind(def.dimension_constraint.as_ref().map(Json))
        .bind(def.created_at)
        .bind(def.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Self::row_to_definition(&row)
    }

    async fn patch(&self, id: Uuid, def: MediaTypeDefinition) -> Result<MediaTypeDefinition> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE media_type
            SET name = $2, description = $3, color = $4, allowed_formats = $5,
                fields = $6, default_tags = $7, dimension_constraint = $8,
                updated_at = $9
            WHERE id = $1
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&def.name)
        .bind(&def.description)
        .bind(&def.color)
        .bind(&def.allowed_formats)
        .bind(Json(&def.fields))
        .bind(&def.default_tags)
        .bind(def.dimension_constraint.as_ref().map(Json))
        .bind(def.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        match row {
            Some(row) => Self::row_to_definition(&row),
            None => Err(Error::MediaTypeNotFound(id)),
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<MediaTypeDefinition>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM media_type WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.as_ref().map(Self::row_to_definition).transpose()
    }

    async fn list_all(&self) -> Result<Vec<MediaTypeDefinition>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM media_type ORDER BY lower(name)"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(Self::row_to_definition).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM media_type WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                // The media FK is ON DELETE RESTRICT; a row attached after the
                // registry's count still blocks the delete.
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    Error::ReferentialIntegrity { id, references: 1 }
                }
                _ => Error::Database(e),
            })?;

        if result.rows_affected() == 0 {
            return Err(Error::MediaTypeNotFound(id));
        }
        Ok(())
    }
}
