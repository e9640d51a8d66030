//! Repository for the `contents` table.

use sqlx::PgPool;
use studyflow_core::types::DbId;

use crate::models::content::{Content, CreateContent};

/// One column list keeps every query returning the same row shape.
const COLUMNS: &str = "id, tenant_id, content_type, title, subject, total_units, created_at";

/// Capacity lookups for completion math, plus insert for tests and seeds.
pub struct ContentRepo;

impl ContentRepo {
    /// Insert a new content, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateContent) -> Result<Content, sqlx::Error> {
        let query = format!(
            "INSERT INTO contents (tenant_id, content_type, title, subject, total_units)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Content>(&query)
            .bind(input.tenant_id)
            .bind(&input.content_type)
            .bind(&input.title)
            .bind(&input.subject)
            .bind(input.total_units)
            .fetch_one(pool)
            .await
    }

    /// Find a content by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Content>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contents WHERE id = $1");
        sqlx::query_as::<_, Content>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
