//! Repository for the `students` table.

use sqlx::PgPool;
use studyflow_core::types::DbId;

use crate::models::student::{CreateStudent, Student};

/// One column list keeps every query returning the same row shape.
const COLUMNS: &str = "id, tenant_id, name, created_at";

/// Minimal access to the platform-owned students table.
pub struct StudentRepo;

impl StudentRepo {
    /// Insert a new student, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateStudent) -> Result<Student, sqlx::Error> {
        let query = format!(
            "INSERT INTO students (tenant_id, name)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(input.tenant_id)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a student by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
