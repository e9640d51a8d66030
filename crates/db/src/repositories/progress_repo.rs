//! Repository for the `content_progress` table.
//!
//! Reads only: both row shapes are written exclusively by the completion
//! transaction in `CompletionRepo`, so progress can never drift from the
//! plans it mirrors.

use sqlx::PgPool;
use studyflow_core::types::DbId;

use crate::models::progress::ContentProgress;

/// One column list keeps every query returning the same row shape.
const COLUMNS: &str = "id, student_id, tenant_id, plan_id, content_id, content_type, \
    progress, start_unit, end_unit, completed_amount, last_updated";

/// Read access to per-plan and aggregate progress rows.
pub struct ProgressRepo;

impl ProgressRepo {
    /// The per-plan progress row written when a plan completes.
    pub async fn find_for_plan(
        pool: &PgPool,
        student_id: DbId,
        plan_id: DbId,
    ) -> Result<Option<ContentProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_progress
             WHERE student_id = $1 AND plan_id = $2"
        );
        sqlx::query_as::<_, ContentProgress>(&query)
            .bind(student_id)
            .bind(plan_id)
            .fetch_optional(pool)
            .await
    }

    /// The plan-independent aggregate row for a content.
    pub async fn find_aggregate(
        pool: &PgPool,
        student_id: DbId,
        content_id: DbId,
    ) -> Result<Option<ContentProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_progress
             WHERE student_id = $1 AND content_id = $2 AND plan_id IS NULL"
        );
        sqlx::query_as::<_, ContentProgress>(&query)
            .bind(student_id)
            .bind(content_id)
            .fetch_optional(pool)
            .await
    }

    /// All progress rows for a student, newest first.
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<ContentProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_progress
             WHERE student_id = $1
             ORDER BY last_updated DESC"
        );
        sqlx::query_as::<_, ContentProgress>(&query)
            .bind(student_id)
            .fetch_all(pool)
            .await
    }
}
