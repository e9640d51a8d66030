//! Repository for the `plans` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use studyflow_core::types::{DbId, Timestamp};

use crate::models::plan::{CreatePlan, Plan, RemainingPlan};

/// One column list keeps every query returning the same row shape.
const COLUMNS: &str = "id, student_id, tenant_id, plan_date, plan_number, content_id, \
    sequence, planned_start_unit, planned_end_unit, actual_start_time, actual_end_time, \
    total_duration_seconds, paused_duration_seconds, pause_count, completed_amount, \
    progress, memo, created_at, updated_at";

/// Plan reads and single-column timer bookkeeping. Group-wide writes live
/// in `CompletionRepo`.
pub struct PlanRepo;

impl PlanRepo {
    /// Insert a new plan, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePlan) -> Result<Plan, sqlx::Error> {
        let query = format!(
            "INSERT INTO plans
                (student_id, tenant_id, plan_date, plan_number, content_id,
                 sequence, planned_start_unit, planned_end_unit)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Plan>(&query)
            .bind(input.student_id)
            .bind(input.tenant_id)
            .bind(input.plan_date)
            .bind(input.plan_number)
            .bind(input.content_id)
            .bind(input.sequence)
            .bind(input.planned_start_unit)
            .bind(input.planned_end_unit)
            .fetch_one(pool)
            .await
    }

    /// Find a plan owned by the given student.
    pub async fn find_for_student(
        pool: &PgPool,
        id: DbId,
        student_id: DbId,
    ) -> Result<Option<Plan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM plans WHERE id = $1 AND student_id = $2");
        sqlx::query_as::<_, Plan>(&query)
            .bind(id)
            .bind(student_id)
            .fetch_optional(pool)
            .await
    }

    /// Record the first start. `actual_start_time` is written only if it
    /// is still NULL, so restarting after a settled session keeps the
    /// original start for duration math.
    pub async fn mark_started(
        pool: &PgPool,
        id: DbId,
        started_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE plans
             SET actual_start_time = COALESCE(actual_start_time, $2), updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(started_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Bump the pause counter. Returns `true` if the row existed.
    pub async fn increment_pause_count(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE plans SET pause_count = pause_count + 1, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Net seconds studied across the student's completed plans on one
    /// day. Feeds the advisor's break recommendation.
    pub async fn total_net_seconds_for_day(
        pool: &PgPool,
        student_id: DbId,
        plan_date: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        let row: (Option<i64>,) = sqlx::query_as(
            "SELECT SUM(GREATEST(0, total_duration_seconds - paused_duration_seconds))::bigint
             FROM plans
             WHERE student_id = $1
               AND plan_date = $2
               AND actual_end_time IS NOT NULL",
        )
        .bind(student_id)
        .bind(plan_date)
        .fetch_one(pool)
        .await?;
        Ok(row.0.unwrap_or(0))
    }

    /// Remaining (not yet completed) same-day plans for the advisor, in
    /// priority order, excluding the plan that was just finished. Titles
    /// and subjects come from the linked content.
    pub async fn list_remaining_for_day(
        pool: &PgPool,
        student_id: DbId,
        plan_date: NaiveDate,
        exclude_plan: DbId,
    ) -> Result<Vec<RemainingPlan>, sqlx::Error> {
        sqlx::query_as::<_, RemainingPlan>(
            "SELECT p.id, COALESCE(c.title, 'Untitled plan') AS title, c.subject
             FROM plans p
             LEFT JOIN contents c ON c.id = p.content_id
             WHERE p.student_id = $1
               AND p.plan_date = $2
               AND p.id <> $3
               AND p.actual_end_time IS NULL
             ORDER BY p.sequence NULLS LAST, p.id",
        )
        .bind(student_id)
        .bind(plan_date)
        .bind(exclude_plan)
        .fetch_all(pool)
        .await
    }
}
