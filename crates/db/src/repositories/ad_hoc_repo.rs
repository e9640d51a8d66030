//! Repository for the `ad_hoc_plans` table.
//!
//! Status transitions use compare-and-set WHERE clauses: the UPDATE only
//! matches when the row is still in the expected source status, so a
//! `None` return means a concurrent request won.

use sqlx::PgPool;
use studyflow_core::ad_hoc::AdHocStatus;
use studyflow_core::types::{DbId, Timestamp};

use crate::models::ad_hoc::{AdHocPlan, CreateAdHocPlan};

/// One column list keeps every query returning the same row shape.
const COLUMNS: &str = "id, student_id, tenant_id, title, subject, plan_date, status, \
    started_at, completed_at, actual_minutes, created_at, updated_at";

/// Lifecycle writes for ad-hoc (unplanned) activities.
pub struct AdHocRepo;

impl AdHocRepo {
    /// Insert a new ad-hoc plan in `pending`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        student_id: DbId,
        tenant_id: Option<DbId>,
        input: &CreateAdHocPlan,
    ) -> Result<AdHocPlan, sqlx::Error> {
        let query = format!(
            "INSERT INTO ad_hoc_plans (student_id, tenant_id, title, subject, plan_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdHocPlan>(&query)
            .bind(student_id)
            .bind(tenant_id)
            .bind(&input.title)
            .bind(&input.subject)
            .bind(input.plan_date)
            .fetch_one(pool)
            .await
    }

    /// Find an ad-hoc plan owned by the given student.
    pub async fn find_for_student(
        pool: &PgPool,
        id: DbId,
        student_id: DbId,
    ) -> Result<Option<AdHocPlan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ad_hoc_plans WHERE id = $1 AND student_id = $2");
        sqlx::query_as::<_, AdHocPlan>(&query)
            .bind(id)
            .bind(student_id)
            .fetch_optional(pool)
            .await
    }

    /// All of a student's ad-hoc plans for one day, newest first.
    pub async fn list_for_day(
        pool: &PgPool,
        student_id: DbId,
        plan_date: chrono::NaiveDate,
    ) -> Result<Vec<AdHocPlan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ad_hoc_plans
             WHERE student_id = $1 AND plan_date = $2
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, AdHocPlan>(&query)
            .bind(student_id)
            .bind(plan_date)
            .fetch_all(pool)
            .await
    }

    /// Whether the student has an in-progress ad-hoc plan, optionally
    /// excluding one id.
    pub async fn has_running_for_student(
        pool: &PgPool,
        student_id: DbId,
        exclude: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                 SELECT 1 FROM ad_hoc_plans
                 WHERE student_id = $1
                   AND status = 'in_progress'
                   AND ($2::bigint IS NULL OR id <> $2)
             )",
        )
        .bind(student_id)
        .bind(exclude)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// pending -> in_progress. `None` means the row was no longer pending.
    ///
    /// Races land on `uq_ad_hoc_plans_running_per_student` as a unique
    /// violation.
    pub async fn start(
        pool: &PgPool,
        id: DbId,
        student_id: DbId,
        started_at: Timestamp,
    ) -> Result<Option<AdHocPlan>, sqlx::Error> {
        let query = format!(
            "UPDATE ad_hoc_plans
             SET status = $3, started_at = $4, updated_at = now()
             WHERE id = $1 AND student_id = $2 AND status = $5
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdHocPlan>(&query)
            .bind(id)
            .bind(student_id)
            .bind(AdHocStatus::InProgress.as_str())
            .bind(started_at)
            .bind(AdHocStatus::Pending.as_str())
            .fetch_optional(pool)
            .await
    }

    /// in_progress -> completed. `None` means the row was not in progress.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        student_id: DbId,
        completed_at: Timestamp,
        actual_minutes: i32,
    ) -> Result<Option<AdHocPlan>, sqlx::Error> {
        let query = format!(
            "UPDATE ad_hoc_plans
             SET status = $3, completed_at = $4, actual_minutes = $5, updated_at = now()
             WHERE id = $1 AND student_id = $2 AND status = $6
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdHocPlan>(&query)
            .bind(id)
            .bind(student_id)
            .bind(AdHocStatus::Completed.as_str())
            .bind(completed_at)
            .bind(actual_minutes)
            .bind(AdHocStatus::InProgress.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Any non-terminal status -> cancelled. Elapsed time is discarded.
    /// `None` means the row was already terminal.
    pub async fn cancel(
        pool: &PgPool,
        id: DbId,
        student_id: DbId,
    ) -> Result<Option<AdHocPlan>, sqlx::Error> {
        let query = format!(
            "UPDATE ad_hoc_plans
             SET status = $3, updated_at = now()
             WHERE id = $1 AND student_id = $2 AND status NOT IN ($3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdHocPlan>(&query)
            .bind(id)
            .bind(student_id)
            .bind(AdHocStatus::Cancelled.as_str())
            .bind(AdHocStatus::Completed.as_str())
            .fetch_optional(pool)
            .await
    }
}
