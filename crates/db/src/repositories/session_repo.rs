//! Repository for the `study_sessions` table.
//!
//! Partial unique indexes back the writes here: one open session per
//! (student, plan), one actively-running session per student. Inserts and
//! resume updates can therefore fail with a unique violation under races;
//! callers surface that as a concurrency conflict.

use sqlx::PgPool;
use studyflow_core::types::{DbId, Timestamp};

use crate::models::session::{StartSession, StudySession};

/// One column list keeps every query returning the same row shape.
const COLUMNS: &str = "id, plan_id, student_id, started_at, paused_at, resumed_at, \
    ended_at, device_session_id, device_info, last_heartbeat, created_at";

/// Open/close, pause/resume, heartbeat, and ownership writes for study
/// sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Open a new session, returning the created row. The opening instant
    /// doubles as the first heartbeat.
    ///
    /// Races with another start slip past the application-level guard and
    /// land on `uq_study_sessions_running_per_student` here.
    pub async fn start(
        pool: &PgPool,
        input: &StartSession,
        started_at: Timestamp,
    ) -> Result<StudySession, sqlx::Error> {
        let query = format!(
            "INSERT INTO study_sessions
                 (plan_id, student_id, started_at, device_session_id, device_info, last_heartbeat)
             VALUES ($1, $2, $3, $4, $5, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StudySession>(&query)
            .bind(input.plan_id)
            .bind(input.student_id)
            .bind(started_at)
            .bind(&input.device_session_id)
            .bind(&input.device_info)
            .fetch_one(pool)
            .await
    }

    /// The open session for a plan, if any. The unique index caps open
    /// sessions per plan at one; ordering guards against legacy rows.
    pub async fn find_open_for_plan(
        pool: &PgPool,
        plan_id: DbId,
        student_id: DbId,
    ) -> Result<Option<StudySession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM study_sessions
             WHERE plan_id = $1 AND student_id = $2 AND ended_at IS NULL
             ORDER BY started_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, StudySession>(&query)
            .bind(plan_id)
            .bind(student_id)
            .fetch_optional(pool)
            .await
    }

    /// Find an open session by id, scoped to its owner.
    pub async fn find_open_by_id(
        pool: &PgPool,
        id: DbId,
        student_id: DbId,
    ) -> Result<Option<StudySession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM study_sessions
             WHERE id = $1 AND student_id = $2 AND ended_at IS NULL"
        );
        sqlx::query_as::<_, StudySession>(&query)
            .bind(id)
            .bind(student_id)
            .fetch_optional(pool)
            .await
    }

    /// All open plan-linked sessions for a student, optionally excluding
    /// one plan. Orphan sessions (`plan_id` NULL) cannot represent a
    /// running plan timer and are excluded here.
    pub async fn list_open_for_student(
        pool: &PgPool,
        student_id: DbId,
        exclude_plan: Option<DbId>,
    ) -> Result<Vec<StudySession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM study_sessions
             WHERE student_id = $1
               AND ended_at IS NULL
               AND plan_id IS NOT NULL
               AND ($2::bigint IS NULL OR plan_id <> $2)
             ORDER BY started_at DESC"
        );
        sqlx::query_as::<_, StudySession>(&query)
            .bind(student_id)
            .bind(exclude_plan)
            .fetch_all(pool)
            .await
    }

    /// Mark an open session paused. Clearing `resumed_at` keeps the
    /// derived rule single-sourced: paused means "paused_at set, no later
    /// resume". Returns `true` if a row was updated.
    pub async fn pause(pool: &PgPool, id: DbId, paused_at: Timestamp) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE study_sessions
             SET paused_at = $2, resumed_at = NULL
             WHERE id = $1 AND ended_at IS NULL",
        )
        .bind(id)
        .bind(paused_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Resume a paused session and fold the finished pause interval into
    /// the plan's flushed-pause total, in one transaction.
    ///
    /// The resume update re-enters `uq_study_sessions_running_per_student`,
    /// so racing against another start fails here with a unique violation.
    pub async fn resume_and_flush(
        pool: &PgPool,
        id: DbId,
        plan_id: DbId,
        pause_seconds: i64,
        resumed_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE study_sessions
             SET resumed_at = $2, last_heartbeat = $2
             WHERE id = $1 AND ended_at IS NULL",
        )
        .bind(id)
        .bind(resumed_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE plans
             SET paused_duration_seconds = paused_duration_seconds + $2, updated_at = now()
             WHERE id = $1",
        )
        .bind(plan_id)
        .bind(pause_seconds)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Refresh the liveness heartbeat on an open session. A `false`
    /// return means the session is closed or foreign; callers treat both
    /// as a no-op, not an error.
    pub async fn refresh_heartbeat(
        pool: &PgPool,
        id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE study_sessions
             SET last_heartbeat = now()
             WHERE id = $1 AND student_id = $2 AND ended_at IS NULL",
        )
        .bind(id)
        .bind(student_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Rewrite a session's device ownership without touching timer state.
    /// Returns the updated row, or `None` if no open session matched.
    pub async fn takeover(
        pool: &PgPool,
        id: DbId,
        student_id: DbId,
        device_session_id: &str,
        device_info: Option<&str>,
    ) -> Result<Option<StudySession>, sqlx::Error> {
        let query = format!(
            "UPDATE study_sessions
             SET device_session_id = $3, device_info = $4, last_heartbeat = now()
             WHERE id = $1 AND student_id = $2 AND ended_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StudySession>(&query)
            .bind(id)
            .bind(student_id)
            .bind(device_session_id)
            .bind(device_info)
            .fetch_optional(pool)
            .await
    }
}
