//! Group completion, session settlement, and group reset.
//!
//! Everything here runs in a single transaction per call. Completion is
//! the only writer of `content_progress` and of plan completion fields,
//! which keeps the denormalized rows consistent with the plans they
//! mirror: either the whole group of sibling plans, their progress rows,
//! the aggregate, and the session closes land together, or none do.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use studyflow_core::elapsed;
use studyflow_core::types::{DbId, Timestamp};

/// Inputs to [`CompletionRepo::complete_group`]. Preconditions (ownership,
/// transition legality, capacity validation) are the caller's job; by the
/// time this runs, only the atomic write remains.
#[derive(Debug)]
pub struct CompleteGroupArgs<'a> {
    pub student_id: DbId,
    pub tenant_id: Option<DbId>,
    pub lead_plan_id: DbId,
    pub plan_date: NaiveDate,
    pub plan_number: Option<i32>,
    pub content_id: DbId,
    pub content_type: &'a str,
    pub start_unit: i32,
    pub end_unit: i32,
    pub completed_amount: i32,
    pub progress: i32,
    pub memo: Option<&'a str>,
    /// Content capacity, for recomputing the aggregate's capped progress
    /// as it accumulates.
    pub capacity: i32,
    pub ended_at: Timestamp,
}

/// What a committed group completion did.
#[derive(Debug)]
pub struct GroupCompletionOutcome {
    pub plan_ids: Vec<DbId>,
    /// Lead plan's final net study seconds (wall clock minus all pauses).
    pub net_seconds: i64,
    pub sessions_closed: u64,
}

/// Result of closing a plan's dangling sessions before completion.
#[derive(Debug)]
pub struct SettledSessions {
    pub closed: u64,
    /// In-flight pause seconds folded into the plan's flushed total.
    pub flushed_pause_seconds: i64,
}

/// What a group reset removed.
#[derive(Debug)]
pub struct ResetOutcome {
    pub plans_reset: u64,
    pub sessions_deleted: u64,
    pub progress_rows_deleted: u64,
}

#[derive(Debug, sqlx::FromRow)]
struct GroupPlanRow {
    id: DbId,
    content_id: Option<DbId>,
    actual_start_time: Option<Timestamp>,
    actual_end_time: Option<Timestamp>,
    paused_duration_seconds: i64,
    completed_amount: Option<i32>,
}

#[derive(Debug, sqlx::FromRow)]
struct OpenSessionRow {
    id: DbId,
    plan_id: Option<DbId>,
    paused_at: Option<Timestamp>,
    resumed_at: Option<Timestamp>,
}

impl OpenSessionRow {
    fn is_paused(&self) -> bool {
        studyflow_core::state_machine::SessionSnapshot {
            paused_at: self.paused_at,
            resumed_at: self.resumed_at,
        }
        .is_paused()
    }
}

/// Atomic multi-plan writes keyed by the logical plan group.
pub struct CompletionRepo;

impl CompletionRepo {
    /// Lock and load the plan group: all plans sharing (student, date,
    /// plan_number), or just the lead plan when it has no group number.
    async fn lock_group(
        tx: &mut Transaction<'_, Postgres>,
        student_id: DbId,
        lead_plan_id: DbId,
        plan_date: NaiveDate,
        plan_number: Option<i32>,
    ) -> Result<Vec<GroupPlanRow>, sqlx::Error> {
        const GROUP_COLUMNS: &str = "id, content_id, actual_start_time, actual_end_time, \
            paused_duration_seconds, completed_amount";

        let rows: Vec<GroupPlanRow> = if let Some(number) = plan_number {
            sqlx::query_as(&format!(
                "SELECT {GROUP_COLUMNS} FROM plans
                 WHERE student_id = $1 AND plan_date = $2 AND plan_number = $3
                 ORDER BY id
                 FOR UPDATE"
            ))
            .bind(student_id)
            .bind(plan_date)
            .bind(number)
            .fetch_all(&mut **tx)
            .await?
        } else {
            sqlx::query_as(&format!(
                "SELECT {GROUP_COLUMNS} FROM plans
                 WHERE student_id = $1 AND id = $2
                 FOR UPDATE"
            ))
            .bind(student_id)
            .bind(lead_plan_id)
            .fetch_all(&mut **tx)
            .await?
        };
        Ok(rows)
    }

    /// Complete a plan and its logical-group siblings atomically.
    ///
    /// Returns `Ok(None)` without writing anything when the lead plan is
    /// already completed (or gone), which makes a double completion a
    /// clean rejection instead of a double count. Timing is computed per
    /// sibling: siblings may have started at different times and carry
    /// their own pause totals and open sessions.
    pub async fn complete_group(
        pool: &PgPool,
        args: &CompleteGroupArgs<'_>,
    ) -> Result<Option<GroupCompletionOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let group = Self::lock_group(
            &mut tx,
            args.student_id,
            args.lead_plan_id,
            args.plan_date,
            args.plan_number,
        )
        .await?;

        // Gate on the lead plan under the row lock: a concurrent
        // completion that committed first turns this call into a no-op.
        let Some(lead) = group.iter().find(|p| p.id == args.lead_plan_id) else {
            return Ok(None);
        };
        if lead.actual_end_time.is_some() {
            return Ok(None);
        }

        let plan_ids: Vec<DbId> = group.iter().map(|p| p.id).collect();

        let open_sessions: Vec<OpenSessionRow> = sqlx::query_as(
            "SELECT id, plan_id, paused_at, resumed_at FROM study_sessions
             WHERE plan_id = ANY($1) AND ended_at IS NULL",
        )
        .bind(&plan_ids)
        .fetch_all(&mut *tx)
        .await?;

        let mut lead_net_seconds = 0;
        for plan in &group {
            // An open paused session contributes its in-flight pause up
            // to the completion instant, flushed here exactly once.
            let in_flight: i64 = open_sessions
                .iter()
                .filter(|s| s.plan_id == Some(plan.id) && s.is_paused())
                .filter_map(|s| s.paused_at)
                .map(|paused| elapsed::seconds_between(paused, args.ended_at))
                .sum();
            let total_paused = plan.paused_duration_seconds + in_flight;
            let total_duration = plan
                .actual_start_time
                .map(|started| elapsed::seconds_between(started, args.ended_at));

            if plan.id == args.lead_plan_id {
                lead_net_seconds = plan
                    .actual_start_time
                    .map(|started| elapsed::final_net_seconds(started, args.ended_at, total_paused))
                    .unwrap_or(0);
            }

            sqlx::query(
                "UPDATE plans
                 SET actual_end_time = $2,
                     total_duration_seconds = $3,
                     paused_duration_seconds = $4,
                     completed_amount = $5,
                     progress = $6,
                     memo = COALESCE($7, memo),
                     updated_at = now()
                 WHERE id = $1",
            )
            .bind(plan.id)
            .bind(args.ended_at)
            .bind(total_duration)
            .bind(total_paused)
            .bind(args.completed_amount)
            .bind(args.progress)
            .bind(args.memo)
            .execute(&mut *tx)
            .await?;

            // Per-plan progress row: replaced wholesale on re-completion
            // after a reset.
            sqlx::query(
                "INSERT INTO content_progress
                     (student_id, tenant_id, plan_id, content_id, content_type,
                      progress, start_unit, end_unit, completed_amount, last_updated)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                 ON CONFLICT (student_id, plan_id) WHERE plan_id IS NOT NULL
                 DO UPDATE SET
                     content_id = EXCLUDED.content_id,
                     content_type = EXCLUDED.content_type,
                     progress = EXCLUDED.progress,
                     start_unit = EXCLUDED.start_unit,
                     end_unit = EXCLUDED.end_unit,
                     completed_amount = EXCLUDED.completed_amount,
                     last_updated = EXCLUDED.last_updated",
            )
            .bind(args.student_id)
            .bind(args.tenant_id)
            .bind(plan.id)
            .bind(args.content_id)
            .bind(args.content_type)
            .bind(args.progress)
            .bind(args.start_unit)
            .bind(args.end_unit)
            .bind(args.completed_amount)
            .bind(args.ended_at)
            .execute(&mut *tx)
            .await?;
        }

        // Plan-independent aggregate: accumulate once per completion, not
        // per sibling, recomputing capped progress over the running total.
        sqlx::query(
            "INSERT INTO content_progress
                 (student_id, tenant_id, plan_id, content_id, content_type,
                  progress, completed_amount, last_updated)
             VALUES ($1, $2, NULL, $3, $4, $5, $6, $7)
             ON CONFLICT (student_id, content_id) WHERE plan_id IS NULL
             DO UPDATE SET
                 completed_amount = content_progress.completed_amount + EXCLUDED.completed_amount,
                 progress = LEAST(
                     100,
                     ROUND((content_progress.completed_amount + EXCLUDED.completed_amount)::numeric
                           * 100 / $8)
                 )::int,
                 last_updated = EXCLUDED.last_updated",
        )
        .bind(args.student_id)
        .bind(args.tenant_id)
        .bind(args.content_id)
        .bind(args.content_type)
        .bind(args.progress)
        .bind(args.completed_amount)
        .bind(args.ended_at)
        .bind(args.capacity)
        .execute(&mut *tx)
        .await?;

        // Close every session still open on any sibling. Idempotent:
        // already-closed rows simply do not match.
        let closed = sqlx::query(
            "UPDATE study_sessions SET ended_at = $1
             WHERE plan_id = ANY($2) AND ended_at IS NULL",
        )
        .bind(args.ended_at)
        .bind(&plan_ids)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(Some(GroupCompletionOutcome {
            plan_ids,
            net_seconds: lead_net_seconds,
            sessions_closed: closed,
        }))
    }

    /// Close any dangling open sessions for one plan, folding in-flight
    /// pause time into the plan's flushed total. Used by completion
    /// preparation so the confirmation form shows settled numbers.
    pub async fn settle_open_sessions(
        pool: &PgPool,
        plan_id: DbId,
        student_id: DbId,
        now: Timestamp,
    ) -> Result<SettledSessions, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let open: Vec<OpenSessionRow> = sqlx::query_as(
            "SELECT id, plan_id, paused_at, resumed_at FROM study_sessions
             WHERE plan_id = $1 AND student_id = $2 AND ended_at IS NULL
             FOR UPDATE",
        )
        .bind(plan_id)
        .bind(student_id)
        .fetch_all(&mut *tx)
        .await?;

        if open.is_empty() {
            return Ok(SettledSessions {
                closed: 0,
                flushed_pause_seconds: 0,
            });
        }

        let flushed: i64 = open
            .iter()
            .filter(|s| s.is_paused())
            .filter_map(|s| s.paused_at)
            .map(|paused| elapsed::seconds_between(paused, now))
            .sum();

        let closed = sqlx::query(
            "UPDATE study_sessions SET ended_at = $1
             WHERE plan_id = $2 AND student_id = $3 AND ended_at IS NULL",
        )
        .bind(now)
        .bind(plan_id)
        .bind(student_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if flushed > 0 {
            sqlx::query(
                "UPDATE plans
                 SET paused_duration_seconds = paused_duration_seconds + $2, updated_at = now()
                 WHERE id = $1",
            )
            .bind(plan_id)
            .bind(flushed)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(SettledSessions {
            closed,
            flushed_pause_seconds: flushed,
        })
    }

    /// Wipe a plan group's timer history so the student can redo it from
    /// scratch: delete its sessions and per-plan progress rows, subtract
    /// its recorded amount from the aggregate, and zero the plans' timer
    /// fields.
    pub async fn reset_group(
        pool: &PgPool,
        student_id: DbId,
        lead_plan_id: DbId,
        plan_date: NaiveDate,
        plan_number: Option<i32>,
        capacity: Option<i32>,
        now: Timestamp,
    ) -> Result<Option<ResetOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let group =
            Self::lock_group(&mut tx, student_id, lead_plan_id, plan_date, plan_number).await?;
        let Some(lead) = group.iter().find(|p| p.id == lead_plan_id) else {
            return Ok(None);
        };
        let plan_ids: Vec<DbId> = group.iter().map(|p| p.id).collect();

        let sessions_deleted = sqlx::query("DELETE FROM study_sessions WHERE plan_id = ANY($1)")
            .bind(&plan_ids)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let progress_rows_deleted = sqlx::query(
            "DELETE FROM content_progress WHERE student_id = $1 AND plan_id = ANY($2)",
        )
        .bind(student_id)
        .bind(&plan_ids)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        // The aggregate accumulated this group's amount once at
        // completion; undo it once so a redo cannot double-count.
        if let (Some(content_id), Some(amount)) = (lead.content_id, lead.completed_amount) {
            if amount > 0 {
                sqlx::query(
                    "UPDATE content_progress
                     SET completed_amount = GREATEST(0, completed_amount - $1),
                         progress = CASE
                             WHEN $2::int IS NULL OR $2 <= 0 THEN 0
                             ELSE LEAST(
                                 100,
                                 ROUND(GREATEST(0, completed_amount - $1)::numeric * 100 / $2)
                             )::int
                         END,
                         last_updated = $3
                     WHERE student_id = $4 AND content_id = $5 AND plan_id IS NULL",
                )
                .bind(amount)
                .bind(capacity)
                .bind(now)
                .bind(student_id)
                .bind(content_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        let plans_reset = sqlx::query(
            "UPDATE plans
             SET actual_start_time = NULL,
                 actual_end_time = NULL,
                 total_duration_seconds = NULL,
                 paused_duration_seconds = 0,
                 pause_count = 0,
                 completed_amount = NULL,
                 progress = 0,
                 memo = NULL,
                 updated_at = now()
             WHERE id = ANY($1)",
        )
        .bind(&plan_ids)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok(Some(ResetOutcome {
            plans_reset,
            sessions_deleted,
            progress_rows_deleted,
        }))
    }
}
