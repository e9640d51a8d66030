//! Plan entity model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studyflow_core::state_machine::PlanTimerSnapshot;
use studyflow_core::types::{DbId, Timestamp};

/// A row from the `plans` table.
///
/// Timer bookkeeping lives directly on the plan: `paused_duration_seconds`
/// is the single flushed-pause accumulator (sessions never carry one), and
/// `actual_end_time` is set at most once, by the completion transaction.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plan {
    pub id: DbId,
    pub student_id: DbId,
    pub tenant_id: Option<DbId>,
    pub plan_date: NaiveDate,
    /// Logical-group key: plans sharing (student, date, plan_number)
    /// complete and reset together. NULL means the plan stands alone.
    pub plan_number: Option<i32>,
    pub content_id: Option<DbId>,
    pub sequence: Option<i32>,
    pub planned_start_unit: Option<i32>,
    pub planned_end_unit: Option<i32>,
    pub actual_start_time: Option<Timestamp>,
    pub actual_end_time: Option<Timestamp>,
    pub total_duration_seconds: Option<i64>,
    pub paused_duration_seconds: i64,
    pub pause_count: i32,
    pub completed_amount: Option<i32>,
    pub progress: i32,
    pub memo: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Plan {
    /// Timer-relevant facts for the state machine.
    pub fn timer_snapshot(&self) -> PlanTimerSnapshot {
        PlanTimerSnapshot {
            started: self.actual_start_time.is_some(),
            completed: self.actual_end_time.is_some(),
        }
    }
}

/// Fields required to insert a plan (tests and seeds).
#[derive(Debug, Deserialize)]
pub struct CreatePlan {
    pub student_id: DbId,
    pub tenant_id: Option<DbId>,
    pub plan_date: NaiveDate,
    pub plan_number: Option<i32>,
    pub content_id: Option<DbId>,
    pub sequence: Option<i32>,
    pub planned_start_unit: Option<i32>,
    pub planned_end_unit: Option<i32>,
}

/// Advisor candidate: a remaining same-day plan joined with its content's
/// title and subject.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RemainingPlan {
    pub id: DbId,
    pub title: String,
    pub subject: Option<String>,
}
