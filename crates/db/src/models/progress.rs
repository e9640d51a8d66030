//! Content progress entity model.

use serde::Serialize;
use sqlx::FromRow;
use studyflow_core::types::{DbId, Timestamp};

/// A row from the `content_progress` table.
///
/// Two row shapes share the table: per-plan rows (`plan_id` set, replaced
/// on re-completion) and the per-content aggregate (`plan_id` NULL,
/// accumulated across completions). Each shape has its own unique key.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentProgress {
    pub id: DbId,
    pub student_id: DbId,
    pub tenant_id: Option<DbId>,
    pub plan_id: Option<DbId>,
    pub content_id: Option<DbId>,
    pub content_type: String,
    pub progress: i32,
    pub start_unit: Option<i32>,
    pub end_unit: Option<i32>,
    pub completed_amount: i32,
    pub last_updated: Timestamp,
}
