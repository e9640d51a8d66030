//! Reward points ledger entity model.

use serde::Serialize;
use sqlx::FromRow;
use studyflow_core::types::{DbId, Timestamp};

/// A row from the `student_points` ledger. Append-only; balances are sums.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PointsAward {
    pub id: DbId,
    pub student_id: DbId,
    pub points: i32,
    pub reason: String,
    pub source_plan_id: Option<DbId>,
    pub awarded_at: Timestamp,
}
