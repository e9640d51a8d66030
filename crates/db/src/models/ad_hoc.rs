//! Ad-hoc plan entity model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studyflow_core::ad_hoc::AdHocStatus;
use studyflow_core::types::{DbId, Timestamp};

/// A row from the `ad_hoc_plans` table.
///
/// Ad-hoc activities are timed without session rows: an explicit text
/// status plus `started_at`/`completed_at` carry the whole lifecycle.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdHocPlan {
    pub id: DbId,
    pub student_id: DbId,
    pub tenant_id: Option<DbId>,
    pub title: String,
    pub subject: Option<String>,
    pub plan_date: NaiveDate,
    pub status: String,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub actual_minutes: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AdHocPlan {
    /// Typed view of the status column. `None` means the column holds a
    /// value this build does not know, which is a schema drift bug.
    pub fn status(&self) -> Option<AdHocStatus> {
        AdHocStatus::parse(&self.status)
    }
}

/// Fields the API accepts when creating an ad-hoc plan. Student and
/// tenant come from the auth token.
#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreateAdHocPlan {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub subject: Option<String>,
    pub plan_date: NaiveDate,
}
