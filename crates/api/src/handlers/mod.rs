//! HTTP request handlers, grouped by feature.

pub mod ad_hoc;
pub mod advisor;
pub mod device;
pub mod timer;

use sqlx::PgPool;
use studyflow_core::concurrency::find_conflict;
use studyflow_core::error::TimerError;
use studyflow_core::state_machine::SessionSnapshot;
use studyflow_core::types::DbId;
use studyflow_db::models::session::StudySession;
use studyflow_db::repositories::{AdHocRepo, SessionRepo};

use crate::error::{AppError, AppResult};

/// Cross-entity exclusivity guard: at most one actively running timer per
/// student, across plan sessions and ad-hoc plans.
///
/// `exclude_plan` / `exclude_ad_hoc` carve out the entity being acted on
/// so it never conflicts with itself. Races that slip between this check
/// and the write land on the partial unique indexes instead.
pub(crate) async fn ensure_no_running_conflict(
    pool: &PgPool,
    student_id: DbId,
    exclude_plan: Option<DbId>,
    exclude_ad_hoc: Option<DbId>,
) -> AppResult<()> {
    let open = SessionRepo::list_open_for_student(pool, student_id, exclude_plan).await?;
    let snapshots: Vec<SessionSnapshot> = open.iter().map(StudySession::snapshot).collect();
    let has_running_ad_hoc =
        AdHocRepo::has_running_for_student(pool, student_id, exclude_ad_hoc).await?;

    if let Some(kind) = find_conflict(&snapshots, has_running_ad_hoc) {
        return Err(AppError::Timer(TimerError::ConcurrencyConflict { kind }));
    }
    Ok(())
}
