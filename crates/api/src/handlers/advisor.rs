//! Next-plan suggestion handler.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use studyflow_core::advisor::{self, CandidatePlan, NextPlanSuggestion};
use studyflow_core::error::TimerError;
use studyflow_core::types::{DbId, Timestamp};
use studyflow_db::repositories::{ContentRepo, PlanRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthStudent;
use crate::response::DataResponse;
use crate::state::AppState;

/// Suggestion plus the inputs it was derived from, so clients can render
/// "you studied N minutes today" alongside it.
#[derive(Debug, Serialize)]
pub struct NextSuggestion {
    pub suggestion: NextPlanSuggestion,
    pub net_study_minutes: i64,
    pub remaining_count: usize,
    pub server_time: Timestamp,
}

/// GET /api/v1/plans/{id}/next-suggestion
///
/// What to do after finishing this plan. Purely advisory and recomputed
/// from persisted data on every call; it never mutates timer state, so a
/// stale answer is harmless.
pub async fn next_suggestion(
    student: AuthStudent,
    State(state): State<AppState>,
    Path(plan_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();

    let plan = PlanRepo::find_for_student(&state.pool, plan_id, student.student_id)
        .await?
        .ok_or(AppError::Timer(TimerError::NotFound {
            entity: "Plan",
            id: plan_id,
        }))?;

    // Subject affinity keys off the just-finished plan's content.
    let completed_subject = match plan.content_id {
        Some(content_id) => ContentRepo::find_by_id(&state.pool, content_id)
            .await?
            .and_then(|c| c.subject),
        None => None,
    };

    let net_study_minutes =
        PlanRepo::total_net_seconds_for_day(&state.pool, student.student_id, plan.plan_date)
            .await?
            / 60;

    let remaining =
        PlanRepo::list_remaining_for_day(&state.pool, student.student_id, plan.plan_date, plan.id)
            .await?;
    let candidates: Vec<CandidatePlan> = remaining
        .into_iter()
        .map(|p| CandidatePlan {
            plan_id: p.id,
            title: p.title,
            subject: p.subject,
        })
        .collect();

    let suggestion = advisor::suggest(completed_subject.as_deref(), net_study_minutes, &candidates);

    Ok(Json(DataResponse {
        data: NextSuggestion {
            suggestion,
            net_study_minutes,
            remaining_count: candidates.len(),
            server_time: now,
        },
    }))
}
