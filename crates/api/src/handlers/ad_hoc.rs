//! Handlers for ad-hoc (unplanned) activities under `/ad-hoc-plans`.
//!
//! Ad-hoc timers are deliberately simpler than plan timers: no sessions,
//! no pause, no device tracking. A text status plus two timestamps carry
//! the whole lifecycle, and every transition is a compare-and-set UPDATE
//! so concurrent tabs cannot double-apply one.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use studyflow_core::ad_hoc::AdHocStatus;
use studyflow_core::elapsed;
use studyflow_core::error::TimerError;
use studyflow_core::types::DbId;
use studyflow_db::models::ad_hoc::{AdHocPlan, CreateAdHocPlan};
use studyflow_db::models::timer::CompleteAdHocRequest;
use studyflow_db::repositories::AdHocRepo;
use studyflow_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::handlers::ensure_no_running_conflict;
use crate::middleware::auth::AuthStudent;
use crate::response::DataResponse;
use crate::state::AppState;

/// Derived ad-hoc durations are capped at the same bound the explicit
/// override accepts.
const MAX_AD_HOC_MINUTES: i64 = 1440;

#[derive(Debug, Deserialize)]
pub struct AdHocListQuery {
    pub date: NaiveDate,
}

fn not_found(id: DbId) -> AppError {
    AppError::Timer(TimerError::NotFound {
        entity: "Ad-hoc plan",
        id,
    })
}

/// Typed status of a row; an unparseable column value is a schema drift
/// bug, not a user error.
fn status_of(plan: &AdHocPlan) -> AppResult<AdHocStatus> {
    plan.status().ok_or_else(|| {
        AppError::Timer(TimerError::Internal(format!(
            "ad-hoc plan {} has unknown status {:?}",
            plan.id, plan.status
        )))
    })
}

/// POST /api/v1/ad-hoc-plans
///
/// Record an unplanned activity for a given day. Created in `pending`;
/// the timer starts with a separate action.
pub async fn create_ad_hoc(
    student: AuthStudent,
    State(state): State<AppState>,
    Json(input): Json<CreateAdHocPlan>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let plan =
        AdHocRepo::create(&state.pool, student.student_id, student.tenant_id, &input).await?;
    tracing::info!(ad_hoc_id = plan.id, "Ad-hoc plan created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: plan })))
}

/// GET /api/v1/ad-hoc-plans?date=YYYY-MM-DD
///
/// The student's ad-hoc activities for one day, newest first.
pub async fn list_ad_hoc(
    student: AuthStudent,
    State(state): State<AppState>,
    Query(query): Query<AdHocListQuery>,
) -> AppResult<impl IntoResponse> {
    let plans = AdHocRepo::list_for_day(&state.pool, student.student_id, query.date).await?;
    Ok(Json(DataResponse { data: plans }))
}

/// POST /api/v1/ad-hoc-plans/{id}/timer/start
///
/// Start the ad-hoc timer. Subject to the same single-running-timer rule
/// as plan timers: a running plan session blocks this, and vice versa.
pub async fn start_ad_hoc(
    student: AuthStudent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();

    let plan = AdHocRepo::find_for_student(&state.pool, id, student.student_id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let status = status_of(&plan)?;
    if !status.can_start() {
        return Err(AppError::Timer(TimerError::IllegalTransition(format!(
            "ad-hoc plan is {status} and cannot start"
        ))));
    }
    ensure_no_running_conflict(&state.pool, student.student_id, None, Some(id)).await?;

    // CAS update: a concurrent start loses here and in the worst case on
    // the running-per-student index.
    let plan = AdHocRepo::start(&state.pool, id, student.student_id, now)
        .await?
        .ok_or_else(|| {
            AppError::Timer(TimerError::IllegalTransition(
                "ad-hoc plan is no longer pending".to_string(),
            ))
        })?;

    state.event_bus.publish(
        PlatformEvent::new("ad_hoc.started")
            .with_source("ad_hoc_plan", id)
            .with_actor(student.student_id),
    );
    tracing::info!(ad_hoc_id = id, "Ad-hoc timer started");

    Ok(Json(DataResponse { data: plan }))
}

/// POST /api/v1/ad-hoc-plans/{id}/timer/complete
///
/// Finish the ad-hoc timer. Minutes come from the request when given,
/// otherwise they are derived from `started_at` on the server clock.
pub async fn complete_ad_hoc(
    student: AuthStudent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CompleteAdHocRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let now = Utc::now();

    let plan = AdHocRepo::find_for_student(&state.pool, id, student.student_id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let status = status_of(&plan)?;
    if !status.can_complete() {
        return Err(AppError::Timer(TimerError::IllegalTransition(format!(
            "ad-hoc plan is {status} and cannot complete"
        ))));
    }

    let minutes = match (input.actual_minutes, plan.started_at) {
        (Some(minutes), _) => i64::from(minutes),
        (None, Some(started_at)) => {
            // Round to the nearest whole minute.
            ((elapsed::seconds_between(started_at, now) + 30) / 60).clamp(0, MAX_AD_HOC_MINUTES)
        }
        // In-progress rows always carry started_at; guarded anyway.
        (None, None) => 0,
    };

    let plan = AdHocRepo::complete(&state.pool, id, student.student_id, now, minutes as i32)
        .await?
        .ok_or_else(|| {
            AppError::Timer(TimerError::IllegalTransition(
                "ad-hoc plan is no longer in progress".to_string(),
            ))
        })?;

    state.event_bus.publish(
        PlatformEvent::new("ad_hoc.completed")
            .with_source("ad_hoc_plan", id)
            .with_actor(student.student_id)
            .with_payload(json!({
                "actual_minutes": minutes,
                "net_seconds": minutes * 60,
            })),
    );
    tracing::info!(ad_hoc_id = id, actual_minutes = minutes, "Ad-hoc timer completed");

    Ok(Json(DataResponse { data: plan }))
}

/// POST /api/v1/ad-hoc-plans/{id}/timer/cancel
///
/// Abandon an ad-hoc activity from any non-terminal state. Elapsed time
/// is discarded; nothing is recorded and no points are awarded.
pub async fn cancel_ad_hoc(
    student: AuthStudent,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let plan = AdHocRepo::find_for_student(&state.pool, id, student.student_id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let status = status_of(&plan)?;
    if !status.can_cancel() {
        return Err(AppError::Timer(TimerError::IllegalTransition(format!(
            "ad-hoc plan is {status} and cannot be cancelled"
        ))));
    }

    let plan = AdHocRepo::cancel(&state.pool, id, student.student_id)
        .await?
        .ok_or_else(|| {
            AppError::Timer(TimerError::IllegalTransition(
                "ad-hoc plan is already settled".to_string(),
            ))
        })?;

    state.event_bus.publish(
        PlatformEvent::new("ad_hoc.cancelled")
            .with_source("ad_hoc_plan", id)
            .with_actor(student.student_id),
    );
    tracing::info!(ad_hoc_id = id, "Ad-hoc timer cancelled");

    Ok(Json(DataResponse { data: plan }))
}
