//! Handlers for the plan timer lifecycle under `/plans/{id}/timer`.
//!
//! All endpoints require authentication via [`AuthStudent`] and operate
//! only on plans owned by the caller. Every persisted timestamp comes
//! from the server clock; client timestamps are advisory and only logged
//! when they drift.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use studyflow_core::device::{
    classify_ownership, describe_device, DeviceConflictInfo, SessionOwnership,
};
use studyflow_core::elapsed;
use studyflow_core::error::{CapacityIssue, TimerError};
use studyflow_core::progress;
use studyflow_core::state_machine::{determine_state, validate_action, TimerAction, TimerState};
use studyflow_core::types::{DbId, Timestamp};
use studyflow_db::models::plan::Plan;
use studyflow_db::models::session::{StartSession, StudySession};
use studyflow_db::models::timer::{
    CompleteTimerRequest, PauseTimerRequest, ResumeTimerRequest, StartTimerRequest,
};
use studyflow_db::repositories::completion_repo::CompleteGroupArgs;
use studyflow_db::repositories::{CompletionRepo, ContentRepo, PlanRepo, SessionRepo};
use studyflow_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::handlers::ensure_no_running_conflict;
use crate::middleware::auth::AuthStudent;
use crate::response::DataResponse;
use crate::state::AppState;

/// Client/server clock drift beyond this is logged for support triage.
const CLOCK_DRIFT_WARN_SECS: i64 = 30;

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Wire snapshot of a plan timer, returned by every timer action and by
/// the status read.
#[derive(Debug, Serialize)]
pub struct TimerStatus {
    pub plan_id: DbId,
    pub state: TimerState,
    pub session_id: Option<DbId>,
    pub started_at: Option<Timestamp>,
    /// Net studied seconds as of `server_time`.
    pub accumulated_seconds: i64,
    /// Flushed pause total; an in-flight pause is already excluded from
    /// `accumulated_seconds` but not folded in here until resume.
    pub paused_duration_seconds: i64,
    pub pause_count: i32,
    pub server_time: Timestamp,
}

/// What a confirmed completion recorded.
#[derive(Debug, Serialize)]
pub struct CompletionSummary {
    pub plan_ids: Vec<DbId>,
    pub state: TimerState,
    pub net_seconds: i64,
    pub completed_amount: i32,
    pub progress: i32,
    pub sessions_closed: u64,
    pub server_time: Timestamp,
}

/// Settled numbers for the completion confirmation form.
#[derive(Debug, Serialize)]
pub struct CompletionPreparation {
    pub plan_id: DbId,
    pub accumulated_seconds: i64,
    pub paused_duration_seconds: i64,
    /// Whether preparation had to close a dangling session just now.
    pub had_active_session: bool,
    /// Set when another tab already confirmed; the form should show the
    /// recorded result instead of asking again.
    pub is_already_completed: bool,
    pub suggested_start_unit: Option<i32>,
    pub suggested_end_unit: Option<i32>,
    pub server_time: Timestamp,
}

/// What a group reset removed.
#[derive(Debug, Serialize)]
pub struct ResetSummary {
    pub plans_reset: u64,
    pub sessions_deleted: u64,
    pub progress_rows_deleted: u64,
    pub state: TimerState,
    pub server_time: Timestamp,
}

/// Conflict probe result for the pre-start device check.
#[derive(Debug, Serialize)]
pub struct DeviceConflictStatus {
    pub conflict: bool,
    pub holder: Option<DeviceConflictInfo>,
    pub server_time: Timestamp,
}

/// Server clock reading for client-side drift correction.
#[derive(Debug, Serialize)]
pub struct ServerTime {
    pub server_time: Timestamp,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeviceConflictQuery {
    pub device_session_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(plan_id: DbId) -> AppError {
    AppError::Timer(TimerError::NotFound {
        entity: "Plan",
        id: plan_id,
    })
}

/// Log (never reject) client clocks that disagree with the server's.
fn note_clock_drift(plan_id: DbId, client_timestamp: Option<Timestamp>, now: Timestamp) {
    if let Some(client) = client_timestamp {
        let drift = (now - client).num_seconds().abs();
        if drift > CLOCK_DRIFT_WARN_SECS {
            tracing::warn!(
                plan_id,
                drift_seconds = drift,
                "Client clock drifts from server time"
            );
        }
    }
}

fn device_conflict_error(session: &StudySession, same_device: bool) -> AppError {
    AppError::Timer(TimerError::DeviceConflict(DeviceConflictInfo {
        session_id: session.id,
        same_device,
        device_description: describe_device(session.device_info.as_deref()),
        last_heartbeat: session.last_heartbeat,
    }))
}

/// Enforce device ownership on an open session before acting on it.
///
/// A live foreign holder is rejected with its identity attached; a stale
/// holder is silently dispossessed so the student's new device can carry
/// on without a confirmation round-trip.
async fn claim_session(
    state: &AppState,
    session: &StudySession,
    student_id: DbId,
    requester_device: Option<&str>,
    requester_info: Option<&str>,
    now: Timestamp,
) -> AppResult<()> {
    match classify_ownership(
        session.device_session_id.as_deref(),
        session.last_heartbeat,
        requester_device,
        now,
    ) {
        SessionOwnership::Free => Ok(()),
        SessionOwnership::OwnedElsewhere { same_device } => {
            Err(device_conflict_error(session, same_device))
        }
        SessionOwnership::Abandoned => {
            if let Some(device) = requester_device {
                SessionRepo::takeover(&state.pool, session.id, student_id, device, requester_info)
                    .await?;
                tracing::info!(
                    session_id = session.id,
                    "Stale session taken over by new device"
                );
            }
            Ok(())
        }
    }
}

fn build_timer_status(plan: &Plan, session: Option<&StudySession>, now: Timestamp) -> TimerStatus {
    let snapshot = session.map(StudySession::snapshot);
    let state = determine_state(plan.timer_snapshot(), snapshot.as_ref());

    let accumulated_seconds = match (state, plan.actual_start_time) {
        (TimerState::Completed, _) => {
            (plan.total_duration_seconds.unwrap_or(0) - plan.paused_duration_seconds).max(0)
        }
        (_, Some(started_at)) => elapsed::accumulated_seconds(
            now,
            started_at,
            plan.paused_duration_seconds,
            session.filter(|s| s.is_paused()).and_then(|s| s.paused_at),
        ),
        _ => 0,
    };

    TimerStatus {
        plan_id: plan.id,
        state,
        session_id: session.map(|s| s.id),
        started_at: plan.actual_start_time,
        accumulated_seconds,
        paused_duration_seconds: plan.paused_duration_seconds,
        pause_count: plan.pause_count,
        server_time: now,
    }
}

/// Re-read plan and session and assemble the response snapshot. Actions
/// go through this after their writes so the payload reflects exactly
/// what was persisted.
async fn read_status(
    state: &AppState,
    plan_id: DbId,
    student_id: DbId,
    now: Timestamp,
) -> AppResult<TimerStatus> {
    let plan = PlanRepo::find_for_student(&state.pool, plan_id, student_id)
        .await?
        .ok_or_else(|| not_found(plan_id))?;
    let session = SessionRepo::find_open_for_plan(&state.pool, plan_id, student_id).await?;
    Ok(build_timer_status(&plan, session.as_ref(), now))
}

/// Resume a paused session, flushing the finished pause interval into the
/// plan's accumulator. Shared by RESUME and the auto-resume path of START.
async fn resume_session(
    state: &AppState,
    plan: &Plan,
    session: &StudySession,
    now: Timestamp,
) -> AppResult<()> {
    ensure_no_running_conflict(&state.pool, plan.student_id, Some(plan.id), None).await?;

    let Some(paused_at) = session.paused_at else {
        return Err(AppError::Timer(TimerError::IllegalTransition(
            "timer is not paused".to_string(),
        )));
    };
    let pause_seconds = elapsed::pause_interval_seconds(paused_at, now);

    let resumed =
        SessionRepo::resume_and_flush(&state.pool, session.id, plan.id, pause_seconds, now)
            .await?;
    if !resumed {
        // The session closed under us (completion from another tab).
        return Err(AppError::Timer(TimerError::IllegalTransition(
            "no active session for this plan".to_string(),
        )));
    }

    state.event_bus.publish(
        PlatformEvent::new("plan.timer_resumed")
            .with_source("plan", plan.id)
            .with_actor(plan.student_id)
            .with_payload(json!({ "pause_seconds": pause_seconds })),
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Start
// ---------------------------------------------------------------------------

/// POST /api/v1/plans/{id}/timer/start
///
/// Start the plan timer. A paused session auto-resumes, an abandoned
/// session is silently reattached to the caller's device, and a session
/// held live by another device is rejected with the holder's identity.
pub async fn start_timer(
    student: AuthStudent,
    State(state): State<AppState>,
    Path(plan_id): Path<DbId>,
    Json(input): Json<StartTimerRequest>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    note_clock_drift(plan_id, input.client_timestamp, now);

    let plan = PlanRepo::find_for_student(&state.pool, plan_id, student.student_id)
        .await?
        .ok_or_else(|| not_found(plan_id))?;

    if let Some(session) =
        SessionRepo::find_open_for_plan(&state.pool, plan_id, student.student_id).await?
    {
        return revive_open_session(&state, &plan, &session, &input, now).await;
    }

    // Own-plan state first, cross-entity exclusivity second, so the most
    // specific rejection wins.
    validate_action(plan.timer_snapshot(), None, TimerAction::Start)?;

    // Virtual plans carry no content and can never record an amount, so
    // the timer refuses them before anything is written.
    if plan.content_id.is_none() {
        return Err(AppError::Timer(TimerError::Validation(
            "plan has no linked content".to_string(),
        )));
    }

    ensure_no_running_conflict(&state.pool, student.student_id, Some(plan_id), None).await?;

    PlanRepo::mark_started(&state.pool, plan_id, now).await?;
    let session = SessionRepo::start(
        &state.pool,
        &StartSession {
            plan_id,
            student_id: student.student_id,
            device_session_id: input.device_session_id.clone(),
            device_info: input.device_info.clone(),
        },
        now,
    )
    .await?;

    state.event_bus.publish(
        PlatformEvent::new("plan.timer_started")
            .with_source("plan", plan_id)
            .with_actor(student.student_id),
    );
    tracing::info!(plan_id, session_id = session.id, "Timer started");

    let status = read_status(&state, plan_id, student.student_id, now).await?;
    Ok(Json(DataResponse { data: status }))
}

/// START issued against a plan that already has an open session: resolve
/// device ownership, then either auto-resume a paused timer, reattach an
/// abandoned running one, or reject.
async fn revive_open_session(
    state: &AppState,
    plan: &Plan,
    session: &StudySession,
    input: &StartTimerRequest,
    now: Timestamp,
) -> AppResult<Json<DataResponse<TimerStatus>>> {
    let ownership = classify_ownership(
        session.device_session_id.as_deref(),
        session.last_heartbeat,
        input.device_session_id.as_deref(),
        now,
    );

    let reattached = match ownership {
        SessionOwnership::OwnedElsewhere { same_device } => {
            return Err(device_conflict_error(session, same_device));
        }
        SessionOwnership::Abandoned => {
            if let Some(device) = input.device_session_id.as_deref() {
                SessionRepo::takeover(
                    &state.pool,
                    session.id,
                    plan.student_id,
                    device,
                    input.device_info.as_deref(),
                )
                .await?;
                tracing::info!(
                    plan_id = plan.id,
                    session_id = session.id,
                    "Start reattached an abandoned session"
                );
            }
            true
        }
        SessionOwnership::Free => false,
    };

    if session.is_paused() {
        resume_session(state, plan, session, now).await?;
        tracing::info!(
            plan_id = plan.id,
            session_id = session.id,
            "Start auto-resumed a paused timer"
        );
    } else if !reattached {
        return Err(AppError::Timer(TimerError::IllegalTransition(
            "timer is already running for this plan".to_string(),
        )));
    }

    let status = read_status(state, plan.id, plan.student_id, now).await?;
    Ok(Json(DataResponse { data: status }))
}

// ---------------------------------------------------------------------------
// Pause
// ---------------------------------------------------------------------------

/// POST /api/v1/plans/{id}/timer/pause
///
/// Pause the running timer. The pause interval stays in-flight on the
/// session until the next resume flushes it into the plan.
pub async fn pause_timer(
    student: AuthStudent,
    State(state): State<AppState>,
    Path(plan_id): Path<DbId>,
    Json(input): Json<PauseTimerRequest>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    note_clock_drift(plan_id, input.client_timestamp, now);

    let plan = PlanRepo::find_for_student(&state.pool, plan_id, student.student_id)
        .await?
        .ok_or_else(|| not_found(plan_id))?;
    let session = SessionRepo::find_open_for_plan(&state.pool, plan_id, student.student_id).await?;

    let snapshot = session.as_ref().map(StudySession::snapshot);
    validate_action(plan.timer_snapshot(), snapshot.as_ref(), TimerAction::Pause)?;
    let Some(session) = session else {
        return Err(AppError::Timer(TimerError::IllegalTransition(
            "no active session for this plan".to_string(),
        )));
    };

    let paused = SessionRepo::pause(&state.pool, session.id, now).await?;
    if !paused {
        return Err(AppError::Timer(TimerError::IllegalTransition(
            "no active session for this plan".to_string(),
        )));
    }
    PlanRepo::increment_pause_count(&state.pool, plan_id).await?;

    state.event_bus.publish(
        PlatformEvent::new("plan.timer_paused")
            .with_source("plan", plan_id)
            .with_actor(student.student_id),
    );
    tracing::info!(plan_id, session_id = session.id, "Timer paused");

    let status = read_status(&state, plan_id, student.student_id, now).await?;
    Ok(Json(DataResponse { data: status }))
}

// ---------------------------------------------------------------------------
// Resume
// ---------------------------------------------------------------------------

/// POST /api/v1/plans/{id}/timer/resume
///
/// Resume a paused timer, flushing the finished pause interval into the
/// plan's accumulator exactly once.
pub async fn resume_timer(
    student: AuthStudent,
    State(state): State<AppState>,
    Path(plan_id): Path<DbId>,
    Json(input): Json<ResumeTimerRequest>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    note_clock_drift(plan_id, input.client_timestamp, now);

    let plan = PlanRepo::find_for_student(&state.pool, plan_id, student.student_id)
        .await?
        .ok_or_else(|| not_found(plan_id))?;
    let session = SessionRepo::find_open_for_plan(&state.pool, plan_id, student.student_id).await?;

    let snapshot = session.as_ref().map(StudySession::snapshot);
    validate_action(plan.timer_snapshot(), snapshot.as_ref(), TimerAction::Resume)?;
    let Some(session) = session else {
        return Err(AppError::Timer(TimerError::IllegalTransition(
            "no active session for this plan".to_string(),
        )));
    };

    claim_session(
        &state,
        &session,
        student.student_id,
        input.device_session_id.as_deref(),
        input.device_info.as_deref(),
        now,
    )
    .await?;

    resume_session(&state, &plan, &session, now).await?;
    tracing::info!(plan_id, session_id = session.id, "Timer resumed");

    let status = read_status(&state, plan_id, student.student_id, now).await?;
    Ok(Json(DataResponse { data: status }))
}

// ---------------------------------------------------------------------------
// Complete
// ---------------------------------------------------------------------------

/// POST /api/v1/plans/{id}/timer/complete
///
/// Confirm completion with the studied unit range. Completes the whole
/// logical plan group atomically and updates per-plan and aggregate
/// progress.
pub async fn complete_timer(
    student: AuthStudent,
    State(state): State<AppState>,
    Path(plan_id): Path<DbId>,
    Json(input): Json<CompleteTimerRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if input.end_amount < input.start_amount {
        return Err(AppError::Timer(TimerError::Validation(
            "end_amount must not be less than start_amount".to_string(),
        )));
    }
    let now = Utc::now();

    let plan = PlanRepo::find_for_student(&state.pool, plan_id, student.student_id)
        .await?
        .ok_or_else(|| not_found(plan_id))?;
    let session = SessionRepo::find_open_for_plan(&state.pool, plan_id, student.student_id).await?;

    let snapshot = session.as_ref().map(StudySession::snapshot);
    validate_action(
        plan.timer_snapshot(),
        snapshot.as_ref(),
        TimerAction::Complete,
    )?;

    // Amount-based completion needs a content capacity to scale against.
    let content_id = plan.content_id.ok_or_else(|| {
        AppError::Timer(TimerError::Validation(
            "plan has no linked content".to_string(),
        ))
    })?;
    let content = ContentRepo::find_by_id(&state.pool, content_id)
        .await?
        .ok_or(AppError::Timer(TimerError::CapacityInvalid(
            CapacityIssue::ContentMissing { content_id },
        )))?;
    let capacity = match content.total_units {
        Some(units) if units > 0 => units,
        _ => {
            return Err(AppError::Timer(TimerError::CapacityInvalid(
                CapacityIssue::NotPositive { content_id },
            )))
        }
    };

    let completed_amount = progress::completed_amount(input.start_amount, input.end_amount);
    let percent = progress::progress_percent(completed_amount, capacity);

    let args = CompleteGroupArgs {
        student_id: student.student_id,
        tenant_id: plan.tenant_id,
        lead_plan_id: plan.id,
        plan_date: plan.plan_date,
        plan_number: plan.plan_number,
        content_id,
        content_type: &content.content_type,
        start_unit: input.start_amount,
        end_unit: input.end_amount,
        completed_amount,
        progress: percent,
        memo: input.memo.as_deref(),
        capacity,
        ended_at: now,
    };
    let outcome = CompletionRepo::complete_group(&state.pool, &args)
        .await
        .map_err(|e| AppError::Timer(TimerError::TransactionFailure(e.to_string())))?
        .ok_or_else(|| {
            AppError::Timer(TimerError::IllegalTransition(
                "plan is already completed".to_string(),
            ))
        })?;

    state.event_bus.publish(
        PlatformEvent::new("plan.completed")
            .with_source("plan", plan_id)
            .with_actor(student.student_id)
            .with_payload(json!({
                "net_seconds": outcome.net_seconds,
                "completed_amount": completed_amount,
                "progress": percent,
                "plan_ids": outcome.plan_ids,
            })),
    );
    tracing::info!(
        plan_id,
        net_seconds = outcome.net_seconds,
        siblings = outcome.plan_ids.len(),
        "Plan group completed"
    );

    Ok(Json(DataResponse {
        data: CompletionSummary {
            plan_ids: outcome.plan_ids,
            state: TimerState::Completed,
            net_seconds: outcome.net_seconds,
            completed_amount,
            progress: percent,
            sessions_closed: outcome.sessions_closed,
            server_time: now,
        },
    }))
}

// ---------------------------------------------------------------------------
// Prepare completion
// ---------------------------------------------------------------------------

/// POST /api/v1/plans/{id}/timer/prepare-completion
///
/// Settle any dangling session (flushing an in-flight pause) and return
/// the numbers the completion form shows. The timer stops ticking here;
/// the confirm step records the studied range.
pub async fn prepare_completion(
    student: AuthStudent,
    State(state): State<AppState>,
    Path(plan_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();

    let plan = PlanRepo::find_for_student(&state.pool, plan_id, student.student_id)
        .await?
        .ok_or_else(|| not_found(plan_id))?;

    // An already-confirmed plan is reported, not rejected: the form may
    // reopen after another tab finished the confirmation.
    if plan.actual_end_time.is_some() {
        let net =
            (plan.total_duration_seconds.unwrap_or(0) - plan.paused_duration_seconds).max(0);
        return Ok(Json(DataResponse {
            data: CompletionPreparation {
                plan_id,
                accumulated_seconds: net,
                paused_duration_seconds: plan.paused_duration_seconds,
                had_active_session: false,
                is_already_completed: true,
                suggested_start_unit: plan.planned_start_unit,
                suggested_end_unit: plan.planned_end_unit,
                server_time: now,
            },
        }));
    }

    let session = SessionRepo::find_open_for_plan(&state.pool, plan_id, student.student_id).await?;

    // Preparation is only meaningful where completion itself would be.
    let snapshot = session.as_ref().map(StudySession::snapshot);
    validate_action(
        plan.timer_snapshot(),
        snapshot.as_ref(),
        TimerAction::Complete,
    )?;

    let settled =
        CompletionRepo::settle_open_sessions(&state.pool, plan_id, student.student_id, now).await?;
    if settled.closed > 0 {
        tracing::info!(
            plan_id,
            closed = settled.closed,
            flushed_pause_seconds = settled.flushed_pause_seconds,
            "Settled open sessions before completion"
        );
    }

    // Re-read: settlement may have folded an in-flight pause into the plan.
    let plan = PlanRepo::find_for_student(&state.pool, plan_id, student.student_id)
        .await?
        .ok_or_else(|| not_found(plan_id))?;
    let accumulated_seconds = plan
        .actual_start_time
        .map(|started| elapsed::accumulated_seconds(now, started, plan.paused_duration_seconds, None))
        .unwrap_or(0);

    Ok(Json(DataResponse {
        data: CompletionPreparation {
            plan_id,
            accumulated_seconds,
            paused_duration_seconds: plan.paused_duration_seconds,
            had_active_session: settled.closed > 0,
            is_already_completed: false,
            suggested_start_unit: plan.planned_start_unit,
            suggested_end_unit: plan.planned_end_unit,
            server_time: now,
        },
    }))
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

/// POST /api/v1/plans/{id}/timer/reset
///
/// Wipe the plan group's timer history so the student can redo it:
/// sessions and per-plan progress rows are deleted, the aggregate is
/// decremented, and the plans return to idle.
pub async fn reset_timer(
    student: AuthStudent,
    State(state): State<AppState>,
    Path(plan_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();

    let plan = PlanRepo::find_for_student(&state.pool, plan_id, student.student_id)
        .await?
        .ok_or_else(|| not_found(plan_id))?;

    let capacity = match plan.content_id {
        Some(content_id) => ContentRepo::find_by_id(&state.pool, content_id)
            .await?
            .and_then(|c| c.total_units),
        None => None,
    };

    let outcome = CompletionRepo::reset_group(
        &state.pool,
        student.student_id,
        plan.id,
        plan.plan_date,
        plan.plan_number,
        capacity,
        now,
    )
    .await?
    .ok_or_else(|| not_found(plan_id))?;

    state.event_bus.publish(
        PlatformEvent::new("plan.reset")
            .with_source("plan", plan_id)
            .with_actor(student.student_id)
            .with_payload(json!({ "plans_reset": outcome.plans_reset })),
    );
    tracing::info!(
        plan_id,
        plans_reset = outcome.plans_reset,
        sessions_deleted = outcome.sessions_deleted,
        "Plan group reset"
    );

    Ok(Json(DataResponse {
        data: ResetSummary {
            plans_reset: outcome.plans_reset,
            sessions_deleted: outcome.sessions_deleted,
            progress_rows_deleted: outcome.progress_rows_deleted,
            state: TimerState::Idle,
            server_time: now,
        },
    }))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/plans/{id}/timer
///
/// Current timer snapshot for a plan.
pub async fn get_timer_status(
    student: AuthStudent,
    State(state): State<AppState>,
    Path(plan_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let status = read_status(&state, plan_id, student.student_id, now).await?;
    Ok(Json(DataResponse { data: status }))
}

/// GET /api/v1/plans/{id}/timer/device-conflict
///
/// Probe whether another device currently holds this plan's session.
/// Returns the holder's identity without mutating anything, so the client
/// can show a takeover prompt before attempting START.
pub async fn check_device_conflict(
    student: AuthStudent,
    State(state): State<AppState>,
    Path(plan_id): Path<DbId>,
    Query(query): Query<DeviceConflictQuery>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();

    PlanRepo::find_for_student(&state.pool, plan_id, student.student_id)
        .await?
        .ok_or_else(|| not_found(plan_id))?;
    let session = SessionRepo::find_open_for_plan(&state.pool, plan_id, student.student_id).await?;

    let holder = session.as_ref().and_then(|s| {
        match classify_ownership(
            s.device_session_id.as_deref(),
            s.last_heartbeat,
            query.device_session_id.as_deref(),
            now,
        ) {
            SessionOwnership::OwnedElsewhere { same_device } => Some(DeviceConflictInfo {
                session_id: s.id,
                same_device,
                device_description: describe_device(s.device_info.as_deref()),
                last_heartbeat: s.last_heartbeat,
            }),
            _ => None,
        }
    });

    Ok(Json(DataResponse {
        data: DeviceConflictStatus {
            conflict: holder.is_some(),
            holder,
            server_time: now,
        },
    }))
}

/// GET /api/v1/timer/now
///
/// Authoritative server clock; clients correct their local drift against
/// this before rendering tick estimates.
pub async fn server_now() -> Json<DataResponse<ServerTime>> {
    Json(DataResponse {
        data: ServerTime {
            server_time: Utc::now(),
        },
    })
}
