//! Session-scoped device handlers: liveness heartbeat and takeover.
//!
//! Both operate on a session id rather than a plan id because the client
//! learns the session id from timer actions (or from a device-conflict
//! rejection) and keeps using it across tabs.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use studyflow_core::error::TimerError;
use studyflow_core::types::{DbId, Timestamp};
use studyflow_db::models::timer::TakeoverRequest;
use studyflow_db::repositories::SessionRepo;
use studyflow_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthStudent;
use crate::response::DataResponse;
use crate::state::AppState;

/// Heartbeat acknowledgement. `alive` is `false` when the session had
/// already closed, which clients treat as "stop sending".
#[derive(Debug, Serialize)]
pub struct HeartbeatAck {
    pub session_id: DbId,
    pub alive: bool,
    pub server_time: Timestamp,
}

/// What a takeover rewrote.
#[derive(Debug, Serialize)]
pub struct TakeoverOutcome {
    pub session_id: DbId,
    pub plan_id: Option<DbId>,
    pub device_session_id: Option<String>,
    pub server_time: Timestamp,
}

/// POST /api/v1/sessions/{id}/heartbeat
///
/// Refresh the session's liveness marker. Fire-and-forget from the
/// client's perspective: a session that completed in another tab answers
/// `alive: false` instead of an error, so background heartbeat loops
/// never spam error handlers.
pub async fn heartbeat(
    student: AuthStudent,
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let alive = SessionRepo::refresh_heartbeat(&state.pool, session_id, student.student_id).await?;
    if !alive {
        tracing::debug!(session_id, "Heartbeat for a closed or foreign session ignored");
    }

    Ok(Json(DataResponse {
        data: HeartbeatAck {
            session_id,
            alive,
            server_time: now,
        },
    }))
}

/// POST /api/v1/sessions/{id}/takeover
///
/// Reassign an open session to the caller's device after a device
/// conflict. Deliberate counterpart of the silent stale-session claim:
/// here the student confirmed "continue on this device", so liveness of
/// the previous holder does not matter. Timer state is untouched.
pub async fn takeover_session(
    student: AuthStudent,
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
    Json(input): Json<TakeoverRequest>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();

    let session = SessionRepo::takeover(
        &state.pool,
        session_id,
        student.student_id,
        &input.device_session_id,
        input.device_info.as_deref(),
    )
    .await?
    .ok_or(AppError::Timer(TimerError::NotFound {
        entity: "Session",
        id: session_id,
    }))?;

    state.event_bus.publish(
        PlatformEvent::new("session.taken_over")
            .with_source("study_session", session.id)
            .with_actor(student.student_id),
    );
    tracing::info!(
        session_id,
        plan_id = session.plan_id,
        "Session taken over by a new device"
    );

    Ok(Json(DataResponse {
        data: TakeoverOutcome {
            session_id: session.id,
            plan_id: session.plan_id,
            device_session_id: session.device_session_id,
            server_time: now,
        },
    }))
}
