//! Route definitions for plan-scoped timer resources.
//!
//! Everything here acts on one plan owned by the authenticated student;
//! group-wide effects (sibling completion, reset) are resolved inside the
//! handlers.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{advisor, timer};
use crate::state::AppState;

/// Routes mounted at `/plans`.
///
/// ```text
/// GET    /{plan_id}/timer                     get_timer_status
/// POST   /{plan_id}/timer/start               start_timer
/// POST   /{plan_id}/timer/pause               pause_timer
/// POST   /{plan_id}/timer/resume              resume_timer
/// POST   /{plan_id}/timer/complete            complete_timer
/// POST   /{plan_id}/timer/prepare-completion  prepare_completion
/// POST   /{plan_id}/timer/reset               reset_timer
/// GET    /{plan_id}/timer/device-conflict     check_device_conflict
/// GET    /{plan_id}/next-suggestion           next_suggestion
/// ```
pub fn router() -> Router<AppState> {
    let timer_routes = Router::new()
        .route("/", get(timer::get_timer_status))
        .route("/start", post(timer::start_timer))
        .route("/pause", post(timer::pause_timer))
        .route("/resume", post(timer::resume_timer))
        .route("/complete", post(timer::complete_timer))
        .route("/prepare-completion", post(timer::prepare_completion))
        .route("/reset", post(timer::reset_timer))
        .route("/device-conflict", get(timer::check_device_conflict));

    Router::new()
        .nest("/{plan_id}/timer", timer_routes)
        .route("/{plan_id}/next-suggestion", get(advisor::next_suggestion))
}
