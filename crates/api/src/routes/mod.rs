pub mod ad_hoc;
pub mod health;
pub mod plan;
pub mod session;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Everything mounted under `/api/v1`.
///
/// The surface, by resource:
///
/// ```text
/// /plans/{plan_id}/timer                     timer snapshot (GET)
/// /plans/{plan_id}/timer/start               start or auto-resume (POST)
/// /plans/{plan_id}/timer/pause               pause (POST)
/// /plans/{plan_id}/timer/resume              resume, flushes pause (POST)
/// /plans/{plan_id}/timer/complete            confirm with unit range (POST)
/// /plans/{plan_id}/timer/prepare-completion  settle sessions, show form numbers (POST)
/// /plans/{plan_id}/timer/reset               wipe group timer history (POST)
/// /plans/{plan_id}/timer/device-conflict     probe holder (GET, ?device_session_id)
/// /plans/{plan_id}/next-suggestion           what to study next (GET)
///
/// /sessions/{session_id}/heartbeat           liveness ping (POST, idempotent)
/// /sessions/{session_id}/takeover            reassign device ownership (POST)
///
/// /ad-hoc-plans                              create (POST), list for a day (GET ?date)
/// /ad-hoc-plans/{id}/timer/start             start (POST)
/// /ad-hoc-plans/{id}/timer/complete          complete (POST, minutes optional)
/// /ad-hoc-plans/{id}/timer/cancel            cancel (POST)
///
/// /timer/now                                 authoritative server clock (GET)
/// ```
///
/// Every route requires a student JWT except `/timer/now`, which serves
/// clock sync before login. `/health` lives at the root router, outside
/// this tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/plans", plan::router())
        .nest("/sessions", session::router())
        .nest("/ad-hoc-plans", ad_hoc::router())
        .route("/timer/now", get(handlers::timer::server_now))
}
