//! Route definitions for session-scoped device operations.

use axum::routing::post;
use axum::Router;

use crate::handlers::device;
use crate::state::AppState;

/// Routes mounted at `/sessions`.
///
/// ```text
/// POST   /{session_id}/heartbeat  heartbeat
/// POST   /{session_id}/takeover   takeover_session
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{session_id}/heartbeat", post(device::heartbeat))
        .route("/{session_id}/takeover", post(device::takeover_session))
}
