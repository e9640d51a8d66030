//! Liveness probe.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use studyflow_core::types::Timestamp;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"`, or `"degraded"` when the database probe fails.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Server clock, handy when probing timer drift from a shell.
    pub server_time: Timestamp,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = studyflow_db::health_check(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        server_time: Utc::now(),
    })
}

/// GET /health, mounted at the root rather than under `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
