//! Shared handler state.

use std::sync::Arc;

use crate::config::ServerConfig;

/// Everything a handler can reach through `State<AppState>`. Cloned per
/// request; all members are `Arc`s or handle types.
#[derive(Clone)]
pub struct AppState {
    /// Postgres pool, the single source of timer truth.
    pub pool: studyflow_db::DbPool,
    /// Boot-time configuration.
    pub config: Arc<ServerConfig>,
    /// Bus on which handlers publish domain events after commit.
    pub event_bus: Arc<studyflow_events::EventBus>,
}
