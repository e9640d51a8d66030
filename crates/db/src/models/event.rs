//! Event audit-trail entity model.

use serde::Serialize;
use sqlx::FromRow;
use studyflow_core::types::{DbId, Timestamp};

/// A row from the `events` table. Written best-effort by the event
/// persistence consumer after domain transactions commit.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub event_type: String,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<DbId>,
    pub actor_student_id: Option<DbId>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}
