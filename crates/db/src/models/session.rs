//! Study session entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studyflow_core::state_machine::SessionSnapshot;
use studyflow_core::types::{DbId, Timestamp};

/// A row from the `study_sessions` table.
///
/// A session is open while `ended_at` is NULL. Paused/running is derived
/// from `paused_at`/`resumed_at`; there is no state column to drift.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudySession {
    pub id: DbId,
    pub plan_id: Option<DbId>,
    pub student_id: DbId,
    pub started_at: Timestamp,
    pub paused_at: Option<Timestamp>,
    pub resumed_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
    /// Client-minted `{device_id}_tab_{tab_id}` of the owning tab.
    pub device_session_id: Option<String>,
    /// Raw user agent of the owning tab, for conflict prompts.
    pub device_info: Option<String>,
    pub last_heartbeat: Timestamp,
    pub created_at: Timestamp,
}

impl StudySession {
    /// Pause-relevant timestamps for the state machine.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            paused_at: self.paused_at,
            resumed_at: self.resumed_at,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.snapshot().is_paused()
    }
}

/// Fields required to open a session.
#[derive(Debug, Deserialize)]
pub struct StartSession {
    pub plan_id: DbId,
    pub student_id: DbId,
    pub device_session_id: Option<String>,
    pub device_info: Option<String>,
}
