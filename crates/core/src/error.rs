//! Timer engine error taxonomy.
//!
//! Every rejection a timer operation can produce maps to exactly one
//! variant, so the HTTP layer can translate kind -> status code and log
//! level in one place. Recoverable rejections (transitions, conflicts)
//! carry enough context for the client to react without a retry loop.

use crate::device::DeviceConflictInfo;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Conflict classification
// ---------------------------------------------------------------------------

/// Which kind of entity currently holds the student's single
/// running-timer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Plan,
    AdHoc,
}

impl ConflictKind {
    /// Human-readable label for error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::AdHoc => "ad-hoc plan",
        }
    }
}

/// Why the content-capacity lookup failed during completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityIssue {
    /// The plan references a content row that does not exist.
    ContentMissing { content_id: DbId },
    /// The content row exists but its capacity is unset or not positive.
    NotPositive { content_id: DbId },
}

impl std::fmt::Display for CapacityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContentMissing { content_id } => {
                write!(f, "content {content_id} not found")
            }
            Self::NotPositive { content_id } => {
                write!(f, "content {content_id} has no usable capacity")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Error enum
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    #[error("Authentication required")]
    AuthRequired,

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Invalid timer transition: {0}")]
    IllegalTransition(String),

    #[error("Another {} timer is already running", .kind.label())]
    ConcurrencyConflict { kind: ConflictKind },

    #[error("Timer session is held by another device")]
    DeviceConflict(DeviceConflictInfo),

    #[error("Content capacity invalid: {0}")]
    CapacityInvalid(CapacityIssue),

    #[error("Completion could not be saved: {0}")]
    TransactionFailure(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn concurrency_conflict_message_names_the_holder() {
        let err = TimerError::ConcurrencyConflict {
            kind: ConflictKind::AdHoc,
        };
        assert_eq!(
            err.to_string(),
            "Another ad-hoc plan timer is already running"
        );
    }

    #[test]
    fn capacity_issue_messages() {
        assert_eq!(
            CapacityIssue::ContentMissing { content_id: 7 }.to_string(),
            "content 7 not found"
        );
        assert_eq!(
            CapacityIssue::NotPositive { content_id: 7 }.to_string(),
            "content 7 has no usable capacity"
        );
    }

    #[test]
    fn device_conflict_message_is_generic() {
        let info = DeviceConflictInfo {
            session_id: 1,
            same_device: false,
            device_description: "Chrome on Windows".to_string(),
            last_heartbeat: chrono::Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
        };
        // Details travel in the structured payload, not the message.
        assert_eq!(
            TimerError::DeviceConflict(info).to_string(),
            "Timer session is held by another device"
        );
    }
}
