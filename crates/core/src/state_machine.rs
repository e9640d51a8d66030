//! Timer state machine for plan study sessions.
//!
//! State is never stored as a column; it is derived from the plan's
//! completion timestamps and the open session's pause timestamps. This
//! module encodes that derivation in exactly one place, plus the
//! action-legality rules the handlers enforce before touching the store.
//!
//! The machine performs no I/O. Callers fetch the snapshots, ask for a
//! verdict, and own all persistence that follows.

use crate::error::TimerError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// States and actions
// ---------------------------------------------------------------------------

/// Derived lifecycle state of a timed activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
    /// Terminal discard; reachable only by ad-hoc plans.
    Cancelled,
}

/// Client-requested timer action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Start,
    Pause,
    Resume,
    Complete,
    Cancel,
}

impl TimerAction {
    /// Lowercase label for log fields and error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        }
    }
}

// ---------------------------------------------------------------------------
// Persisted-state snapshots
// ---------------------------------------------------------------------------

/// Pause-relevant timestamps of an *open* study session (`ended_at IS NULL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub paused_at: Option<Timestamp>,
    pub resumed_at: Option<Timestamp>,
}

impl SessionSnapshot {
    /// A session is paused iff `paused_at` is set and no later resume
    /// exists: `resumed_at` is NULL or predates `paused_at`.
    pub fn is_paused(&self) -> bool {
        match (self.paused_at, self.resumed_at) {
            (Some(paused), Some(resumed)) => resumed < paused,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Open and not paused. Only sessions in this state occupy the
    /// student's single running-timer slot.
    pub fn is_actively_running(&self) -> bool {
        !self.is_paused()
    }
}

/// Timer-relevant facts about the plan row itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanTimerSnapshot {
    /// `actual_start_time` is set.
    pub started: bool,
    /// `actual_end_time` is set. Permanent once true.
    pub completed: bool,
}

// ---------------------------------------------------------------------------
// Derivation and validation
// ---------------------------------------------------------------------------

/// Derive the externally visible timer state from persisted snapshots.
///
/// A started plan with no open session (for example after completion
/// preparation closed it) reads as `Idle`: nothing is ticking, and START
/// may legally open a fresh session for it.
pub fn determine_state(plan: PlanTimerSnapshot, session: Option<&SessionSnapshot>) -> TimerState {
    if plan.completed {
        return TimerState::Completed;
    }
    match session {
        Some(s) if s.is_paused() => TimerState::Paused,
        Some(_) => TimerState::Running,
        None => TimerState::Idle,
    }
}

/// Check a requested action against the plan's own persisted state and
/// return the state the action would move it to.
///
/// Rejections name the most specific reason. Own-plan state is always
/// evaluated before any cross-entity exclusivity concern, so a student
/// whose *other* plan is running still gets "already completed" when
/// starting a finished one.
pub fn validate_action(
    plan: PlanTimerSnapshot,
    session: Option<&SessionSnapshot>,
    action: TimerAction,
) -> Result<TimerState, TimerError> {
    if plan.completed {
        return Err(TimerError::IllegalTransition(format!(
            "plan is already completed and cannot {}",
            action.label()
        )));
    }

    match action {
        TimerAction::Start => match session {
            Some(s) if s.is_paused() => Err(TimerError::IllegalTransition(
                "timer is paused for this plan; resume it instead".to_string(),
            )),
            Some(_) => Err(TimerError::IllegalTransition(
                "timer is already running for this plan".to_string(),
            )),
            None => Ok(TimerState::Running),
        },
        TimerAction::Pause => match session {
            Some(s) if s.is_paused() => Err(TimerError::IllegalTransition(
                "timer is already paused".to_string(),
            )),
            Some(_) => Ok(TimerState::Paused),
            None => Err(TimerError::IllegalTransition(
                "no active session for this plan".to_string(),
            )),
        },
        TimerAction::Resume => match session {
            Some(s) if s.is_paused() => Ok(TimerState::Running),
            Some(_) => Err(TimerError::IllegalTransition(
                "timer is not paused".to_string(),
            )),
            None => Err(TimerError::IllegalTransition(
                "no active session for this plan".to_string(),
            )),
        },
        TimerAction::Complete => {
            // An open session is not required: completion preparation
            // closes sessions before the student confirms the form.
            if plan.started {
                Ok(TimerState::Completed)
            } else {
                Err(TimerError::IllegalTransition(
                    "plan has not been started".to_string(),
                ))
            }
        }
        TimerAction::Cancel => Err(TimerError::IllegalTransition(
            "plan timers cannot be cancelled".to_string(),
        )),
    }
}
