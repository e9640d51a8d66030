//! Ad-hoc plan status lifecycle.
//!
//! Ad-hoc (unplanned) activities carry an explicit status column instead
//! of the session-derived state plans use: they have no session rows and
//! no pause support, so a simple text status is the whole story.

/// Status of an ad-hoc plan, persisted as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdHocStatus {
    Pending,
    InProgress,
    Completed,
    Skipped,
    Cancelled,
}

impl AdHocStatus {
    /// Column value for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Skipped => "skipped",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a column value. Unknown values indicate a schema drift bug.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "skipped" => Some(Self::Skipped),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Completed and cancelled rows never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// START is only legal from the initial state.
    pub fn can_start(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// COMPLETE requires the timer to actually be running.
    pub fn can_complete(self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// CANCEL is legal from any non-terminal state.
    pub fn can_cancel(self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for AdHocStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
