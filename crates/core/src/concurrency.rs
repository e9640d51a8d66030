//! Cross-entity running-timer exclusivity.
//!
//! A student may have at most one *actively running* timer at any instant,
//! across plan sessions and ad-hoc plans. Paused sessions keep their row
//! open but release the slot, so pausing one plan and starting another is
//! legal.
//!
//! This check is a fast-fail courtesy for the common case; the partial
//! unique indexes on `study_sessions` and `ad_hoc_plans` remain the
//! authoritative arbiter under races, and their violations surface as the
//! same [`ConflictKind`].

use crate::error::ConflictKind;
use crate::state_machine::SessionSnapshot;

/// Classify the student's *other* open sessions and ad-hoc activity.
///
/// `open_sessions` must already exclude the entity being started or
/// resumed; rows with no plan linkage are excluded at query time since an
/// orphaned session cannot represent a running plan timer.
pub fn find_conflict(
    open_sessions: &[SessionSnapshot],
    has_running_ad_hoc: bool,
) -> Option<ConflictKind> {
    if open_sessions.iter().any(SessionSnapshot::is_actively_running) {
        return Some(ConflictKind::Plan);
    }
    if has_running_ad_hoc {
        return Some(ConflictKind::AdHoc);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timestamp;
    use chrono::TimeZone;

    fn ts(secs: i64) -> Timestamp {
        chrono::Utc.timestamp_opt(1_750_000_000 + secs, 0).unwrap()
    }

    fn running() -> SessionSnapshot {
        SessionSnapshot {
            paused_at: None,
            resumed_at: None,
        }
    }

    fn paused() -> SessionSnapshot {
        SessionSnapshot {
            paused_at: Some(ts(10)),
            resumed_at: None,
        }
    }

    #[test]
    fn no_activity_no_conflict() {
        assert_eq!(find_conflict(&[], false), None);
    }

    #[test]
    fn running_session_conflicts() {
        assert_eq!(find_conflict(&[running()], false), Some(ConflictKind::Plan));
    }

    #[test]
    fn paused_session_releases_the_slot() {
        assert_eq!(find_conflict(&[paused()], false), None);
    }

    #[test]
    fn any_running_among_paused_conflicts() {
        assert_eq!(
            find_conflict(&[paused(), running(), paused()], false),
            Some(ConflictKind::Plan)
        );
    }

    #[test]
    fn running_ad_hoc_conflicts() {
        assert_eq!(find_conflict(&[], true), Some(ConflictKind::AdHoc));
    }

    #[test]
    fn plan_conflict_reported_before_ad_hoc() {
        assert_eq!(
            find_conflict(&[running()], true),
            Some(ConflictKind::Plan)
        );
    }

    #[test]
    fn paused_session_plus_ad_hoc_reports_ad_hoc() {
        assert_eq!(find_conflict(&[paused()], true), Some(ConflictKind::AdHoc));
    }
}
