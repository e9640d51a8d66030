//! Device-session identity and heartbeat liveness rules.
//!
//! Clients mint a `device_session_id` of the form `{device_id}_tab_{tab_id}`
//! per browser tab. The device prefix distinguishes "another tab on this
//! machine" from "another machine", which changes the takeover copy the
//! client shows. Liveness is a heartbeat window, not a connection: a
//! session whose owner stopped heartbeating is abandoned and may be taken
//! over without ceremony.

use crate::types::{DbId, Timestamp};

/// Seconds after the last heartbeat during which a session's owner still
/// counts as live.
pub const HEARTBEAT_TTL_SECS: i64 = 120;

/// Separator clients embed in device session ids: `{device_id}_tab_{tab_id}`.
const TAB_SEPARATOR: &str = "_tab_";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Device prefix of a device session id. Ids without the tab separator
/// are treated as a bare device id.
pub fn device_prefix(device_session_id: &str) -> &str {
    match device_session_id.find(TAB_SEPARATOR) {
        Some(idx) => &device_session_id[..idx],
        None => device_session_id,
    }
}

/// Two session ids belong to the same physical device iff their device
/// prefixes match (tab ids may differ).
pub fn same_device(a: &str, b: &str) -> bool {
    device_prefix(a) == device_prefix(b)
}

/// Rough human label for a raw user-agent string, e.g. "Chrome on Windows".
/// Shown in conflict prompts so the student can recognize the other holder.
pub fn describe_device(user_agent: Option<&str>) -> String {
    let Some(ua) = user_agent else {
        return "Unknown device".to_string();
    };
    let ua = ua.to_lowercase();

    let browser = if ua.contains("edg/") {
        Some("Edge")
    } else if ua.contains("chrome") {
        Some("Chrome")
    } else if ua.contains("firefox") {
        Some("Firefox")
    } else if ua.contains("safari") {
        Some("Safari")
    } else {
        None
    };

    // iOS before macOS: mobile Safari advertises "like Mac OS X".
    // Android before Linux for the same reason.
    let os = if ua.contains("iphone") || ua.contains("ipad") {
        Some("iOS")
    } else if ua.contains("android") {
        Some("Android")
    } else if ua.contains("windows") {
        Some("Windows")
    } else if ua.contains("mac os") || ua.contains("macintosh") {
        Some("macOS")
    } else if ua.contains("linux") {
        Some("Linux")
    } else {
        None
    };

    match (browser, os) {
        (Some(b), Some(o)) => format!("{b} on {o}"),
        (Some(b), None) => b.to_string(),
        (None, Some(o)) => format!("Browser on {o}"),
        (None, None) => "Unknown device".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Liveness and ownership
// ---------------------------------------------------------------------------

/// Whether a session owner heartbeated within the liveness window.
pub fn is_heartbeat_live(last_heartbeat: Timestamp, now: Timestamp) -> bool {
    (now - last_heartbeat).num_seconds() < HEARTBEAT_TTL_SECS
}

/// Who effectively holds an open session, from the requester's viewpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOwnership {
    /// No recorded owner, no requester identity, or the requester owns it.
    Free,
    /// Another device owns it but its heartbeat went stale; the requester
    /// may take over without confirmation.
    Abandoned,
    /// Another device owns it and is still heartbeating.
    OwnedElsewhere { same_device: bool },
}

/// Compare an open session's recorded owner against the requesting device.
///
/// Requests without a `device_session_id` (older clients) skip ownership
/// checks entirely, as do sessions recorded before device tracking.
pub fn classify_ownership(
    owner_device_id: Option<&str>,
    owner_last_heartbeat: Timestamp,
    requester_device_id: Option<&str>,
    now: Timestamp,
) -> SessionOwnership {
    let (Some(owner), Some(requester)) = (owner_device_id, requester_device_id) else {
        return SessionOwnership::Free;
    };
    if owner == requester {
        return SessionOwnership::Free;
    }
    if !is_heartbeat_live(owner_last_heartbeat, now) {
        return SessionOwnership::Abandoned;
    }
    SessionOwnership::OwnedElsewhere {
        same_device: same_device(owner, requester),
    }
}

/// Wire payload describing the competing holder of a session. Returned by
/// the conflict-check endpoint and attached to device-conflict rejections.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DeviceConflictInfo {
    pub session_id: DbId,
    pub same_device: bool,
    pub device_description: String,
    pub last_heartbeat: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> Timestamp {
        chrono::Utc.timestamp_opt(1_750_000_000 + secs, 0).unwrap()
    }

    // -- identity --

    #[test]
    fn prefix_strips_tab_suffix() {
        assert_eq!(device_prefix("dev-abc123_tab_9f2"), "dev-abc123");
    }

    #[test]
    fn prefix_of_bare_id_is_itself() {
        assert_eq!(device_prefix("dev-abc123"), "dev-abc123");
    }

    #[test]
    fn same_device_different_tabs() {
        assert!(same_device("dev-a_tab_1", "dev-a_tab_2"));
    }

    #[test]
    fn different_devices() {
        assert!(!same_device("dev-a_tab_1", "dev-b_tab_1"));
    }

    // -- liveness --

    #[test]
    fn heartbeat_inside_window_is_live() {
        assert!(is_heartbeat_live(ts(0), ts(HEARTBEAT_TTL_SECS - 1)));
    }

    #[test]
    fn heartbeat_at_window_edge_is_stale() {
        assert!(!is_heartbeat_live(ts(0), ts(HEARTBEAT_TTL_SECS)));
    }

    #[test]
    fn heartbeat_beyond_window_is_stale() {
        assert!(!is_heartbeat_live(ts(0), ts(HEARTBEAT_TTL_SECS + 300)));
    }

    // -- ownership classification --

    #[test]
    fn own_session_is_free() {
        assert_eq!(
            classify_ownership(Some("dev-a_tab_1"), ts(0), Some("dev-a_tab_1"), ts(10)),
            SessionOwnership::Free
        );
    }

    #[test]
    fn untracked_session_is_free() {
        assert_eq!(
            classify_ownership(None, ts(0), Some("dev-a_tab_1"), ts(10)),
            SessionOwnership::Free
        );
    }

    #[test]
    fn anonymous_requester_skips_the_check() {
        assert_eq!(
            classify_ownership(Some("dev-a_tab_1"), ts(0), None, ts(10)),
            SessionOwnership::Free
        );
    }

    #[test]
    fn live_foreign_owner_conflicts() {
        assert_eq!(
            classify_ownership(Some("dev-a_tab_1"), ts(0), Some("dev-b_tab_1"), ts(30)),
            SessionOwnership::OwnedElsewhere { same_device: false }
        );
    }

    #[test]
    fn other_tab_same_device_is_flagged() {
        assert_eq!(
            classify_ownership(Some("dev-a_tab_1"), ts(0), Some("dev-a_tab_2"), ts(30)),
            SessionOwnership::OwnedElsewhere { same_device: true }
        );
    }

    #[test]
    fn stale_foreign_owner_is_abandoned() {
        assert_eq!(
            classify_ownership(
                Some("dev-a_tab_1"),
                ts(0),
                Some("dev-b_tab_1"),
                ts(HEARTBEAT_TTL_SECS + 1)
            ),
            SessionOwnership::Abandoned
        );
    }

    // -- user-agent labels --

    #[test]
    fn describes_chrome_on_windows() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                  (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36";
        assert_eq!(describe_device(Some(ua)), "Chrome on Windows");
    }

    #[test]
    fn describes_mobile_safari_as_ios() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) \
                  AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/604.1";
        assert_eq!(describe_device(Some(ua)), "Safari on iOS");
    }

    #[test]
    fn describes_edge_before_chrome() {
        let ua = "Mozilla/5.0 (Windows NT 10.0) AppleWebKit/537.36 (KHTML, like Gecko) \
                  Chrome/125.0.0.0 Safari/537.36 Edg/125.0.0.0";
        assert_eq!(describe_device(Some(ua)), "Edge on Windows");
    }

    #[test]
    fn describes_android_before_linux() {
        let ua = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 \
                  (KHTML, like Gecko) Chrome/125.0.0.0 Mobile Safari/537.36";
        assert_eq!(describe_device(Some(ua)), "Chrome on Android");
    }

    #[test]
    fn missing_user_agent_is_unknown() {
        assert_eq!(describe_device(None), "Unknown device");
    }

    #[test]
    fn unrecognized_user_agent_is_unknown() {
        assert_eq!(describe_device(Some("curl/8.5.0")), "Unknown device");
    }
}
