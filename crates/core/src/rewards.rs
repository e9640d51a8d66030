//! Completion reward points.
//!
//! Awards happen after the completion transaction commits, from the event
//! consumer; nothing here may influence whether a completion succeeds.

/// Base points for completing any timed activity.
pub const POINTS_COMPLETION_BASE: i32 = 10;

/// Bonus points per full ten minutes of net study time.
pub const POINTS_PER_TEN_MINUTES: i32 = 1;

/// Upper bound on the time bonus for a single completion.
pub const POINTS_TIME_BONUS_CAP: i32 = 50;

/// Points awarded for a completion with the given net study time.
pub fn points_for_completion(net_seconds: i64) -> i32 {
    let minutes = (net_seconds.max(0) / 60) as i32;
    let bonus = (minutes / 10 * POINTS_PER_TEN_MINUTES).min(POINTS_TIME_BONUS_CAP);
    POINTS_COMPLETION_BASE + bonus
}
