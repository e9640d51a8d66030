//! Elapsed-time arithmetic for study timers.
//!
//! Net study time is never ticked in memory; it is recomputed from
//! persisted timestamps on every request, so process restarts and load
//! balancer failovers are invisible. All functions are pure, work in
//! whole seconds, and clamp at zero so skewed or reordered timestamps can
//! never produce negative durations.
//!
//! Pause accounting contract: each pause/resume cycle is folded into the
//! plan's `paused_duration_seconds` exactly once, at resume time
//! ([`pause_interval_seconds`]). An in-flight pause (paused, not yet
//! resumed) is subtracted transiently by [`accumulated_seconds`] and
//! flushed by whichever write closes the cycle (resume, completion, or
//! completion preparation).

use crate::types::Timestamp;

/// Whole seconds from `from` to `to`, clamped at zero.
pub fn seconds_between(from: Timestamp, to: Timestamp) -> i64 {
    (to - from).num_seconds().max(0)
}

/// Seconds a single pause/resume cycle contributes to the flushed pause
/// total. Called exactly once per cycle, when the timer resumes.
pub fn pause_interval_seconds(paused_at: Timestamp, resumed_at: Timestamp) -> i64 {
    seconds_between(paused_at, resumed_at)
}

/// Net studied seconds of a live timer at instant `now`.
///
/// `gross - flushed pauses - in-flight pause`, floored at zero. The
/// in-flight term only applies while the session is currently paused.
pub fn accumulated_seconds(
    now: Timestamp,
    started_at: Timestamp,
    paused_duration_seconds: i64,
    current_paused_at: Option<Timestamp>,
) -> i64 {
    let gross = seconds_between(started_at, now);
    let in_flight = current_paused_at
        .map(|paused| seconds_between(paused, now))
        .unwrap_or(0);
    (gross - paused_duration_seconds - in_flight).max(0)
}

/// Final net duration persisted at completion, after every pause cycle
/// (including an in-flight one) has been flushed into `total_paused_seconds`.
pub fn final_net_seconds(
    started_at: Timestamp,
    ended_at: Timestamp,
    total_paused_seconds: i64,
) -> i64 {
    (seconds_between(started_at, ended_at) - total_paused_seconds).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> Timestamp {
        chrono::Utc.timestamp_opt(1_750_000_000 + secs, 0).unwrap()
    }

    // -- seconds_between --

    #[test]
    fn seconds_between_forward() {
        assert_eq!(seconds_between(ts(0), ts(90)), 90);
    }

    #[test]
    fn seconds_between_reversed_clamps_to_zero() {
        assert_eq!(seconds_between(ts(90), ts(0)), 0);
    }

    #[test]
    fn seconds_between_same_instant() {
        assert_eq!(seconds_between(ts(5), ts(5)), 0);
    }

    // -- accumulated_seconds --

    #[test]
    fn accumulated_simple_run() {
        // 10 minutes running, nothing paused.
        assert_eq!(accumulated_seconds(ts(600), ts(0), 0, None), 600);
    }

    #[test]
    fn accumulated_subtracts_flushed_pauses() {
        // 10 minutes wall clock, 3 minutes previously paused.
        assert_eq!(accumulated_seconds(ts(600), ts(0), 180, None), 420);
    }

    #[test]
    fn accumulated_subtracts_in_flight_pause() {
        // Paused at t=300 and never resumed: the last 300s do not count.
        assert_eq!(accumulated_seconds(ts(600), ts(0), 0, Some(ts(300))), 300);
    }

    #[test]
    fn accumulated_combines_both_pause_terms() {
        // 600s wall clock, 100s flushed, paused again at t=500.
        assert_eq!(
            accumulated_seconds(ts(600), ts(0), 100, Some(ts(500))),
            400
        );
    }

    #[test]
    fn accumulated_never_negative() {
        // Pathological inputs (pause total larger than the wall clock).
        assert_eq!(accumulated_seconds(ts(60), ts(0), 3600, None), 0);
    }

    #[test]
    fn accumulated_at_pause_instant_counts_nothing_extra() {
        // Asking at the exact pause moment: in-flight term is zero.
        assert_eq!(accumulated_seconds(ts(300), ts(0), 0, Some(ts(300))), 300);
    }

    // -- pause flush: once per cycle, equivalent to the wall-clock total --

    #[test]
    fn flush_single_cycle() {
        assert_eq!(pause_interval_seconds(ts(100), ts(160)), 60);
    }

    #[test]
    fn repeated_cycles_flush_once_each() {
        // Three pause/resume cycles; flushing each exactly once must equal
        // the single wall-clock computation over the same span.
        let cycles = [(100, 160), (300, 330), (500, 620)];
        let started = ts(0);
        let ended = ts(900);

        let mut flushed = 0;
        for (p, r) in cycles {
            flushed += pause_interval_seconds(ts(p), ts(r));
        }
        assert_eq!(flushed, 60 + 30 + 120);

        let via_flush = final_net_seconds(started, ended, flushed);
        let direct = seconds_between(started, ended) - (60 + 30 + 120);
        assert_eq!(via_flush, direct);
        assert_eq!(via_flush, 690);
    }

    #[test]
    fn recomputing_is_stable() {
        // Same persisted timestamps always yield the same answer, no matter
        // how many requests recompute it.
        let first = accumulated_seconds(ts(600), ts(0), 120, Some(ts(550)));
        for _ in 0..10 {
            assert_eq!(
                accumulated_seconds(ts(600), ts(0), 120, Some(ts(550))),
                first
            );
        }
    }

    #[test]
    fn zero_length_pause_contributes_nothing() {
        assert_eq!(pause_interval_seconds(ts(100), ts(100)), 0);
    }

    #[test]
    fn reversed_pause_timestamps_contribute_nothing() {
        assert_eq!(pause_interval_seconds(ts(200), ts(100)), 0);
    }

    // -- final_net_seconds --

    #[test]
    fn final_duration_subtracts_pauses() {
        assert_eq!(final_net_seconds(ts(0), ts(3600), 600), 3000);
    }

    #[test]
    fn final_duration_never_negative() {
        assert_eq!(final_net_seconds(ts(0), ts(100), 500), 0);
    }
}
