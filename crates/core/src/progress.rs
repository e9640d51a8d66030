//! Completion-amount and progress-percentage math.

/// Units covered by a completed range: `end_unit - start_unit`, floored
/// at zero. Range ordering is validated at the API boundary; this only
/// guards the arithmetic.
pub fn completed_amount(start_unit: i32, end_unit: i32) -> i32 {
    (end_unit - start_unit).max(0)
}

/// Percentage of a content consumed by `completed`, rounded to the
/// nearest whole percent and capped at 100.
///
/// Formula: `min(100, round(completed / capacity * 100))`
pub fn progress_percent(completed: i32, capacity: i32) -> i32 {
    if capacity <= 0 {
        return 0;
    }
    let ratio = completed.max(0) as f64 / capacity as f64;
    ((ratio * 100.0).round() as i32).min(100)
}
