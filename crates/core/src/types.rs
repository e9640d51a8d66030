//! Aliases shared by every studyflow crate.

/// Primary keys are BIGSERIAL, so `i64` on this side.
pub type DbId = i64;

/// Timestamps are stored and served in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
