//! Timer action request DTOs.
//!
//! `client_timestamp` fields are advisory: handlers log large clock drift
//! but all persisted timestamps come from the server clock.

use serde::Deserialize;
use studyflow_core::types::Timestamp;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct StartTimerRequest {
    pub client_timestamp: Option<Timestamp>,
    pub device_session_id: Option<String>,
    pub device_info: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PauseTimerRequest {
    pub client_timestamp: Option<Timestamp>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResumeTimerRequest {
    pub client_timestamp: Option<Timestamp>,
    pub device_session_id: Option<String>,
    pub device_info: Option<String>,
}

/// Completed range in content units (pages, episodes).
#[derive(Debug, Deserialize, Validate)]
pub struct CompleteTimerRequest {
    #[validate(range(min = 0))]
    pub start_amount: i32,
    #[validate(range(min = 0))]
    pub end_amount: i32,
    #[validate(length(max = 2000))]
    pub memo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TakeoverRequest {
    pub device_session_id: String,
    pub device_info: Option<String>,
}

/// Explicit minutes override for ad-hoc completion; when absent the
/// server derives minutes from `started_at`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CompleteAdHocRequest {
    #[validate(range(min = 0, max = 1440))]
    pub actual_minutes: Option<i32>,
}
