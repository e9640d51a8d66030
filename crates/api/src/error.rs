//! HTTP error surface.
//!
//! Handlers return [`AppError`]; its `IntoResponse` impl turns every variant
//! into a `{ "error", "code" }` JSON body with the right status, so no
//! handler builds error JSON by hand.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use studyflow_core::error::TimerError;

/// Everything a handler can fail with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Domain failure from `studyflow_core`.
    #[error(transparent)]
    Timer(#[from] TimerError),

    /// Query or transaction failure from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed request, outside of what body validation catches.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Failure the client cannot act on; the message stays server-side.
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Timer(TimerError::Validation(errors.to_string()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details: Option<serde_json::Value> = None;

        let (status, code, message) = match &self {
            AppError::Timer(timer) => match timer {
                TimerError::AuthRequired => (
                    StatusCode::UNAUTHORIZED,
                    "AUTH_REQUIRED",
                    "Authentication required".to_string(),
                ),
                TimerError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                TimerError::IllegalTransition(_) => {
                    (StatusCode::CONFLICT, "ILLEGAL_TRANSITION", timer.to_string())
                }
                TimerError::ConcurrencyConflict { .. } => (
                    StatusCode::CONFLICT,
                    "CONCURRENCY_CONFLICT",
                    timer.to_string(),
                ),
                TimerError::DeviceConflict(info) => {
                    // The holder's identity rides along so the client can
                    // offer a takeover prompt.
                    details = serde_json::to_value(info).ok();
                    (StatusCode::CONFLICT, "DEVICE_CONFLICT", timer.to_string())
                }
                TimerError::CapacityInvalid(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "CAPACITY_INVALID",
                    timer.to_string(),
                ),
                TimerError::TransactionFailure(msg) => {
                    tracing::error!(error = %msg, "Completion transaction failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "TRANSACTION_FAILURE",
                        "Completion could not be saved".to_string(),
                    )
                }
                TimerError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", timer.to_string())
                }
                TimerError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    sanitized_500()
                }
            },

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                sanitized_500()
            }
        };

        let mut body = json!({ "error": message, "code": code });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Unique indexes whose violation means two requests raced for the single
/// running-timer slot. They surface as `CONCURRENCY_CONFLICT`, the same
/// answer the application-level guard gives.
const EXCLUSIVITY_CONSTRAINTS: &[&str] = &[
    "uq_study_sessions_running_per_student",
    "uq_study_sessions_open_per_plan",
    "uq_ad_hoc_plans_running_per_student",
];

/// Maps a sqlx error onto a status, code, and client-safe message.
///
/// `RowNotFound` is a 404. Unique violations on the timer-exclusivity
/// indexes become 409 `CONCURRENCY_CONFLICT`; any other `uq_` constraint
/// becomes a plain 409. The rest is logged and answered with a sanitized
/// 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if matches!(err, sqlx::Error::RowNotFound) {
        return (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        );
    }

    // Postgres reports unique violations as SQLSTATE 23505.
    if let sqlx::Error::Database(db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if EXCLUSIVITY_CONSTRAINTS.contains(&constraint) {
                return (
                    StatusCode::CONFLICT,
                    "CONCURRENCY_CONFLICT",
                    "Another timer is already running".to_string(),
                );
            }
            if constraint.starts_with("uq_") {
                return (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                );
            }
        }
    }

    tracing::error!(error = %err, "Database error");
    sanitized_500()
}

fn sanitized_500() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
