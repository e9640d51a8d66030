//! Bearer-token extractor guarding the timer routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use studyflow_core::error::TimerError;
use studyflow_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Role claim required for every timer endpoint. Teachers and admins
/// operate through other services; the timer only ever acts on behalf of
/// the student who owns the plan.
const ROLE_STUDENT: &str = "student";

/// The student identified by the `Authorization: Bearer` token.
///
/// Taking this as a handler parameter is what makes a route require
/// authentication:
///
/// ```ignore
/// async fn pause(student: AuthStudent, ...) -> AppResult<Json<TimerStatus>> {
///     // student.student_id scopes every query below.
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthStudent {
    /// The student's internal database id (from `claims.sub`).
    pub student_id: DbId,
    /// The academy (tenant) scope from the token, if any.
    pub tenant_id: Option<DbId>,
}

impl FromRequestParts<AppState> for AuthStudent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Timer(TimerError::AuthRequired))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Timer(TimerError::AuthRequired))?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| AppError::Timer(TimerError::AuthRequired))?;

        if claims.role != ROLE_STUDENT {
            return Err(AppError::Timer(TimerError::AuthRequired));
        }

        Ok(AuthStudent {
            student_id: claims.sub,
            tenant_id: claims.tenant_id,
        })
    }
}
