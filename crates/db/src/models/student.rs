//! Student entity model.
//!
//! Students are owned by the wider platform; the timer engine only needs
//! them as a foreign-key target and as the auth principal.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studyflow_core::types::{DbId, Timestamp};

/// A row from the `students` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: DbId,
    pub tenant_id: Option<DbId>,
    pub name: String,
    pub created_at: Timestamp,
}

/// Fields required to insert a student (tests and seeds).
#[derive(Debug, Deserialize)]
pub struct CreateStudent {
    pub tenant_id: Option<DbId>,
    pub name: String,
}
