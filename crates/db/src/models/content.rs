//! Content entity model.
//!
//! A content is the thing a plan studies: a book (capacity in pages), a
//! lecture series (capacity in episodes), or a custom entry. Completion
//! math needs only the capacity, normalized into `total_units`.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studyflow_core::types::{DbId, Timestamp};

/// A row from the `contents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Content {
    pub id: DbId,
    pub tenant_id: Option<DbId>,
    pub content_type: String,
    pub title: String,
    pub subject: Option<String>,
    /// Pages for books, episodes for lectures. NULL means never set.
    pub total_units: Option<i32>,
    pub created_at: Timestamp,
}

/// Fields required to insert a content (tests and seeds).
#[derive(Debug, Deserialize)]
pub struct CreateContent {
    pub tenant_id: Option<DbId>,
    pub content_type: String,
    pub title: String,
    pub subject: Option<String>,
    pub total_units: Option<i32>,
}
