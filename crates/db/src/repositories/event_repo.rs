//! Persistence for platform events (audit trail).

use sqlx::PgPool;
use studyflow_core::types::DbId;

use crate::models::event::Event;

pub struct EventRepo;

impl EventRepo {
    const COLUMNS: &str = "id, event_type, source_entity_type, source_entity_id, \
        actor_student_id, payload, created_at";

    pub async fn insert(
        pool: &PgPool,
        event_type: &str,
        source_entity_type: Option<&str>,
        source_entity_id: Option<DbId>,
        actor_student_id: Option<DbId>,
        payload: &serde_json::Value,
    ) -> Result<Event, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events
                 (event_type, source_entity_type, source_entity_id, actor_student_id, payload)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            Self::COLUMNS
        ))
        .bind(event_type)
        .bind(source_entity_type)
        .bind(source_entity_id)
        .bind(actor_student_id)
        .bind(payload)
        .fetch_one(pool)
        .await
    }

    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Event>, sqlx::Error> {
        sqlx::query_as::<_, Event>(&format!(
            "SELECT {} FROM events ORDER BY created_at DESC, id DESC LIMIT $1",
            Self::COLUMNS
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
