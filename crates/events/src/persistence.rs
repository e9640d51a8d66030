//! Audit persistence: every published event lands in the `events` table.
//!
//! Runs as a long-lived task next to the HTTP server. A write failure is
//! logged and the loop moves on; the audit trail is best-effort and must
//! never stall the bus.

use studyflow_db::repositories::EventRepo;
use studyflow_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::PlatformEvent;

/// Background consumer writing the event audit trail.
pub struct EventPersistence;

impl EventPersistence {
    /// Consume events until the bus closes (all senders dropped).
    pub async fn run(pool: DbPool, mut events: broadcast::Receiver<PlatformEvent>) {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Audit log fell behind the bus, events skipped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            let written = EventRepo::insert(
                &pool,
                &event.event_type,
                event.source_entity_type.as_deref(),
                event.source_entity_id,
                event.actor_student_id,
                &event.payload,
            )
            .await;

            if let Err(e) = written {
                tracing::error!(
                    error = %e,
                    event_type = %event.event_type,
                    "Event not persisted"
                );
            }
        }
        tracing::info!("Event bus closed, audit persistence stopped");
    }
}
