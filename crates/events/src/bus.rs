//! In-process event bus.
//!
//! Domain actions publish [`PlatformEvent`]s onto an [`EventBus`] after
//! their transaction commits; background consumers (audit persistence,
//! rewards) each hold a subscription. Publishing never blocks and never
//! fails the publishing request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use studyflow_core::types::DbId;
use tokio::sync::broadcast;

/// Buffer size of the underlying broadcast channel.
const BUS_CAPACITY: usize = 1024;

/// A domain event, e.g. a timer start or a group completion.
///
/// Build with [`PlatformEvent::new`] and the `with_*` methods:
///
/// ```rust
/// use studyflow_events::PlatformEvent;
///
/// let event = PlatformEvent::new("plan.completed")
///     .with_source("plan", 17)
///     .with_actor(3)
///     .with_payload(serde_json::json!({ "net_seconds": 1480 }));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated name, `"<entity>.<what happened>"`.
    pub event_type: String,
    /// Kind of entity the event is about (`"plan"`, `"study_session"`, ...).
    pub source_entity_type: Option<String>,
    /// Id of that entity.
    pub source_entity_id: Option<DbId>,
    /// Student whose request raised the event.
    pub actor_student_id: Option<DbId>,
    /// Event-specific JSON payload.
    pub payload: serde_json::Value,
    /// Creation time (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    /// An event with the given type and nothing else filled in.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_student_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Name the entity this event is about.
    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    /// Name the student who caused it.
    pub fn with_actor(mut self, student_id: DbId) -> Self {
        self.actor_student_id = Some(student_id);
        self
    }

    /// Attach a JSON payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Fan-out hub over `tokio::sync::broadcast`, shared as `Arc<EventBus>`.
///
/// Every subscriber receives every event published after it subscribed.
/// With no subscribers at all, events vanish; the consumers are expected
/// to outlive the router.
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// A bus whose channel buffers `capacity` events. A subscriber that
    /// falls further behind than that observes `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Never blocks; an error from the
    /// channel only means nobody is listening.
    pub fn publish(&self, event: PlatformEvent) {
        let _ = self.sender.send(event);
    }

    /// Open a new subscription receiving all subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(BUS_CAPACITY)
    }
}
