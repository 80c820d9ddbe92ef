//! Event types for the spread event system
//!
//! Provides the shared event enum and the broadcast EventBus used to feed
//! Server-Sent Events to connected browsers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Enrichment events
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SpreadEvent {
    /// A location file was uploaded, normalized and given IDs
    LocationsLoaded {
        session_id: Uuid,
        /// Records in the batch
        total: usize,
        /// Records that received a fresh ID
        ids_assigned: usize,
        timestamp: DateTime<Utc>,
    },

    /// Background enrichment started for a session
    EnrichmentStarted {
        session_id: Uuid,
        total: usize,
        timestamp: DateTime<Utc>,
    },

    /// One record finished enrichment
    ///
    /// Emitted once per record, after the record is fully processed.
    EnrichmentProgress {
        session_id: Uuid,
        /// 1-based index of the record just processed
        current: usize,
        total: usize,
        /// Record name (may be empty)
        name: String,
        /// Human-readable status line ("Processing 3/10: Acme Store")
        status: String,
        timestamp: DateTime<Utc>,
    },

    /// All records enriched; output ready for download
    EnrichmentCompleted {
        session_id: Uuid,
        total: usize,
        /// Records whose coordinates were filled in by geocoding
        geocoded: usize,
        /// Records updated from place details
        places_matched: usize,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
}

impl SpreadEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            SpreadEvent::LocationsLoaded { .. } => "LocationsLoaded",
            SpreadEvent::EnrichmentStarted { .. } => "EnrichmentStarted",
            SpreadEvent::EnrichmentProgress { .. } => "EnrichmentProgress",
            SpreadEvent::EnrichmentCompleted { .. } => "EnrichmentCompleted",
        }
    }

    /// Session the event belongs to
    pub fn session_id(&self) -> Uuid {
        match self {
            SpreadEvent::LocationsLoaded { session_id, .. }
            | SpreadEvent::EnrichmentStarted { session_id, .. }
            | SpreadEvent::EnrichmentProgress { session_id, .. }
            | SpreadEvent::EnrichmentCompleted { session_id, .. } => *session_id,
        }
    }
}

/// Broadcast bus for [`SpreadEvent`]s
///
/// Cloning is cheap; all clones share one channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SpreadEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use spread_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SpreadEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: SpreadEvent,
    ) -> Result<usize, broadcast::error::SendError<SpreadEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// Progress updates are fine to lose when no browser is connected.
    pub fn emit_lossy(&self, event: SpreadEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
