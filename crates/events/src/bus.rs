//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`AlertEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storewatch_core::types::DbId;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// AlertEvent
// ---------------------------------------------------------------------------

/// Published whenever the evaluator or the health sweep creates an alert.
///
/// Carries everything a delivery channel needs, so subscribers never have
/// to read the alert back from the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub alert_id: DbId,
    pub tenant_id: DbId,
    pub sensor_id: DbId,
    pub site_id: DbId,

    /// `threshold_exceeded`, `threshold_below` or `sensor_offline`.
    pub alert_type: String,

    /// `info`, `warning` or `critical`.
    pub severity: String,

    /// Human-readable description, e.g.
    /// `"Freezer 2: value 38°C exceeded threshold 35°C"`.
    pub message: String,

    pub trigger_value: Option<f64>,
    pub threshold_value: Option<f64>,

    /// Channel names from the rule (`"email"`, `"webhook"`); unknown names
    /// are skipped by the dispatcher.
    pub channels: Vec<String>,

    /// When the alert was created (UTC).
    pub timestamp: DateTime<Utc>,
}

/// Extract channel names from a rule's `notification_channels` JSON array.
///
/// Non-string elements and non-array values yield nothing; the dispatcher
/// treats an empty list as "no delivery".
pub fn channel_names(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`AlertEvent`].
pub struct EventBus {
    sender: broadcast::Sender<AlertEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// the alert row itself is already durable at this point.
    pub fn publish(&self, event: AlertEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
