//! Event types for the VetWatch event system
//!
//! Provides the shared event enum and the broadcast EventBus used to push
//! dashboard updates over SSE.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// VetWatch event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VetEvent {
    /// A media analysis finished
    AnalysisCompleted {
        analysis_id: Uuid,
        file_name: String,
        symptom_count: usize,
        alert_generated: bool,
        timestamp: DateTime<Utc>,
    },

    /// An alert was raised from an analysis
    AlertCreated {
        alert_id: Uuid,
        severity: String,
        title: String,
        recipients: usize,
        timestamp: DateTime<Utc>,
    },

    /// An alert was acknowledged
    AlertRead {
        alert_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A user was added to the directory
    UserRegistered {
        user_id: Uuid,
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// A message was sent between users
    MessageSent {
        message_id: Uuid,
        sender_id: Uuid,
        receiver_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// A tracked form submission was appended to the history
    FormRecorded {
        record_id: Uuid,
        form_type: String,
        timestamp: DateTime<Utc>,
    },
}

impl VetEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            VetEvent::AnalysisCompleted { .. } => "AnalysisCompleted",
            VetEvent::AlertCreated { .. } => "AlertCreated",
            VetEvent::AlertRead { .. } => "AlertRead",
            VetEvent::UserRegistered { .. } => "UserRegistered",
            VetEvent::MessageSent { .. } => "MessageSent",
            VetEvent::FormRecorded { .. } => "FormRecorded",
        }
    }
}

/// Broadcast bus for VetEvents
///
/// Cloning shares the underlying channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<VetEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before lagging subscribers drop old events
    ///
    /// # Examples
    ///
    /// ```
    /// use vetwatch_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<VetEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// ```
    /// use vetwatch_common::events::{EventBus, VetEvent};
    /// use uuid::Uuid;
    ///
    /// let event_bus = EventBus::new(100);
    /// event_bus.emit_lossy(VetEvent::AlertRead {
    ///     alert_id: Uuid::new_v4(),
    ///     timestamp: chrono::Utc::now(),
    /// });
    /// ```
    pub fn emit_lossy(&self, event: VetEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

}
