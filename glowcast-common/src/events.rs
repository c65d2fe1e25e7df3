//! Overlay event types and EventBus
//!
//! The dispatch pipeline publishes through two channels that share these
//! types: the local UI event stream and the overlay broadcast consumed by
//! external renderers. Both are one-to-many tokio::broadcast fan-outs;
//! slow or absent subscribers never block a producer.

use crate::alert::AlertPayload;
use crate::speech::SpeechItem;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events delivered to overlay renderers and the local UI
///
/// Serialized as internally tagged JSON for the SSE wire:
/// `{"type": "Alert", ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OverlayEvent {
    /// A queued alert became active and should be presented now
    Alert {
        payload: AlertPayload,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A queued speech item became active and should be played now
    ///
    /// The renderer is expected to report playback completion back over
    /// the completion callback, but is not trusted to always do so.
    Speech {
        item: SpeechItem,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The alert queue was cleared by the operator
    QueueCleared {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Speech playback for the identified item finished (signal or timeout)
    ///
    /// Informational for the UI; queue advancement is driven internally.
    SpeechFinished {
        item_id: Uuid,
        timed_out: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl OverlayEvent {
    /// Get event type as string for SSE event naming and filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            OverlayEvent::Alert { .. } => "Alert",
            OverlayEvent::Speech { .. } => "Speech",
            OverlayEvent::QueueCleared { .. } => "QueueCleared",
            OverlayEvent::SpeechFinished { .. } => "SpeechFinished",
        }
    }
}

/// One-to-many event distribution bus
///
/// Thin wrapper over tokio::broadcast providing non-blocking publish,
/// multiple concurrent subscribers, and automatic cleanup when receivers
/// drop. Used for the local UI channel; the overlay transport embeds its
/// own sender with connection bookkeeping on top.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<OverlayEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<OverlayEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring whether anyone is listening
    ///
    /// Presentation events are ephemeral; an empty audience is normal
    /// (e.g. no UI window open), not an error.
    pub fn emit_lossy(&self, event: OverlayEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
