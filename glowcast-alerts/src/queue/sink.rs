//! Dispatch sinks
//!
//! The alert queue publishes every payload to each registered sink in
//! turn. Sinks are fire-and-forget: a failure is logged by the queue and
//! never aborts the drain loop or the other sinks.

use crate::error::Result;
use crate::overlay::OverlayTransport;
use glowcast_common::alert::AlertPayload;
use glowcast_common::events::{EventBus, OverlayEvent};
use std::sync::Arc;

/// One-way publish target for alert payloads
pub trait AlertSink: Send + Sync {
    /// Sink name for logs
    fn name(&self) -> &'static str;

    fn deliver(&self, payload: &AlertPayload) -> Result<()>;
}

/// Local UI sink: pushes the alert onto the in-application event bus
pub struct UiSink {
    bus: EventBus,
}

impl UiSink {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

impl AlertSink for UiSink {
    fn name(&self) -> &'static str {
        "local-ui"
    }

    fn deliver(&self, payload: &AlertPayload) -> Result<()> {
        // Nobody listening is normal (no UI window open)
        self.bus.emit_lossy(OverlayEvent::Alert {
            payload: payload.clone(),
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }
}

/// Overlay sink: broadcasts the alert to all connected renderers
pub struct OverlaySink {
    transport: Arc<OverlayTransport>,
}

impl OverlaySink {
    pub fn new(transport: Arc<OverlayTransport>) -> Self {
        Self { transport }
    }
}

impl AlertSink for OverlaySink {
    fn name(&self) -> &'static str {
        "overlay"
    }

    fn deliver(&self, payload: &AlertPayload) -> Result<()> {
        self.transport.broadcast(OverlayEvent::Alert {
            payload: payload.clone(),
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }
}
