//! Overlay broadcast transport
//!
//! The channel external overlay renderers (browser sources in broadcast
//! software) consume. Publishing is fire-and-forget to every connected
//! renderer; there is no per-recipient acknowledgment and no retry. All
//! sequencing logic lives in the queues — the transport only moves events
//! and keeps connection bookkeeping for observability.

use glowcast_common::events::OverlayEvent;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Observability counters exposed over the stats endpoint
#[derive(Debug, Clone, Serialize)]
pub struct TransportStats {
    pub connected_renderers: usize,
    pub alerts_broadcast: u64,
    pub running: bool,
}

/// Broadcast channel to all connected overlay renderers
pub struct OverlayTransport {
    tx: broadcast::Sender<OverlayEvent>,
    connected: AtomicUsize,
    alerts_broadcast: AtomicU64,
    running: AtomicBool,
}

impl OverlayTransport {
    /// Create a transport buffering up to `capacity` events per renderer
    pub fn new(capacity: usize) -> Arc<Self> {
        let (tx, _) = broadcast::channel(capacity);
        Arc::new(Self {
            tx,
            connected: AtomicUsize::new(0),
            alerts_broadcast: AtomicU64::new(0),
            running: AtomicBool::new(false),
        })
    }

    /// Mark the transport as hosting connections (server started)
    pub fn start(&self) {
        self.running.store(true, Ordering::Relaxed);
    }

    /// Mark the transport as stopped; queues synthesize completions while
    /// the transport is down rather than stalling on an unreachable sink
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Fire-and-forget publish to every connected renderer
    ///
    /// An empty audience is not an error; the event is simply dropped.
    pub fn broadcast(&self, event: OverlayEvent) {
        if matches!(event, OverlayEvent::Alert { .. }) {
            self.alerts_broadcast.fetch_add(1, Ordering::Relaxed);
        }
        let _ = self.tx.send(event);
    }

    /// Subscribe a renderer connection
    ///
    /// Returns the event receiver and a guard that keeps the connection
    /// counter accurate; dropping the guard (stream closed) decrements it.
    pub fn subscribe(self: &Arc<Self>) -> (broadcast::Receiver<OverlayEvent>, ConnectionGuard) {
        let count = self.connected.fetch_add(1, Ordering::Relaxed) + 1;
        info!(connected = count, "overlay renderer connected");
        (
            self.tx.subscribe(),
            ConnectionGuard {
                transport: Arc::clone(self),
            },
        )
    }

    /// Number of currently connected renderers
    pub fn connection_count(&self) -> usize {
        self.connected.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> TransportStats {
        TransportStats {
            connected_renderers: self.connection_count(),
            alerts_broadcast: self.alerts_broadcast.load(Ordering::Relaxed),
            running: self.is_running(),
        }
    }
}

/// Tracks one renderer connection's lifetime
pub struct ConnectionGuard {
    transport: Arc<OverlayTransport>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let count = self.transport.connected.fetch_sub(1, Ordering::Relaxed) - 1;
        debug!(connected = count, "overlay renderer disconnected");
    }
}
