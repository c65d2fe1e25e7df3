//! Alert delivery queue
//!
//! Ordered, unbounded, in-memory queue with a single consumer task. Each
//! payload is published to every dispatch sink, then the consumer holds
//! the item "live" for its computed display duration before advancing.
//! Strict FIFO; at most one payload is active at any instant.
//!
//! `enqueue` never blocks and is safe from arbitrary concurrent
//! producers; the queue itself serializes consumption via the `draining`
//! flag. `clear` is the emergency stop: it abandons the in-flight wait
//! and forces Idle immediately.

use crate::queue::sink::AlertSink;
use glowcast_common::alert::AlertPayload;
use glowcast_common::tuning::AlertTuning;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, warn};

struct Inner {
    pending: VecDeque<AlertPayload>,
    active: Option<AlertPayload>,
    draining: bool,
    /// Bumped by `clear`; a drain task whose epoch no longer matches
    /// exits without touching state
    epoch: u64,
}

/// Single-flight alert presentation queue
pub struct AlertQueue {
    inner: Mutex<Inner>,
    cleared: Notify,
    tuning: AlertTuning,
    sinks: Vec<Arc<dyn AlertSink>>,
}

impl AlertQueue {
    pub fn new(tuning: AlertTuning, sinks: Vec<Arc<dyn AlertSink>>) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                pending: VecDeque::new(),
                active: None,
                draining: false,
                epoch: 0,
            }),
            cleared: Notify::new(),
            tuning,
            sinks,
        })
    }

    /// Append a payload; starts the consumer task if the queue was Idle
    pub fn enqueue(self: &Arc<Self>, payload: AlertPayload) {
        let start_consumer = {
            let mut inner = self.inner.lock().expect("alert queue lock poisoned");
            inner.pending.push_back(payload);
            if inner.draining {
                None
            } else {
                inner.draining = true;
                Some(inner.epoch)
            }
        };

        if let Some(epoch) = start_consumer {
            let queue = Arc::clone(self);
            tokio::spawn(async move {
                queue.drain(epoch).await;
            });
        }
    }

    /// Consumer loop: runs until `pending` empties or the queue is cleared
    ///
    /// `epoch` is the task's ownership token, captured when it was
    /// spawned. Every state touch re-validates it under the lock, so a
    /// task orphaned by `clear` can never pop an item that belongs to a
    /// successor consumer.
    async fn drain(self: Arc<Self>, epoch: u64) {
        loop {
            let payload = {
                let mut inner = self.inner.lock().expect("alert queue lock poisoned");
                if inner.epoch != epoch {
                    // A fresh consumer owns the queue now
                    return;
                }
                match inner.pending.pop_front() {
                    Some(payload) => {
                        inner.active = Some(payload.clone());
                        payload
                    }
                    None => {
                        inner.active = None;
                        inner.draining = false;
                        debug!("alert queue drained; idle");
                        return;
                    }
                }
            };

            // Publish to both sinks; a failing sink never aborts the loop
            // and the item counts as presented regardless
            for sink in &self.sinks {
                if let Err(e) = sink.deliver(&payload) {
                    warn!(sink = sink.name(), error = %e, "alert sink publish failed");
                }
            }

            let duration = payload.display_duration_ms(&self.tuning);
            debug!(
                event_type = %payload.event_type,
                duration_ms = duration,
                "alert presented"
            );

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(duration)) => {}
                _ = self.cleared.notified() => {}
            }

            {
                let mut inner = self.inner.lock().expect("alert queue lock poisoned");
                if inner.epoch != epoch {
                    // Cleared while we were waiting; a fresh consumer owns
                    // the queue now
                    return;
                }
                inner.active = None;
            }
        }
    }

    /// Emergency stop: empty pending, abandon the in-flight wait, force Idle
    pub fn clear(&self) {
        {
            let mut inner = self.inner.lock().expect("alert queue lock poisoned");
            inner.pending.clear();
            inner.active = None;
            inner.draining = false;
            inner.epoch += 1;
        }
        self.cleared.notify_waiters();
        debug!("alert queue cleared");
    }

    /// Number of pending (not yet presented) payloads
    pub fn len(&self) -> usize {
        self.inner.lock().expect("alert queue lock poisoned").pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True while the consumer task is running
    pub fn is_draining(&self) -> bool {
        self.inner.lock().expect("alert queue lock poisoned").draining
    }

    /// Currently presented payload, if any
    pub fn active(&self) -> Option<AlertPayload> {
        self.inner.lock().expect("alert queue lock poisoned").active.clone()
    }
}
