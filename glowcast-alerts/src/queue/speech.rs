//! Speech item queue
//!
//! Single-flight queue for synthesized-speech items. Unlike the alert
//! queue it cannot self-time playback: only the remote renderer knows
//! when audio actually finishes, so the consumer suspends until the
//! renderer's completion signal arrives over the overlay transport's
//! callback, or a timeout elapses. The timeout bounds worst-case
//! staleness when a renderer disconnects, errors, or never existed.
//!
//! The queue is bounded and lossy under sustained overload: speech alerts
//! are ephemeral, and a stale backlog is worse than a gap, so the oldest
//! pending item is evicted when a new one arrives at capacity.

use crate::overlay::OverlayTransport;
use glowcast_common::events::{EventBus, OverlayEvent};
use glowcast_common::speech::SpeechItem;
use glowcast_common::tuning::AlertTuning;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

struct Inner {
    pending: VecDeque<SpeechItem>,
    active: Option<SpeechItem>,
    draining: bool,
    enabled: bool,
    /// Completion waiter for the active item; `notify_completion` takes
    /// and fires it, `set_enabled(false)` takes and drops it
    waiter: Option<oneshot::Sender<()>>,
    /// Bumped by `set_enabled(false)`; a stale drain task exits without
    /// touching state
    epoch: u64,
}

/// Single-flight speech presentation queue
pub struct SpeechQueue {
    inner: Mutex<Inner>,
    tuning: AlertTuning,
    transport: Arc<OverlayTransport>,
    ui: EventBus,
}

impl SpeechQueue {
    pub fn new(tuning: AlertTuning, transport: Arc<OverlayTransport>, ui: EventBus) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                pending: VecDeque::new(),
                active: None,
                draining: false,
                enabled: true,
                waiter: None,
                epoch: 0,
            }),
            tuning,
            transport,
            ui,
        })
    }

    /// Append an item; silently dropped while the queue is disabled
    ///
    /// At capacity the oldest *pending* item is evicted (never the active
    /// one) before the new item is appended.
    pub fn enqueue(self: &Arc<Self>, item: SpeechItem) {
        let start_consumer = {
            let mut inner = self.inner.lock().expect("speech queue lock poisoned");
            if !inner.enabled {
                debug!(item_id = %item.id, "speech queue disabled; dropping item");
                return;
            }
            if inner.pending.len() >= self.tuning.speech_max_pending {
                if let Some(evicted) = inner.pending.pop_front() {
                    warn!(item_id = %evicted.id, "speech queue full; evicting oldest pending item");
                }
            }
            inner.pending.push_back(item);
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

    /// Consumer loop: one item in flight, awaiting signal or timeout
    ///
    /// `epoch` is the queue epoch this task was spawned under; it is the
    /// task's ownership token. Re-validated under the lock at every state
    /// touch, so a task orphaned by a disable/enable cycle exits instead
    /// of clobbering a successor's state.
    async fn drain(self: Arc<Self>, epoch: u64) {
        loop {
            let (item, completion_rx) = {
                let mut inner = self.inner.lock().expect("speech queue lock poisoned");
                if inner.epoch != epoch {
                    // A fresh consumer owns the queue now
                    return;
                }
                let Some(item) = inner.pending.pop_front() else {
                    inner.active = None;
                    inner.draining = false;
                    debug!("speech queue drained; idle");
                    return;
                };
                inner.active = Some(item.clone());
                let (tx, rx) = oneshot::channel();
                inner.waiter = Some(tx);
                (item, rx)
            };

            let timed_out = if self.transport.is_running() {
                self.transport.broadcast(OverlayEvent::Speech {
                    item: item.clone(),
                    timestamp: chrono::Utc::now(),
                });

                // Resolve on whichever comes first: the renderer's
                // completion signal (or an abandoned waiter) or the
                // timeout. Exactly one resolution per item.
                let wait = Duration::from_millis(self.tuning.speech_timeout_ms);
                match tokio::time::timeout(wait, completion_rx).await {
                    Ok(_) => false,
                    Err(_) => {
                        debug!(item_id = %item.id, "speech completion timed out; advancing");
                        true
                    }
                }
            } else {
                // No transport to play through: synthesize completion so
                // the loop advances instead of stalling
                warn!(item_id = %item.id, "overlay transport not running; dropping speech item");
                false
            };

            {
                let mut inner = self.inner.lock().expect("speech queue lock poisoned");
                if inner.epoch != epoch {
                    // Disabled mid-flight; a fresh consumer owns the queue
                    return;
                }
                inner.active = None;
                inner.waiter = None;
            }
            // The loop top re-validates the epoch after the gap sleep

            self.ui.emit_lossy(OverlayEvent::SpeechFinished {
                item_id: item.id,
                timed_out,
                timestamp: chrono::Utc::now(),
            });

            // Brief gap so consecutive renders never overlap
            tokio::time::sleep(Duration::from_millis(self.tuning.speech_gap_ms)).await;
        }
    }

    /// Renderer reported the active item finished playing
    ///
    /// Satisfies the pending wait if one exists; late or duplicate
    /// signals are no-ops.
    pub fn notify_completion(&self) {
        let waiter = {
            let mut inner = self.inner.lock().expect("speech queue lock poisoned");
            inner.waiter.take()
        };
        match waiter {
            Some(tx) => {
                // Receiver may already be gone (timeout raced us); fine
                let _ = tx.send(());
            }
            None => debug!("speech completion signal with nothing active; ignoring"),
        }
    }

    /// Enable or disable the queue
    ///
    /// Disabling clears pending and active state immediately and abandons
    /// any in-flight wait; in-progress speech is intentionally cut off.
    pub fn set_enabled(&self, enabled: bool) {
        let abandoned = {
            let mut inner = self.inner.lock().expect("speech queue lock poisoned");
            inner.enabled = enabled;
            if enabled {
                None
            } else {
                inner.pending.clear();
                inner.active = None;
                inner.draining = false;
                inner.epoch += 1;
                inner.waiter.take()
            }
        };
        // Dropping the sender resolves the consumer's wait immediately
        drop(abandoned);
        debug!(enabled, "speech queue enabled state changed");
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.lock().expect("speech queue lock poisoned").enabled
    }

    /// Number of pending (not yet played) items
    pub fn len(&self) -> usize {
        self.inner.lock().expect("speech queue lock poisoned").pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Currently playing item, if any
    pub fn active_item(&self) -> Option<SpeechItem> {
        self.inner.lock().expect("speech queue lock poisoned").active.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_tuning() -> AlertTuning {
        AlertTuning {
            speech_timeout_ms: 100,
            speech_gap_ms: 5,
            speech_max_pending: 10,
            ..AlertTuning::default()
        }
    }

    fn setup(tuning: AlertTuning) -> (Arc<SpeechQueue>, Arc<OverlayTransport>, EventBus) {
        let transport = OverlayTransport::new(64);
        transport.start();
        let bus = EventBus::new(64);
        let queue = SpeechQueue::new(tuning, Arc::clone(&transport), bus.clone());
        (queue, transport, bus)
    }

    async fn wait_until_idle(queue: &Arc<SpeechQueue>) {
        for _ in 0..400 {
            let idle = {
                let inner = queue.inner.lock().unwrap();
                !inner.draining
            };
            if idle {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("speech queue never went idle");
    }

    #[tokio::test]
    async fn test_completion_signal_advances_queue() {
        let (queue, transport, _bus) = setup(AlertTuning {
            speech_timeout_ms: 60_000,
            ..fast_tuning()
        });
        let (mut rx, _guard) = transport.subscribe();

        queue.enqueue(SpeechItem::synthesis("first", "v"));
        queue.enqueue(SpeechItem::synthesis("second", "v"));

        // First item goes out and stays active until we signal
        let first = rx.recv().await.unwrap();
        assert_eq!(first.event_type(), "Speech");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(queue.active_item().is_some());
        assert_eq!(queue.len(), 1);

        queue.notify_completion();
        let second = rx.recv().await.unwrap();
        assert_eq!(second.event_type(), "Speech");

        queue.notify_completion();
        wait_until_idle(&queue).await;
        assert!(queue.active_item().is_none());
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test]
    async fn test_timeout_fallback_advances_without_signal() {
        let (queue, transport, _bus) = setup(fast_tuning());
        let (_rx, _guard) = transport.subscribe();

        queue.enqueue(SpeechItem::synthesis("never acked", "v"));

        // Never call notify_completion; the 100ms test timeout must
        // resolve the wait on its own
        wait_until_idle(&queue).await;
        assert!(queue.active_item().is_none());
    }

    #[tokio::test]
    async fn test_timeout_reported_on_ui_bus() {
        let (queue, transport, bus) = setup(fast_tuning());
        let (_rx, _guard) = transport.subscribe();
        let mut ui_rx = bus.subscribe();

        let item = SpeechItem::synthesis("never acked", "v");
        let item_id = item.id;
        queue.enqueue(item);

        loop {
            match ui_rx.recv().await.unwrap() {
                OverlayEvent::SpeechFinished {
                    item_id: id,
                    timed_out,
                    ..
                } => {
                    assert_eq!(id, item_id);
                    assert!(timed_out);
                    break;
                }
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let (queue, transport, _bus) = setup(fast_tuning());
        let (mut rx, _guard) = transport.subscribe();

        let items: Vec<SpeechItem> = (0..3)
            .map(|i| SpeechItem::synthesis(format!("msg {i}"), "v"))
            .collect();
        let ids: Vec<_> = items.iter().map(|i| i.id).collect();
        for item in items {
            queue.enqueue(item);
        }

        for expected in ids {
            match rx.recv().await.unwrap() {
                OverlayEvent::Speech { item, .. } => assert_eq!(item.id, expected),
                other => panic!("unexpected event {}", other.event_type()),
            }
            queue.notify_completion();
        }
    }

    #[tokio::test]
    async fn test_bounded_queue_evicts_oldest_pending() {
        let (queue, _transport, _bus) = setup(AlertTuning {
            speech_max_pending: 10,
            speech_timeout_ms: 60_000,
            ..fast_tuning()
        });
        // No subscriber needed; items queue behind the first active one

        let first = SpeechItem::synthesis("active", "v");
        let first_id = first.id;
        queue.enqueue(first);
        // Let the consumer claim the first item as active
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(queue.active_item().map(|i| i.id), Some(first_id));

        let mut pending_ids = Vec::new();
        for i in 0..10 {
            let item = SpeechItem::synthesis(format!("pending {i}"), "v");
            pending_ids.push(item.id);
            queue.enqueue(item);
        }
        assert_eq!(queue.len(), 10);

        // The 11th pending item evicts the oldest pending, not the active
        let overflow = SpeechItem::synthesis("overflow", "v");
        let overflow_id = overflow.id;
        queue.enqueue(overflow);

        assert_eq!(queue.len(), 10);
        assert_eq!(queue.active_item().map(|i| i.id), Some(first_id));
        let inner = queue.inner.lock().unwrap();
        let queued: Vec<_> = inner.pending.iter().map(|i| i.id).collect();
        assert!(!queued.contains(&pending_ids[0]), "oldest pending evicted");
        assert!(queued.contains(&overflow_id));
    }

    #[tokio::test]
    async fn test_late_signal_is_noop() {
        let (queue, transport, _bus) = setup(fast_tuning());
        let (mut rx, _guard) = transport.subscribe();

        // Nothing active at all
        queue.notify_completion();
        queue.notify_completion();

        // Queue still works afterward
        queue.enqueue(SpeechItem::synthesis("after", "v"));
        assert_eq!(rx.recv().await.unwrap().event_type(), "Speech");
        queue.notify_completion();
        wait_until_idle(&queue).await;
    }

    #[tokio::test]
    async fn test_disable_mid_flight_clears_everything() {
        let (queue, transport, _bus) = setup(AlertTuning {
            speech_timeout_ms: 60_000,
            ..fast_tuning()
        });
        let (mut rx, _guard) = transport.subscribe();

        queue.enqueue(SpeechItem::synthesis("active", "v"));
        queue.enqueue(SpeechItem::synthesis("pending", "v"));
        assert_eq!(rx.recv().await.unwrap().event_type(), "Speech");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(queue.active_item().is_some());

        queue.set_enabled(false);
        assert!(queue.active_item().is_none());
        assert_eq!(queue.len(), 0);
        wait_until_idle(&queue).await;

        // Disabled queue drops new items silently
        queue.enqueue(SpeechItem::synthesis("dropped", "v"));
        assert_eq!(queue.len(), 0);

        // Re-enabling resumes normal operation
        queue.set_enabled(true);
        queue.enqueue(SpeechItem::synthesis("resumed", "v"));
        assert_eq!(rx.recv().await.unwrap().event_type(), "Speech");
        queue.notify_completion();
        wait_until_idle(&queue).await;
    }

    #[tokio::test]
    async fn test_reenable_during_gap_does_not_revive_old_consumer() {
        let (queue, transport, _bus) = setup(AlertTuning {
            speech_timeout_ms: 60_000,
            speech_gap_ms: 300,
            ..fast_tuning()
        });
        let (mut rx, _guard) = transport.subscribe();

        queue.enqueue(SpeechItem::synthesis("first", "v"));
        assert_eq!(rx.recv().await.unwrap().event_type(), "Speech");
        queue.notify_completion();

        // The consumer is now in its inter-item gap sleep. Disable and
        // re-enable, then hand the queue to a fresh consumer.
        tokio::time::sleep(Duration::from_millis(50)).await;
        queue.set_enabled(false);
        queue.set_enabled(true);
        let second = SpeechItem::synthesis("second", "v");
        let second_id = second.id;
        queue.enqueue(second);
        assert_eq!(rx.recv().await.unwrap().event_type(), "Speech");

        // Once the old consumer's gap expires it must exit, not clear
        // the new consumer's still-playing item
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(queue.active_item().map(|i| i.id), Some(second_id));
        assert!(queue.is_enabled());

        queue.notify_completion();
        wait_until_idle(&queue).await;
    }

    #[tokio::test]
    async fn test_transport_not_running_synthesizes_completion() {
        let transport = OverlayTransport::new(64);
        // Never started
        let bus = EventBus::new(64);
        let queue = SpeechQueue::new(fast_tuning(), Arc::clone(&transport), bus.clone());
        let mut ui_rx = bus.subscribe();

        queue.enqueue(SpeechItem::synthesis("nowhere to go", "v"));

        // Advances without waiting for the (impossible) signal
        match ui_rx.recv().await.unwrap() {
            OverlayEvent::SpeechFinished { timed_out, .. } => assert!(!timed_out),
            other => panic!("unexpected event {}", other.event_type()),
        }
        wait_until_idle(&queue).await;
    }
}
