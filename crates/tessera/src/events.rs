//! # Tessera Event Bus
//!
//! Typed publish/subscribe between systems that must not know about each
//! other.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  publish         ┌──────────┐   Hover      ┌──────────────┐
//! │ InputSystem  │─────────────────>│          │─────────────>│ GuiHover     │
//! └──────────────┘  publish_async   │ EventBus │              └──────────────┘
//! ┌──────────────┐  (worker pool)   │          │   Clicked    ┌──────────────┐
//! │ RadarSystem  │─────────────────>│          │─────────────>│ game code    │
//! └──────────────┘                  └──────────┘              └──────────────┘
//! ```
//!
//! Each subscriber owns a bounded crossbeam queue and declares the event
//! kinds it wants. Publishing never blocks: a full queue drops the event
//! and logs a warning. Receivers dropped by their owner are pruned on the
//! next publish.
//!
//! Events published with [`EventBus::publish_async`] are delivered from a
//! worker thread. Nothing orders them against the rest of the frame; a
//! subscriber sees them at its next drain at the earliest.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;
use tessera_core::{ActionId, CoreResult, EntityId, WorkerPool};
use tracing::{trace, warn};

/// Semantic mouse button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Pointer motion without a button.
    #[default]
    None,
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
}

/// Events that flow between systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EngineEvent {
    /// The pointer entered or left a clickable entity.
    ///
    /// Emitted by: input dispatch, once per clickable per mouse event.
    /// Consumed by: GUI hover feedback.
    Hover {
        /// Entity under test.
        entity: EntityId,
        /// Whether the pointer is inside it.
        hovering: bool,
    },

    /// A mouse button went down over a clickable entity.
    Clicked {
        /// Entity that was clicked.
        entity: EntityId,
        /// Button pressed.
        button: MouseButton,
        /// Action bound to the clickable.
        action: ActionId,
    },

    /// A radar found an entity carrying its target tag.
    TargetDetected {
        /// Entity owning the radar.
        radar: EntityId,
        /// Detected entity.
        target: EntityId,
    },

    /// Two colliders overlapped and were pushed apart.
    Collision {
        /// First entity (lower id).
        a: EntityId,
        /// Second entity.
        b: EntityId,
    },
}

/// Discriminant of [`EngineEvent`], used to filter subscriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`EngineEvent::Hover`]
    Hover,
    /// [`EngineEvent::Clicked`]
    Clicked,
    /// [`EngineEvent::TargetDetected`]
    TargetDetected,
    /// [`EngineEvent::Collision`]
    Collision,
}

impl EventKind {
    /// Every kind.
    pub const ALL: &'static [Self] = &[
        Self::Hover,
        Self::Clicked,
        Self::TargetDetected,
        Self::Collision,
    ];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl EngineEvent {
    /// Kind of this event.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Hover { .. } => EventKind::Hover,
            Self::Clicked { .. } => EventKind::Clicked,
            Self::TargetDetected { .. } => EventKind::TargetDetected,
            Self::Collision { .. } => EventKind::Collision,
        }
    }
}

struct Subscription {
    id: u64,
    mask: u8,
    sender: Sender<EngineEvent>,
}

struct BusInner {
    subscribers: RwLock<Vec<Subscription>>,
    capacity: usize,
    next_id: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

/// Event bus shared by every system of an engine.
///
/// Cloning is cheap and every clone publishes to the same subscribers.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Creates a bus whose subscriber queues hold `capacity` events.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Events a subscriber may leave undrained before new
    ///   ones are dropped. Use 1024 for a typical game loop.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscribers: RwLock::new(Vec::new()),
                capacity: capacity.max(1),
                next_id: AtomicU64::new(0),
                delivered: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Subscribes to the given kinds.
    #[must_use]
    pub fn subscribe(&self, kinds: &[EventKind]) -> EventReceiver {
        let mask = kinds.iter().fold(0, |mask, kind| mask | kind.bit());
        let (sender, receiver) = bounded(self.inner.capacity);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .write()
            .push(Subscription { id, mask, sender });
        EventReceiver { receiver }
    }

    /// Subscribes to every kind.
    #[must_use]
    pub fn subscribe_all(&self) -> EventReceiver {
        self.subscribe(EventKind::ALL)
    }

    /// Delivers `event` to every interested subscriber, on this thread.
    ///
    /// # Returns
    ///
    /// The number of subscribers that received it.
    pub fn publish(&self, event: EngineEvent) -> usize {
        let bit = event.kind().bit();
        let mut delivered = 0;
        let mut disconnected = Vec::new();

        {
            let subscribers = self.inner.subscribers.read();
            for sub in subscribers.iter().filter(|s| s.mask & bit != 0) {
                match sub.sender.try_send(event) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        self.inner.dropped.fetch_add(1, Ordering::Relaxed);
                        warn!(kind = ?event.kind(), subscriber = sub.id, "subscriber queue full, event dropped");
                    }
                    Err(TrySendError::Disconnected(_)) => disconnected.push(sub.id),
                }
            }
        }

        if !disconnected.is_empty() {
            self.inner
                .subscribers
                .write()
                .retain(|s| !disconnected.contains(&s.id));
            trace!(pruned = disconnected.len(), "dropped receivers pruned");
        }

        self.inner
            .delivered
            .fetch_add(delivered as u64, Ordering::Relaxed);
        delivered
    }

    /// Queues `event` for delivery on a pool worker and returns at once.
    ///
    /// # Errors
    ///
    /// Fails only if the pool is shut down.
    pub fn publish_async(&self, pool: &WorkerPool, event: EngineEvent) -> CoreResult<()> {
        let bus = self.clone();
        pool.execute(move || {
            bus.publish(event);
        })
    }

    /// Removes every subscriber. Their receivers report disconnected once
    /// drained.
    pub fn reset(&self) {
        self.inner.subscribers.write().clear();
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }

    /// Total deliveries so far.
    #[must_use]
    pub fn delivered_count(&self) -> u64 {
        self.inner.delivered.load(Ordering::Relaxed)
    }

    /// Events dropped on full queues so far.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(tessera_shared::constants::EVENT_CHANNEL_CAPACITY)
    }
}

/// Handle for receiving events.
pub struct EventReceiver {
    receiver: Receiver<EngineEvent>,
}

impl EventReceiver {
    /// Receives all pending events (non-blocking).
    #[inline]
    pub fn drain(&self) -> Vec<EngineEvent> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event (non-blocking).
    #[inline]
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if there are pending events.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hover(raw: u64, hovering: bool) -> EngineEvent {
        EngineEvent::Hover {
            entity: EntityId::new(raw),
            hovering,
        }
    }

    #[test]
    fn test_kind_filtering() {
        let bus = EventBus::new(16);
        let hovers = bus.subscribe(&[EventKind::Hover]);
        let radar = bus.subscribe(&[EventKind::TargetDetected]);

        assert_eq!(bus.publish(hover(1, true)), 1);
        assert_eq!(
            bus.publish(EngineEvent::TargetDetected {
                radar: EntityId::new(1),
                target: EntityId::new(2),
            }),
            1
        );

        assert_eq!(hovers.drain(), vec![hover(1, true)]);
        assert_eq!(radar.pending_count(), 1);
        assert!(!hovers.has_events());
    }

    #[test]
    fn test_full_queue_drops() {
        let bus = EventBus::new(2);
        let rx = bus.subscribe_all();
        for i in 0..5 {
            bus.publish(hover(i, false));
        }
        assert_eq!(rx.drain().len(), 2);
        assert_eq!(bus.dropped_count(), 3);
        assert_eq!(bus.delivered_count(), 2);
    }

    #[test]
    fn test_dropped_receiver_is_pruned() {
        let bus = EventBus::new(4);
        let keep = bus.subscribe_all();
        drop(bus.subscribe_all());
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.publish(hover(7, true)), 1);
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.try_recv(), Some(hover(7, true)));
    }

    #[test]
    fn test_publish_async_is_delivered() {
        let pool = WorkerPool::new(2).unwrap();
        let bus = EventBus::new(64);
        let rx = bus.subscribe(&[EventKind::Hover]);

        for i in 0..10 {
            bus.publish_async(&pool, hover(i, true)).unwrap();
        }
        pool.wait_idle();

        let mut ids: Vec<u64> = rx
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                EngineEvent::Hover { entity, .. } => Some(entity.raw()),
                _ => None,
            })
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_reset_disconnects() {
        let bus = EventBus::default();
        let rx = bus.subscribe_all();
        bus.reset();
        assert_eq!(bus.publish(hover(1, true)), 0);
        assert!(rx.drain().is_empty());
    }
}
