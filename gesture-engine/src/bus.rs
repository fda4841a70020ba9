//! Event delivery: synchronous gesture listeners and a non-blocking
//! broadcast fan-out.
//!
//! Listeners run inline in the frame pass, in registration order.  The
//! broadcaster gives each subscriber its own bounded crossbeam channel and
//! uses `try_send`, so a slow or vanished consumer costs a dropped event,
//! never a delayed frame.

use std::fmt;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, warn};

use crate::events::{EngineEvent, GestureEvent};

/// Per-subscriber channel capacity (about four seconds of 60 fps telemetry).
pub const BROADCAST_CAPACITY: usize = 256;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback invoked for every emitted gesture.
pub type GestureListener = Box<dyn FnMut(&GestureEvent) + Send>;

// ── Listeners ──────────────────────────────────────────────

/// Registration-ordered gesture callbacks.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(ListenerId, GestureListener)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: GestureListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        debug!(id = id.0, total = self.listeners.len(), "listener subscribed");
        id
    }

    /// Remove a listener.  Returns false if the id was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn notify(&mut self, event: &GestureEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

// ── Broadcast ──────────────────────────────────────────────

/// Delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastStats {
    /// Events delivered to at least one subscriber.
    pub sent: u64,
    /// Per-subscriber deliveries dropped because a channel was full.
    pub dropped: u64,
    /// Subscribers pruned after their receiver was dropped.
    pub pruned: u64,
}

/// Fan-out of `EngineEvent`s to any number of channel receivers.
#[derive(Debug)]
pub struct Broadcaster {
    senders: Vec<Sender<EngineEvent>>,
    capacity: usize,
    stats: BroadcastStats,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::with_capacity(BROADCAST_CAPACITY)
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            senders: Vec::new(),
            capacity: capacity.max(1),
            stats: BroadcastStats::default(),
        }
    }

    /// Open a new receiver.  Events sent before this call are not replayed.
    pub fn subscribe(&mut self) -> Receiver<EngineEvent> {
        let (tx, rx) = bounded(self.capacity);
        self.senders.push(tx);
        rx
    }

    /// Deliver to every live receiver without blocking.
    pub fn send(&mut self, event: &EngineEvent) {
        if self.senders.is_empty() {
            return;
        }
        let before = self.senders.len();
        let mut delivered = false;
        let mut dropped = 0u64;
        self.senders.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => {
                delivered = true;
                true
            }
            Err(TrySendError::Full(_)) => {
                dropped += 1;
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });

        if dropped > 0 {
            warn!(dropped, "broadcast receiver full, dropping event");
            self.stats.dropped += dropped;
        }
        if delivered {
            self.stats.sent += 1;
        }
        let pruned = (before - self.senders.len()) as u64;
        if pruned > 0 {
            debug!(pruned, live = self.senders.len(), "pruned disconnected receivers");
            self.stats.pruned += pruned;
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.senders.len()
    }

    pub fn stats(&self) -> BroadcastStats {
        self.stats
    }
}
