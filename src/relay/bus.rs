//! Broadcast fan-out for session-level events.
//!
//! Crossbeam channels are point-to-point, so the bus keeps one unbounded
//! channel per subscriber and clones each published event to all of them.
//! Subscribers that dropped their receiver are pruned on the next publish.

use super::events::RelayEvent;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Broadcast channel for [`RelayEvent`] values.
///
/// Publishing with zero subscribers is legal and drops the event;
/// session plumbing fires events without caring who listens.
///
/// # Example
///
/// ```
/// use relay_buffer::{EventBus, RelayEvent, SessionState};
///
/// let bus = EventBus::new();
/// let rx = bus.subscribe();
/// bus.publish(RelayEvent::StateChanged {
///     state: SessionState::CONNECTED,
/// });
/// assert!(matches!(
///     rx.recv().unwrap(),
///     RelayEvent::StateChanged { .. }
/// ));
/// ```
#[derive(Default)]
pub struct EventBus {
    /// Send half of every live subscription.
    subscribers: Mutex<Vec<Sender<RelayEvent>>>,
}

impl EventBus {
    /// Create a bus with no subscribers.
    pub const fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Critical sections never panic; recover from poisoning and continue.
    fn lock(&self) -> MutexGuard<'_, Vec<Sender<RelayEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a new subscription.
    ///
    /// The receiver sees every event published after this call. Dropping
    /// it ends the subscription; the bus notices on the next publish.
    pub fn subscribe(&self) -> Receiver<RelayEvent> {
        let (tx, rx) = unbounded();
        self.lock().push(tx);
        rx
    }

    /// Deliver an event to every live subscriber.
    ///
    /// Each subscriber gets its own clone. Disconnected subscribers are
    /// dropped from the list as they are discovered.
    pub fn publish(&self, event: RelayEvent) {
        let mut subscribers = self.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        trace!(
            subscribers = subscribers.len(),
            event = ?event,
            "relay event published"
        );
    }

    /// Get the number of subscriptions as of the last publish.
    ///
    /// Dropped receivers linger until a publish prunes them, so this can
    /// overcount briefly.
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
