//! Session-wide directory of open buffers.
//!
//! The protocol decoder announces buffer openings and closures here; the
//! directory hands out shared [`Buffer`] handles, drives the destroy
//! lifecycle, and publishes [`RelayEvent::BufferOpened`] and
//! [`RelayEvent::BufferClosed`] on the session bus.

use super::bus::EventBus;
use super::events::RelayEvent;
use crate::buffer::Buffer;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Directory of a session's open buffers, keyed by pointer.
///
/// Handles are shared as `Arc<Buffer>`: the directory keeps one, and every
/// caller of [`BufferList::open`] or [`BufferList::get`] holds another.
/// Closing a buffer removes it from the directory and destroys it; holders
/// of stale handles see the destroyed state rather than dangling data.
#[derive(Default)]
pub struct BufferList {
    /// Open buffers by protocol pointer.
    inner: Mutex<HashMap<String, Arc<Buffer>>>,
    /// Session bus carrying lifecycle announcements.
    bus: EventBus,
}

impl BufferList {
    /// Create an empty directory with its own event bus.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            bus: EventBus::new(),
        }
    }

    /// Critical sections never panic; recover from poisoning and continue.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Buffer>>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open the buffer for `pointer`, creating it on first announcement.
    ///
    /// Idempotent: re-announcing an open pointer returns the existing
    /// handle. [`RelayEvent::BufferOpened`] is published only on creation.
    pub fn open(&self, pointer: impl Into<String>) -> Arc<Buffer> {
        let pointer = pointer.into();
        let (buffer, created) = {
            let mut inner = self.lock();
            match inner.entry(pointer.clone()) {
                Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
                Entry::Vacant(entry) => {
                    let buffer = Arc::new(Buffer::new(pointer.clone()));
                    entry.insert(Arc::clone(&buffer));
                    (buffer, true)
                }
            }
        };
        if created {
            debug!(pointer = %pointer, "buffer opened");
            self.bus.publish(RelayEvent::BufferOpened { pointer });
        }
        buffer
    }

    /// Look up a buffer by pointer.
    pub fn get(&self, pointer: &str) -> Option<Arc<Buffer>> {
        self.lock().get(pointer).map(Arc::clone)
    }

    /// Look up a buffer by its fully qualified name.
    ///
    /// Full names are unique within a session per the protocol; with
    /// duplicates, which match wins is unspecified.
    pub fn by_full_name(&self, full_name: &str) -> Option<Arc<Buffer>> {
        self.lock()
            .values()
            .find(|buffer| buffer.full_name() == full_name)
            .map(Arc::clone)
    }

    /// Close the buffer for `pointer`: remove, destroy, announce.
    ///
    /// Returns the removed handle so callers can inspect final state.
    /// An unknown pointer yields `None`; closure of a buffer that was
    /// never announced is not an error worth surfacing.
    pub fn close(&self, pointer: &str) -> Option<Arc<Buffer>> {
        let buffer = self.lock().remove(pointer)?;
        if buffer.destroy().is_err() {
            // Destroyed out-of-band; removal from the directory is still due.
            debug!(pointer = %pointer, "closing already-destroyed buffer");
        }
        self.bus.publish(RelayEvent::BufferClosed {
            pointer: pointer.to_string(),
        });
        Some(buffer)
    }

    /// Close every open buffer (relay disconnect path).
    ///
    /// Each buffer is destroyed and announced individually, in no
    /// particular order.
    pub fn close_all(&self) {
        let drained: Vec<(String, Arc<Buffer>)> = self.lock().drain().collect();
        for (pointer, buffer) in drained {
            if buffer.destroy().is_err() {
                debug!(pointer = %pointer, "closing already-destroyed buffer");
            }
            self.bus.publish(RelayEvent::BufferClosed { pointer });
        }
    }

    /// Get all open buffers sorted by display number.
    ///
    /// Ties break on pointer so the order is stable for rendering.
    pub fn snapshot(&self) -> Vec<Arc<Buffer>> {
        let mut buffers: Vec<Arc<Buffer>> = self.lock().values().map(Arc::clone).collect();
        buffers.sort_by(|a, b| {
            a.number()
                .cmp(&b.number())
                .then_with(|| a.pointer().cmp(b.pointer()))
        });
        buffers
    }

    /// Get the number of open buffers.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check whether no buffers are open.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Get the session bus for lifecycle subscriptions.
    pub const fn events(&self) -> &EventBus {
        &self.bus
    }
}

impl std::fmt::Debug for BufferList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferList")
            .field("open", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_is_idempotent() {
        let list = BufferList::new();
        let rx = list.events().subscribe();

        let first = list.open("0x1");
        let second = list.open("0x1");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(list.len(), 1);
        // Only the creation was announced.
        assert_eq!(
            rx.recv().unwrap(),
            RelayEvent::BufferOpened {
                pointer: "0x1".to_string()
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_get_absent_is_none() {
        let list = BufferList::new();
        list.open("0x1");
        assert!(list.get("0x1").is_some());
        assert!(list.get("0x2").is_none());
    }

    #[test]
    fn test_by_full_name() {
        let list = BufferList::new();
        list.open("0x1").set_full_name("irc.libera.#rust").unwrap();
        list.open("0x2").set_full_name("irc.libera.#async").unwrap();

        let found = list.by_full_name("irc.libera.#async").unwrap();
        assert_eq!(found.pointer(), "0x2");
        assert!(list.by_full_name("irc.libera.#nope").is_none());
    }

    #[test]
    fn test_close_destroys_and_announces() {
        let list = BufferList::new();
        let buffer = list.open("0x1");
        let rx = list.events().subscribe();

        let closed = list.close("0x1").unwrap();

        assert!(Arc::ptr_eq(&buffer, &closed));
        assert!(closed.is_destroyed());
        assert!(list.get("0x1").is_none());
        assert_eq!(
            rx.recv().unwrap(),
            RelayEvent::BufferClosed {
                pointer: "0x1".to_string()
            }
        );
    }

    #[test]
    fn test_close_unknown_pointer_is_none() {
        let list = BufferList::new();
        assert!(list.close("0x404").is_none());
    }

    #[test]
    fn test_close_tolerates_out_of_band_destroy() {
        let list = BufferList::new();
        let buffer = list.open("0x1");
        buffer.destroy().unwrap();

        let closed = list.close("0x1").unwrap();
        assert!(closed.is_destroyed());
        assert!(list.is_empty());
    }

    #[test]
    fn test_close_all() {
        let list = BufferList::new();
        for n in 0..3 {
            list.open(format!("0x{n}"));
        }
        let rx = list.events().subscribe();

        list.close_all();

        assert!(list.is_empty());
        let mut closed: Vec<String> = (0..3)
            .map(|_| match rx.recv().unwrap() {
                RelayEvent::BufferClosed { pointer } => pointer,
                other => panic!("unexpected event: {other:?}"),
            })
            .collect();
        closed.sort();
        assert_eq!(closed, ["0x0", "0x1", "0x2"]);
    }

    #[test]
    fn test_snapshot_sorted_by_number() {
        let list = BufferList::new();
        list.open("0xc").set_number(3).unwrap();
        list.open("0xa").set_number(1).unwrap();
        list.open("0xb").set_number(2).unwrap();

        let numbers: Vec<i32> = list.snapshot().iter().map(|b| b.number()).collect();
        assert_eq!(numbers, [1, 2, 3]);
    }

    #[test]
    fn test_snapshot_ties_break_on_pointer() {
        let list = BufferList::new();
        list.open("0xb");
        list.open("0xa");

        let pointers: Vec<String> = list
            .snapshot()
            .iter()
            .map(|b| b.pointer().to_string())
            .collect();
        assert_eq!(pointers, ["0xa", "0xb"]);
    }
}
