//! Observer registry: Fan-out change notification for a buffer.
//!
//! Notifications are pure "something changed" signals: they carry no
//! payload, and a listener is expected to re-query the buffer for a fresh
//! snapshot. Fan-out is synchronous on the mutating (producer) thread: the
//! producer pays the notification cost and a slow observer can delay it.
//! That is a deliberate simplicity/latency tradeoff, not a queueing system;
//! listeners that need decoupling should hand off to their own channel.
//!
//! # Fault isolation
//!
//! A panicking observer must not stop the remaining observers from being
//! notified, and must not prevent the producer's state mutation from
//! completing. Each callback runs under `catch_unwind`; panics are logged
//! and swallowed.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// Capability set a buffer listener implements.
///
/// All methods default to no-ops so a listener overrides only the signals
/// it renders from. Implementations must be `Send + Sync`: callbacks are
/// invoked on the protocol producer's thread, not the listener's.
pub trait BufferObserver: Send + Sync {
    /// One line was appended to the buffer.
    fn on_line_added(&self) {}

    /// A bulk/backfill batch of lines completed.
    ///
    /// Emitted once per batch so listeners can re-render a single time
    /// instead of once per silent insertion.
    fn on_many_lines_added(&self) {}

    /// The nicklist changed (add, remove, update, or clear).
    fn on_nicklist_changed(&self) {}

    /// The buffer was destroyed; no further signals will follow.
    fn on_buffer_closed(&self) {}
}

/// Registered observers for one buffer, with synchronized membership.
///
/// The membership lock is held only while snapshotting or editing the set,
/// never during callbacks, so an observer may register or unregister
/// (itself included) from inside a callback without deadlocking.
pub struct ObserverRegistry {
    observers: Mutex<Vec<Arc<dyn BufferObserver>>>,
}

impl ObserverRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Critical sections never panic; recover from poisoning and continue.
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn BufferObserver>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an observer.
    ///
    /// The same observer may be registered twice; it will then be notified
    /// twice per signal and must be unregistered twice.
    pub fn register(&self, observer: Arc<dyn BufferObserver>) {
        self.lock().push(observer);
    }

    /// Unregister a previously registered observer.
    ///
    /// Matching is by identity (`Arc::ptr_eq`), removing one registration
    /// per call. Returns `false` if the observer was not registered.
    pub fn unregister(&self, observer: &Arc<dyn BufferObserver>) -> bool {
        let mut observers = self.lock();
        match observers.iter().position(|o| Arc::ptr_eq(o, observer)) {
            Some(idx) => {
                observers.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Get the number of registrations.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check whether no observers are registered.
    ///
    /// A buffer with zero observers is legal; fan-out is then a no-op.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop all registrations.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Notify all observers that one line was added.
    pub fn notify_line_added(&self) {
        self.dispatch("line_added", |observer| observer.on_line_added());
    }

    /// Notify all observers that a bulk batch of lines completed.
    pub fn notify_many_lines_added(&self) {
        self.dispatch("many_lines_added", |observer| observer.on_many_lines_added());
    }

    /// Notify all observers that the nicklist changed.
    pub fn notify_nicklist_changed(&self) {
        self.dispatch("nicklist_changed", |observer| observer.on_nicklist_changed());
    }

    /// Notify all observers that the buffer closed.
    pub fn notify_closed(&self) {
        self.dispatch("buffer_closed", |observer| observer.on_buffer_closed());
    }

    /// Snapshot the membership, then invoke `signal` on each observer with
    /// the lock released, isolating per-observer panics.
    fn dispatch(&self, signal_name: &str, signal: fn(&dyn BufferObserver)) {
        let snapshot: Vec<Arc<dyn BufferObserver>> = self.lock().clone();
        for observer in snapshot {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| signal(observer.as_ref())));
            if outcome.is_err() {
                warn!(signal = signal_name, "buffer observer panicked; continuing fan-out");
            }
        }
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test observer counting every signal it receives.
    #[derive(Default)]
    struct CountingObserver {
        lines: AtomicUsize,
        batches: AtomicUsize,
        nicklists: AtomicUsize,
        closes: AtomicUsize,
    }

    impl BufferObserver for CountingObserver {
        fn on_line_added(&self) {
            self.lines.fetch_add(1, Ordering::SeqCst);
        }
        fn on_many_lines_added(&self) {
            self.batches.fetch_add(1, Ordering::SeqCst);
        }
        fn on_nicklist_changed(&self) {
            self.nicklists.fetch_add(1, Ordering::SeqCst);
        }
        fn on_buffer_closed(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct PanickingObserver;

    impl BufferObserver for PanickingObserver {
        fn on_line_added(&self) {
            panic!("render thread went sideways");
        }
    }

    #[test]
    fn test_registry_fan_out_reaches_all() {
        let registry = ObserverRegistry::new();
        let a = Arc::new(CountingObserver::default());
        let b = Arc::new(CountingObserver::default());
        registry.register(a.clone());
        registry.register(b.clone());

        registry.notify_line_added();
        registry.notify_nicklist_changed();
        registry.notify_many_lines_added();
        registry.notify_closed();

        for obs in [&a, &b] {
            assert_eq!(obs.lines.load(Ordering::SeqCst), 1);
            assert_eq!(obs.nicklists.load(Ordering::SeqCst), 1);
            assert_eq!(obs.batches.load(Ordering::SeqCst), 1);
            assert_eq!(obs.closes.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_registry_zero_observers_is_legal() {
        let registry = ObserverRegistry::new();
        assert!(registry.is_empty());
        registry.notify_line_added();
        registry.notify_closed();
    }

    #[test]
    fn test_registry_unregister() {
        let registry = ObserverRegistry::new();
        let a = Arc::new(CountingObserver::default());
        let handle: Arc<dyn BufferObserver> = a.clone();
        registry.register(handle.clone());

        assert!(registry.unregister(&handle));
        assert!(!registry.unregister(&handle));
        registry.notify_line_added();
        assert_eq!(a.lines.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_registry_panicking_observer_does_not_halt_fan_out() {
        let registry = ObserverRegistry::new();
        let healthy = Arc::new(CountingObserver::default());
        // Panicker registered first: the healthy observer is notified after.
        registry.register(Arc::new(PanickingObserver));
        registry.register(healthy.clone());

        registry.notify_line_added();
        registry.notify_line_added();

        assert_eq!(healthy.lines.load(Ordering::SeqCst), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_registry_unregister_during_fan_out() {
        /// Observer that unregisters itself on the first signal.
        struct SelfRemoving {
            registry: Arc<ObserverRegistry>,
            slot: Mutex<Option<Arc<dyn BufferObserver>>>,
            fired: AtomicUsize,
        }

        impl BufferObserver for SelfRemoving {
            fn on_line_added(&self) {
                self.fired.fetch_add(1, Ordering::SeqCst);
                if let Some(me) = self.slot.lock().unwrap().take() {
                    self.registry.unregister(&me);
                }
            }
        }

        let registry = Arc::new(ObserverRegistry::new());
        let observer = Arc::new(SelfRemoving {
            registry: registry.clone(),
            slot: Mutex::new(None),
            fired: AtomicUsize::new(0),
        });
        let handle: Arc<dyn BufferObserver> = observer.clone();
        *observer.slot.lock().unwrap() = Some(handle.clone());
        registry.register(handle);

        registry.notify_line_added();
        registry.notify_line_added();

        // Fired once, then gone; no deadlock on re-entrant unregister.
        assert_eq!(observer.fired.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 0);
    }
}
