//! Line log: Bounded storage for a buffer's message history.
//!
//! This provides fixed-capacity storage for the most recent lines of a
//! buffer, with O(1) insertion at either end and automatic eviction at
//! the opposite end once capacity is reached.
//!
//! # Eviction asymmetry
//!
//! `push_back` (live tail) evicts the *oldest* line; `push_front`
//! (historical backfill) evicts the *newest* line. Prepending more than
//! the remaining capacity therefore truncates from the newest end, so
//! callers bound backfill batches by the free space when the tail matters.
//!
//! # Locking
//!
//! Every operation, reads included, runs under the log's own mutex, so a
//! `snapshot` taken by a presentation thread is a consistent point-in-time
//! copy even while the producer keeps appending. The lock is scoped to this
//! component; roster reads never wait behind line-log writes.

use super::line::BufferLine;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default maximum number of lines retained per buffer.
pub const MAX_LINES: usize = 200;

/// Fixed-capacity, internally synchronized line storage.
///
/// All methods take `&self`; the log is safe to share between the protocol
/// producer and any number of presentation readers.
#[derive(Debug)]
pub struct LineLog {
    /// Lines in insertion order, oldest first.
    lines: Mutex<VecDeque<BufferLine>>,
    /// Maximum number of lines to retain.
    capacity: usize,
}

impl LineLog {
    /// Create a log with the default capacity of [`MAX_LINES`].
    pub fn new() -> Self {
        Self::with_capacity(MAX_LINES)
    }

    /// Create a log with a custom capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "line log capacity must be non-zero");
        Self {
            lines: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Get the fixed capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Acquire the inner lock.
    ///
    /// No panicking operation runs inside any critical section, so data
    /// behind a poisoned lock is still consistent; recover and continue.
    fn lock(&self) -> MutexGuard<'_, VecDeque<BufferLine>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a line at the tail (live ingestion), evicting the oldest
    /// line once past capacity.
    pub fn push_back(&self, line: BufferLine) {
        let mut lines = self.lock();
        lines.push_back(line);
        while lines.len() > self.capacity {
            lines.pop_front();
        }
    }

    /// Insert a line at the head (historical backfill), evicting the
    /// newest line once past capacity.
    pub fn push_front(&self, line: BufferLine) {
        let mut lines = self.lock();
        lines.push_front(line);
        while lines.len() > self.capacity {
            lines.pop_back();
        }
    }

    /// Remove all lines.
    pub fn clear(&self) {
        self.clear_with(|| {});
    }

    /// Remove all lines, running `reset` inside the same critical section.
    ///
    /// The aggregate uses this to zero its counters while the log lock is
    /// held, so "clear history" is one critical section rather than two.
    pub(crate) fn clear_with<F: FnOnce()>(&self, reset: F) {
        let mut lines = self.lock();
        lines.clear();
        reset();
    }

    /// Get a defensive copy of the full history, oldest first.
    ///
    /// The copy is taken under the lock: callers never observe a
    /// half-mutated log and need no synchronization of their own to iterate
    /// it while the producer continues to mutate.
    pub fn snapshot(&self) -> Vec<BufferLine> {
        self.lock().iter().cloned().collect()
    }

    /// Check whether a line with the given protocol pointer is present.
    pub fn contains(&self, pointer: &str) -> bool {
        self.lock().iter().any(|l| l.pointer() == pointer)
    }

    /// Get the number of stored lines.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for LineLog {
    fn default() -> Self {
        Self::new()
    }
}
