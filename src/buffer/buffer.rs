//! Buffer: One chat channel/window's full client-side state.
//!
//! The aggregate owns a bounded [`LineLog`], a [`Roster`], an
//! [`ObserverRegistry`], metadata, and the unread/highlight counters. The
//! protocol decoder drives the mutation API from its single event thread;
//! presentation threads read through the query API concurrently.
//!
//! # Locking layout
//!
//! There is deliberately no aggregate-wide lock. The line log and the
//! roster each guard themselves, metadata has its own mutex, and counters
//! and flags are atomics, so a roster read never waits behind a line-log
//! write. Observer fan-out runs after the state mutation completes, with
//! no lock held.
//!
//! Metadata setters replace fields silently; no current consumer renders
//! from a metadata-changed signal, and [`BufferObserver`] can grow one if
//! that changes.
//!
//! # Lifecycle
//!
//! `Open` then [`Buffer::destroy`] then `Destroyed` (terminal). Every
//! mutation on a destroyed buffer fails fast with
//! [`BufferError::AlreadyDestroyed`]; queries remain callable and read the
//! released (empty) state.

use super::line::BufferLine;
use super::log::{LineLog, MAX_LINES};
use super::observer::{BufferObserver, ObserverRegistry};
use super::roster::{NickEntry, Roster};
use crate::error::{BufferError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Alert threshold controlling which line classes should alert the user.
///
/// Wire values follow the relay protocol's integer mapping; the default is
/// "messages and highlights".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NotifyLevel {
    /// Never alert for this buffer.
    Never = 0,
    /// Alert on highlights only.
    Highlight = 1,
    /// Alert on highlights and messages.
    #[default]
    Message = 2,
    /// Alert on all lines, joins and quits included.
    All = 3,
}

impl NotifyLevel {
    /// Decode a wire integer.
    ///
    /// Returns `None` for values outside the protocol mapping; the decoder
    /// decides whether to fall back to the default.
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Never),
            1 => Some(Self::Highlight),
            2 => Some(Self::Message),
            3 => Some(Self::All),
            _ => None,
        }
    }

    /// Encode back to the wire integer.
    pub const fn as_raw(self) -> i32 {
        self as i32
    }
}

/// Plain metadata fields, replaced wholesale by protocol updates.
#[derive(Debug, Default)]
struct BufferMeta {
    /// Display order among the session's buffers.
    number: i32,
    /// Fully qualified name (`irc.libera.#rust`).
    full_name: String,
    /// Short display name (`#rust`).
    short_name: String,
    /// Channel title/topic.
    title: String,
    /// Alert threshold.
    notify: NotifyLevel,
    /// Free-form key/value pairs supplied by the protocol.
    local_vars: HashMap<String, String>,
}

/// One chat channel/window's history, roster, counters, and metadata.
///
/// A buffer is shared as `Arc<Buffer>`: the whole API takes `&self` and
/// synchronizes internally, so the protocol producer and any number of
/// presentation readers can hold the same handle.
///
/// # Example
///
/// ```
/// use relay_buffer::{Buffer, BufferLine};
/// use std::time::SystemTime;
///
/// let buffer = Buffer::new("0x100");
/// let line = BufferLine::new("0x1", SystemTime::now(), "alice", "hello")
///     .with_tag("nick_alice");
/// buffer.add_line(line).unwrap();
/// assert_eq!(buffer.unread_count(), 1);
/// assert!(buffer.has_line("0x1"));
/// ```
pub struct Buffer {
    /// Protocol-assigned stable handle, fixed at construction.
    pointer: String,
    /// Plain metadata under its own lock.
    meta: Mutex<BufferMeta>,
    /// Lines not yet marked read.
    unread: AtomicU32,
    /// Lines that highlighted the user.
    highlights: AtomicU32,
    /// Whether all requested history lines have arrived.
    history_complete: AtomicBool,
    /// Whether the full nicklist has arrived.
    nicklist_complete: AtomicBool,
    /// Terminal-state flag; set once by `destroy`.
    destroyed: AtomicBool,
    /// Bounded message history.
    log: LineLog,
    /// Participant set with recency ordering.
    roster: Roster,
    /// Registered change listeners.
    observers: ObserverRegistry,
}

impl Buffer {
    /// Create an open buffer with the default line capacity of
    /// [`MAX_LINES`].
    pub fn new(pointer: impl Into<String>) -> Self {
        Self::with_capacity(pointer, MAX_LINES)
    }

    /// Create an open buffer with a custom line capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn with_capacity(pointer: impl Into<String>, capacity: usize) -> Self {
        Self {
            pointer: pointer.into(),
            meta: Mutex::new(BufferMeta::default()),
            unread: AtomicU32::new(0),
            highlights: AtomicU32::new(0),
            history_complete: AtomicBool::new(false),
            nicklist_complete: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
            log: LineLog::with_capacity(capacity),
            roster: Roster::new(),
            observers: ObserverRegistry::new(),
        }
    }

    /// Critical sections never panic; recover from poisoning and continue.
    fn meta_lock(&self) -> MutexGuard<'_, BufferMeta> {
        self.meta.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reject mutations after `destroy`.
    ///
    /// The check detects upstream logic errors (protocol events addressed
    /// to a closed buffer); it is not a race guard. The supported
    /// threading model has a single producer issuing both mutations and
    /// `destroy`, so check-then-act cannot interleave there.
    fn ensure_open(&self) -> Result<()> {
        if self.destroyed.load(Ordering::Acquire) {
            return Err(BufferError::already_destroyed(&self.pointer));
        }
        Ok(())
    }

    // ---- mutation API (protocol decoder side) --------------------------

    /// Append a normal message line.
    ///
    /// Appends to the log (evicting the oldest line past capacity),
    /// increments the unread counter, promotes the line's tagged nickname
    /// (if any) to most-recently-active, then notifies observers once.
    pub fn add_line(&self, line: BufferLine) -> Result<()> {
        self.ensure_open()?;
        let speaker = line.tagged_nick().map(str::to_owned);
        self.log.push_back(line);
        self.unread.fetch_add(1, Ordering::Relaxed);
        if let Some(nick) = speaker {
            // An unknown speaker (already parted) is a silent non-event.
            self.roster.touch(&nick);
        }
        self.observers.notify_line_added();
        Ok(())
    }

    /// Append a line without counting it as unread.
    ///
    /// For joins, quits, and status lines that belong in history but
    /// should not alert. Does not touch roster recency: presence changes
    /// go through the nick API, and only speaking promotes.
    pub fn add_line_no_unread(&self, line: BufferLine) -> Result<()> {
        self.ensure_open()?;
        self.log.push_back(line);
        self.observers.notify_line_added();
        Ok(())
    }

    /// Append a line with no notification and no counter change.
    ///
    /// Bulk-insertion path for history sync; close the batch with one
    /// [`Buffer::notify_many_lines_added`].
    pub fn add_line_silent(&self, line: BufferLine) -> Result<()> {
        self.ensure_open()?;
        self.log.push_back(line);
        Ok(())
    }

    /// Insert a backfill line at the head, silently.
    ///
    /// Past capacity this evicts the newest (tail) line, whatever it is.
    /// Callers wanting to keep the live tail must bound backfill requests
    /// by the remaining capacity.
    pub fn prepend_line_silent(&self, line: BufferLine) -> Result<()> {
        self.ensure_open()?;
        self.log.push_front(line);
        Ok(())
    }

    /// Signal observers once that a silent bulk batch completed.
    pub fn notify_many_lines_added(&self) -> Result<()> {
        self.ensure_open()?;
        self.observers.notify_many_lines_added();
        Ok(())
    }

    /// Empty the log and zero both counters.
    ///
    /// The counters are zeroed inside the log's critical section, so
    /// "clear history" is a single step from a snapshot taker's view.
    pub fn clear_lines(&self) -> Result<()> {
        self.ensure_open()?;
        self.log.clear_with(|| {
            self.unread.store(0, Ordering::Relaxed);
            self.highlights.store(0, Ordering::Relaxed);
        });
        Ok(())
    }

    /// Mark all lines read.
    pub fn reset_unread(&self) -> Result<()> {
        self.ensure_open()?;
        self.unread.store(0, Ordering::Relaxed);
        Ok(())
    }

    /// Clear the highlight counter.
    pub fn reset_highlights(&self) -> Result<()> {
        self.ensure_open()?;
        self.highlights.store(0, Ordering::Relaxed);
        Ok(())
    }

    /// Count one additional unread line.
    pub fn add_unread(&self) -> Result<()> {
        self.add_unreads(1)
    }

    /// Count `n` additional unread lines.
    pub fn add_unreads(&self, n: u32) -> Result<()> {
        self.ensure_open()?;
        self.unread.fetch_add(n, Ordering::Relaxed);
        Ok(())
    }

    /// Count one additional highlight.
    pub fn add_highlight(&self) -> Result<()> {
        self.add_highlights(1)
    }

    /// Count `n` additional highlights.
    pub fn add_highlights(&self, n: u32) -> Result<()> {
        self.ensure_open()?;
        self.highlights.fetch_add(n, Ordering::Relaxed);
        Ok(())
    }

    /// Add a participant and notify observers of the nicklist change.
    pub fn add_nick(&self, entry: NickEntry) -> Result<()> {
        self.ensure_open()?;
        self.roster.add(entry);
        self.observers.notify_nicklist_changed();
        Ok(())
    }

    /// Remove a participant by name and notify observers.
    ///
    /// Returns the removed entry. `None` means the name was not tracked,
    /// a normal outcome rather than an error.
    pub fn remove_nick(&self, name: &str) -> Result<Option<NickEntry>> {
        self.ensure_open()?;
        let removed = self.roster.remove(name);
        self.observers.notify_nicklist_changed();
        Ok(removed)
    }

    /// Replace a participant's entry in place and notify observers.
    ///
    /// Returns `false` when the name is not tracked; nothing is inserted
    /// in that case.
    pub fn update_nick(&self, entry: NickEntry) -> Result<bool> {
        self.ensure_open()?;
        let updated = self.roster.update(entry);
        self.observers.notify_nicklist_changed();
        Ok(updated)
    }

    /// Drop the whole nicklist, silently.
    ///
    /// Used when the relay resends a full nicklist; the re-adds that
    /// follow carry their own notifications.
    pub fn clear_nicklist(&self) -> Result<()> {
        self.ensure_open()?;
        self.roster.clear();
        Ok(())
    }

    /// Set the display-order index.
    pub fn set_number(&self, number: i32) -> Result<()> {
        self.ensure_open()?;
        self.meta_lock().number = number;
        Ok(())
    }

    /// Set the fully qualified name.
    pub fn set_full_name(&self, full_name: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        self.meta_lock().full_name = full_name.into();
        Ok(())
    }

    /// Set the short display name.
    pub fn set_short_name(&self, short_name: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        self.meta_lock().short_name = short_name.into();
        Ok(())
    }

    /// Set the title/topic.
    pub fn set_title(&self, title: impl Into<String>) -> Result<()> {
        self.ensure_open()?;
        self.meta_lock().title = title.into();
        Ok(())
    }

    /// Set the alert threshold.
    pub fn set_notify_level(&self, level: NotifyLevel) -> Result<()> {
        self.ensure_open()?;
        self.meta_lock().notify = level;
        Ok(())
    }

    /// Replace the local-variable table.
    pub fn set_local_vars(&self, vars: HashMap<String, String>) -> Result<()> {
        self.ensure_open()?;
        self.meta_lock().local_vars = vars;
        Ok(())
    }

    /// Record whether all requested history has arrived.
    pub fn set_history_complete(&self, complete: bool) -> Result<()> {
        self.ensure_open()?;
        self.history_complete.store(complete, Ordering::Relaxed);
        Ok(())
    }

    /// Record whether the full nicklist has arrived.
    pub fn set_nicklist_complete(&self, complete: bool) -> Result<()> {
        self.ensure_open()?;
        self.nicklist_complete.store(complete, Ordering::Relaxed);
        Ok(())
    }

    /// Register a change listener.
    pub fn register_observer(&self, observer: Arc<dyn BufferObserver>) -> Result<()> {
        self.ensure_open()?;
        self.observers.register(observer);
        Ok(())
    }

    /// Unregister a change listener.
    ///
    /// Stays callable after `destroy` so listener teardown is idempotent.
    /// Returns `false` if the observer was not registered.
    pub fn unregister_observer(&self, observer: &Arc<dyn BufferObserver>) -> bool {
        self.observers.unregister(observer)
    }

    /// Close the buffer: notify observers, then release all owned state.
    ///
    /// Observers receive `on_buffer_closed` exactly once; afterwards the
    /// log, roster, counters, and observer set are emptied and every
    /// further mutation fails with [`BufferError::AlreadyDestroyed`].
    pub fn destroy(&self) -> Result<()> {
        if self
            .destroyed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BufferError::already_destroyed(&self.pointer));
        }
        debug!(pointer = %self.pointer, "buffer destroyed");
        self.observers.notify_closed();
        self.log.clear_with(|| {
            self.unread.store(0, Ordering::Relaxed);
            self.highlights.store(0, Ordering::Relaxed);
        });
        self.roster.clear();
        self.observers.clear();
        Ok(())
    }

    // ---- query API (presentation side) ---------------------------------

    /// Get the protocol pointer.
    #[inline]
    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    /// Get a point-in-time copy of the history, oldest first.
    pub fn lines(&self) -> Vec<BufferLine> {
        self.log.snapshot()
    }

    /// Get the number of stored lines (at most the capacity).
    pub fn line_count(&self) -> usize {
        self.log.len()
    }

    /// Get the fixed line capacity.
    #[inline]
    pub const fn line_capacity(&self) -> usize {
        self.log.capacity()
    }

    /// Check whether a line with this pointer is currently stored.
    ///
    /// Evicted lines read as absent; that is bounded storage working as
    /// intended, not data loss.
    pub fn has_line(&self, pointer: &str) -> bool {
        self.log.contains(pointer)
    }

    /// Get the unread count.
    pub fn unread_count(&self) -> u32 {
        self.unread.load(Ordering::Relaxed)
    }

    /// Get the highlight count.
    pub fn highlight_count(&self) -> u32 {
        self.highlights.load(Ordering::Relaxed)
    }

    /// Get all nicknames, most recently active first.
    pub fn nick_names(&self) -> Vec<String> {
        self.roster.names()
    }

    /// Get all roster entries in recency order.
    pub fn nick_entries(&self) -> Vec<NickEntry> {
        self.roster.entries()
    }

    /// Get one roster entry by name.
    pub fn nick(&self, name: &str) -> Option<NickEntry> {
        self.roster.get(name)
    }

    /// Get the number of participants.
    pub fn nick_count(&self) -> usize {
        self.roster.len()
    }

    /// Get the display-order index.
    pub fn number(&self) -> i32 {
        self.meta_lock().number
    }

    /// Get the fully qualified name.
    pub fn full_name(&self) -> String {
        self.meta_lock().full_name.clone()
    }

    /// Get the short display name.
    pub fn short_name(&self) -> String {
        self.meta_lock().short_name.clone()
    }

    /// Get the title/topic.
    pub fn title(&self) -> String {
        self.meta_lock().title.clone()
    }

    /// Get the alert threshold.
    pub fn notify_level(&self) -> NotifyLevel {
        self.meta_lock().notify
    }

    /// Look up a local variable.
    ///
    /// The table is sparse by nature; `None` is the normal outcome for
    /// keys the protocol never supplied.
    pub fn local_var(&self, key: &str) -> Option<String> {
        self.meta_lock().local_vars.get(key).cloned()
    }

    /// Check whether all requested history has arrived.
    pub fn history_complete(&self) -> bool {
        self.history_complete.load(Ordering::Relaxed)
    }

    /// Check whether the full nicklist has arrived.
    pub fn nicklist_complete(&self) -> bool {
        self.nicklist_complete.load(Ordering::Relaxed)
    }

    /// Check whether the buffer was destroyed.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Get the number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("pointer", &self.pointer)
            .field("full_name", &self.full_name())
            .field("lines", &self.line_count())
            .field("nicks", &self.nick_count())
            .field("unread", &self.unread_count())
            .field("destroyed", &self.is_destroyed())
            .finish_non_exhaustive()
    }
}
