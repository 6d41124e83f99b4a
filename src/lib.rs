//! # Relay Buffer
//!
//! Client-side buffer state for WeeChat-style relay clients.
//!
//! Relay Buffer is the in-memory core a relay client keeps per chat
//! buffer: bounded message history, a recency-ordered nicklist, unread
//! and highlight counters, metadata, and change notification, all safe
//! to share between the protocol thread and presentation threads.
//!
//! ## Core Concepts
//!
//! - **Bounded history**: A fixed-capacity line log that evicts from the
//!   end opposite the insertion, so live traffic drops the oldest lines
//!   while backfill past capacity drops the newest backfill
//! - **Recency roster**: Nicklist ordered by who spoke most recently
//! - **Snapshot queries**: Readers get detached copies, never references
//!   into guarded state
//! - **Observer fan-out**: Payload-free "something changed" signals with
//!   per-observer panic isolation
//!
//! ## Example
//!
//! ```rust
//! use relay_buffer::{Buffer, BufferLine, NickEntry};
//! use std::time::SystemTime;
//!
//! let buffer = Buffer::new("0x100");
//! buffer.add_nick(NickEntry::new("alice")).unwrap();
//!
//! let line = BufferLine::new("0x1", SystemTime::now(), "alice", "hello")
//!     .with_tag("nick_alice");
//! buffer.add_line(line).unwrap();
//!
//! assert_eq!(buffer.unread_count(), 1);
//! assert_eq!(buffer.nick_names(), ["alice"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod buffer;
pub mod error;
pub mod relay;

// Re-exports for convenience
pub use buffer::{
    Buffer, BufferLine, BufferObserver, LineLog, NickEntry, NotifyLevel, ObserverRegistry, Roster,
    MAX_LINES, NICK_TAG_PREFIX,
};
pub use error::{BufferError, Result};
pub use relay::{BufferList, EventBus, RelayEvent, SessionState};
