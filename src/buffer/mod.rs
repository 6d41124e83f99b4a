//! Buffer module: Core state structures for one chat buffer.
//!
//! This module contains:
//! - [`BufferLine`]: One rendered chat line with its protocol tags
//! - [`LineLog`]: Bounded history with double-ended eviction
//! - [`NickEntry`] / [`Roster`]: Participant set with recency ordering
//! - [`BufferObserver`] / [`ObserverRegistry`]: Change-notification fan-out
//! - [`Buffer`]: The aggregate tying all of the above together

mod line;
mod log;
mod observer;
mod roster;
#[allow(clippy::module_inception)]
mod buffer;

pub use buffer::{Buffer, NotifyLevel};
pub use line::{BufferLine, NICK_TAG_PREFIX};
pub use log::{LineLog, MAX_LINES};
pub use observer::{BufferObserver, ObserverRegistry};
pub use roster::{NickEntry, Roster};
