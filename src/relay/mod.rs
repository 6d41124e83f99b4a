//! Relay session plumbing: events, broadcast bus, and buffer directory.
//!
//! This module carries what concerns the session as a whole, built on
//! crossbeam channels:
//! - **Events**: [`SessionState`] flags and the [`RelayEvent`] enum
//! - **Bus**: [`EventBus`] broadcast fan-out to any number of subscribers
//! - **Directory**: [`BufferList`], the open-buffer registry driving the
//!   open/close lifecycle
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   open/close/mutate   ┌──────────────┐
//! │   Protocol   │ ────────────────────▶ │  BufferList  │
//! │   decoder    │                       │  + Buffers   │
//! └──────────────┘                       └──────────────┘
//!                                               │
//!                                               │ RelayEvent
//!                                               ▼
//! ┌──────────────┐      subscribe()      ┌──────────────┐
//! │ Presentation │ ◀──────────────────── │   EventBus   │
//! └──────────────┘                       └──────────────┘
//! ```

mod events;
mod bus;
mod list;

pub use events::{RelayEvent, SessionState};
pub use bus::EventBus;
pub use list::BufferList;
