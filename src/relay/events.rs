//! Event types for session-level communication.
//!
//! These are the values published on the [`EventBus`](super::EventBus):
//! connection-state changes, buffer lifecycle announcements, faults, and
//! outbound relay commands.

use bitflags::bitflags;

bitflags! {
    /// Connection-lifecycle flags for one relay session.
    ///
    /// Flags accumulate as the handshake progresses and can be combined
    /// using bitwise OR.
    ///
    /// # Example
    /// ```
    /// use relay_buffer::SessionState;
    ///
    /// let state = SessionState::CONNECTED | SessionState::AUTHENTICATED;
    /// assert!(state.contains(SessionState::CONNECTED));
    /// assert!(!state.contains(SessionState::BUFFERS_LISTED));
    /// ```
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SessionState: u8 {
        /// TCP/TLS connection attempt in progress.
        const CONNECTING = 0b0000_0001;
        /// Transport established.
        const CONNECTED = 0b0000_0010;
        /// Relay accepted our credentials.
        const AUTHENTICATED = 0b0000_0100;
        /// Initial buffer listing completed.
        const BUFFERS_LISTED = 0b0000_1000;
        /// Session ended; terminal unless a new connection starts.
        const DISCONNECTED = 0b0001_0000;
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// Session-level events published on the bus.
///
/// Buffer-content changes do not travel here; those go through each
/// buffer's own observers. The bus carries what concerns the session as
/// a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// The connection-lifecycle flags changed.
    StateChanged {
        /// The full new flag set, not a delta.
        state: SessionState,
    },

    /// A buffer was announced and entered the directory.
    BufferOpened {
        /// Pointer of the new buffer.
        pointer: String,
    },

    /// A buffer was closed and destroyed.
    BufferClosed {
        /// Pointer of the closed buffer.
        pointer: String,
    },

    /// The relay connection reported a failure.
    Fault {
        /// Human-readable description.
        message: String,
    },

    /// Outbound command text to write to the relay.
    SendMessage {
        /// Raw relay command line.
        command: String,
    },
}
