//! Error types for the buffer state engine.
//!
//! The error surface is deliberately small: this crate never errors for
//! malformed wire data (the protocol decoder owns parsing), and absence
//! of a local variable, line pointer, or nickname is an `Option` or `bool`
//! outcome, not an error. Capacity eviction from the bounded line log is
//! silent and normal. What remains is misuse of the API contract itself.

use thiserror::Error;

/// Result type alias for buffer mutations.
pub type Result<T> = std::result::Result<T, BufferError>;

/// Contract-misuse errors reported by the buffer state engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A mutation was attempted on a buffer after `destroy()`.
    ///
    /// The protocol layer announced closure for this buffer; further
    /// mutations indicate a logic error upstream (e.g. a stale pointer in
    /// the decoder) and are rejected rather than silently dropped.
    #[error("buffer {pointer} already destroyed")]
    AlreadyDestroyed {
        /// Protocol pointer of the destroyed buffer.
        pointer: String,
    },
}

impl BufferError {
    /// Construct a [`BufferError::AlreadyDestroyed`] for the given pointer.
    pub fn already_destroyed(pointer: impl Into<String>) -> Self {
        Self::AlreadyDestroyed {
            pointer: pointer.into(),
        }
    }
}
