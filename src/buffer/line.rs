//! `BufferLine`: The immutable unit of chat history.
//!
//! A line is created once by the protocol decoder from an already-parsed
//! relay message and never mutated afterwards; the line log that stores it
//! hands out clones, so readers can hold onto a line while the log evicts
//! and re-fills underneath them.
//!
//! # Tags
//!
//! The relay protocol attaches free-form string tags to each line. The one
//! this engine interprets is the `nick_<name>` tag: a line carrying it was
//! authored by `<name>`, and its arrival promotes that nickname to the top
//! of the roster's recency order.

use std::time::SystemTime;

/// Tag prefix marking the authoring nickname of a line.
pub const NICK_TAG_PREFIX: &str = "nick_";

/// One immutable decoded chat line.
///
/// Lines are identified across the session by their protocol-assigned
/// `pointer` string; equality compares all fields, so a re-decoded line with
/// the same pointer and content is equal to the original.
#[derive(Clone, PartialEq, Eq)]
pub struct BufferLine {
    /// Protocol pointer uniquely identifying this line.
    pointer: String,
    /// Wall-clock timestamp assigned by the relay.
    timestamp: SystemTime,
    /// Sender/prefix column (nickname, or a status marker like `<--`).
    sender: String,
    /// Decoded message body, already stripped of wire formatting.
    message: String,
    /// Classification tags attached by the relay (`irc_privmsg`, `nick_*`, ...).
    tags: Vec<String>,
}

impl BufferLine {
    /// Create a new line with no tags.
    pub fn new(
        pointer: impl Into<String>,
        timestamp: SystemTime,
        sender: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            pointer: pointer.into(),
            timestamp,
            sender: sender.into(),
            message: message.into(),
            tags: Vec::new(),
        }
    }

    /// Attach a full tag set (builder pattern).
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Attach a single tag (builder pattern).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Get the protocol pointer.
    #[inline]
    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    /// Get the relay-assigned timestamp.
    #[inline]
    pub const fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Get the sender column.
    #[inline]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Get the message body.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the tag set in wire order.
    #[inline]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Check whether a specific tag is present.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Get the authoring nickname carried in the first `nick_` tag.
    ///
    /// Returns `None` for lines without a nickname tag (server notices,
    /// joins rendered without authorship, etc.); absence is the normal
    /// outcome here, not an error.
    pub fn tagged_nick(&self) -> Option<&str> {
        self.tags
            .iter()
            .find_map(|t| t.strip_prefix(NICK_TAG_PREFIX))
    }
}

impl std::fmt::Debug for BufferLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferLine")
            .field("pointer", &self.pointer)
            .field("sender", &self.sender)
            .field("message", &self.message)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}
