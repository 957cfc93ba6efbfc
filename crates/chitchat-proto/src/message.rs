//! The chat frame exchanged between clients and the relay.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity assumed when a participant joins without naming itself.
pub const DEFAULT_IDENTITY: &str = "guest";

/// Maximum identity length in bytes. Longer names are cut at a character
/// boundary when resolved.
pub const MAX_IDENTITY_LEN: usize = 32;

/// One chat frame: `(lamport_timestamp, from, message)`.
///
/// Senders build a message once and never modify it. The relay is the only
/// party that replaces the timestamp (see [`ChatMessage::with_timestamp`]),
/// and recipients treat the relayed value as authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Logical time of the event.
    pub lamport_timestamp: i64,
    /// Sender identity.
    #[serde(default)]
    pub from: String,
    /// UTF-8 body.
    #[serde(default)]
    pub message: String,
}

impl ChatMessage {
    /// Create a new message.
    pub fn new(lamport_timestamp: i64, from: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            lamport_timestamp,
            from: from.into(),
            message: message.into(),
        }
    }

    /// Replace the timestamp with the relay's authoritative value.
    #[must_use]
    pub fn with_timestamp(mut self, lamport_timestamp: i64) -> Self {
        self.lamport_timestamp = lamport_timestamp;
        self
    }

    /// Whether the body is empty after trimming whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.message.trim().is_empty()
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Lamport: {}] {}: {}",
            self.lamport_timestamp, self.from, self.message
        )
    }
}

/// Resolve the identity a participant joins under.
///
/// Surrounding whitespace is dropped and the name is cut to
/// [`MAX_IDENTITY_LEN`] bytes; a blank name falls back to [`DEFAULT_IDENTITY`].
pub fn resolve_identity(requested: &str) -> String {
    let name = requested.trim();
    let mut end = name.len().min(MAX_IDENTITY_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    match name[..end].trim_end() {
        "" => DEFAULT_IDENTITY.to_string(),
        name => name.to_string(),
    }
}
