//! Error types for the wire protocol.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Frame-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid UTF-8 bytes in a frame.
    #[error("invalid UTF-8 in frame at byte {byte_pos}: {details}")]
    InvalidUtf8 {
        /// Byte position where UTF-8 validation failed.
        byte_pos: usize,
        /// Detailed error message from the UTF-8 decoder.
        details: String,
    },

    /// Frame exceeded the maximum allowed length.
    #[error("frame too long: {actual} bytes (limit: {limit})")]
    MessageTooLong {
        /// Actual frame length (at least this many bytes).
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Frame was not a valid JSON chat message.
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Whether the stream can continue after this error.
    ///
    /// Only I/O errors leave the stream in an unknown state; everything else
    /// affects a single frame that has already been consumed.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}
