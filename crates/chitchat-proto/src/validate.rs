//! Chat frame validation.
//!
//! Bodies are checked by senders before a message is stamped and transmitted,
//! and again by the relay before a message is broadcast. The relay also checks
//! the sender field and the incoming timestamp. A rejected frame never
//! consumes a clock tick.

use crate::message::MAX_IDENTITY_LEN;
use thiserror::Error;

/// Maximum body length in bytes.
pub const MAX_BODY_LEN: usize = 128;

/// Largest timestamp accepted from a peer (2^53 - 1, exact in an IEEE double).
///
/// Anything above this would let a single frame push the relay clock close
/// enough to `i64::MAX` to run it out of distinct values.
pub const MAX_TIMESTAMP: i64 = (1 << 53) - 1;

/// Reasons a chat frame is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// Body is empty after trimming whitespace.
    #[error("message is empty")]
    Empty,

    /// Body is not valid UTF-8.
    #[error("message is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 {
        /// Length of the longest valid UTF-8 prefix.
        valid_up_to: usize,
    },

    /// Body is longer than [`MAX_BODY_LEN`] bytes.
    #[error("message exceeds {limit} bytes ({actual} bytes)")]
    TooLong {
        /// Body length in bytes.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Sender field is longer than [`MAX_IDENTITY_LEN`] bytes.
    #[error("sender exceeds {limit} bytes ({actual} bytes)")]
    IdentityTooLong {
        /// Sender length in bytes.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Timestamp is negative or above [`MAX_TIMESTAMP`].
    #[error("timestamp {value} is outside 0..={limit}")]
    TimestampOutOfRange {
        /// Timestamp as received.
        value: i64,
        /// Largest accepted timestamp.
        limit: i64,
    },
}

impl ValidationError {
    /// Static reason string for log fields.
    #[inline]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::InvalidUtf8 { .. } => "invalid_utf8",
            Self::TooLong { .. } => "exceeds_max_length",
            Self::IdentityTooLong { .. } => "identity_too_long",
            Self::TimestampOutOfRange { .. } => "timestamp_out_of_range",
        }
    }
}

/// Validate a body that is already known to be UTF-8.
pub fn validate_body(body: &str) -> Result<(), ValidationError> {
    if body.trim().is_empty() {
        return Err(ValidationError::Empty);
    }
    if body.len() > MAX_BODY_LEN {
        return Err(ValidationError::TooLong {
            actual: body.len(),
            limit: MAX_BODY_LEN,
        });
    }
    Ok(())
}

/// Validate the sender field of a frame.
pub fn validate_identity(from: &str) -> Result<(), ValidationError> {
    if from.len() > MAX_IDENTITY_LEN {
        return Err(ValidationError::IdentityTooLong {
            actual: from.len(),
            limit: MAX_IDENTITY_LEN,
        });
    }
    Ok(())
}

/// Validate a timestamp received from a peer.
pub fn validate_timestamp(value: i64) -> Result<(), ValidationError> {
    if !(0..=MAX_TIMESTAMP).contains(&value) {
        return Err(ValidationError::TimestampOutOfRange {
            value,
            limit: MAX_TIMESTAMP,
        });
    }
    Ok(())
}

/// Validate raw input bytes, returning the body as `&str` on success.
pub fn validate_bytes(raw: &[u8]) -> Result<&str, ValidationError> {
    let body = std::str::from_utf8(raw).map_err(|e| ValidationError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })?;
    validate_body(body)?;
    Ok(body)
}
