//! Error handling utilities for session read loops.
//!
//! Sorts frame and validation failures into "drop this one and keep reading"
//! versus "the transport is gone".

use chitchat_proto::{ProtocolError, ValidationError};

/// Classification of read errors for appropriate handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ReadErrorAction {
    /// The offending frame was consumed; log it and read the next one.
    SkipFrame { reason: &'static str },
    /// I/O error: the connection is broken, move to Leaving.
    Disconnect,
}

/// Classify a frame-level error into an actionable category.
pub(super) fn classify_read_error(e: &ProtocolError) -> ReadErrorAction {
    match e {
        ProtocolError::MessageTooLong { .. } => ReadErrorAction::SkipFrame {
            reason: "frame_too_long",
        },
        ProtocolError::InvalidUtf8 { .. } => ReadErrorAction::SkipFrame {
            reason: "invalid_utf8",
        },
        ProtocolError::Json(_) => ReadErrorAction::SkipFrame {
            reason: "malformed_frame",
        },
        ProtocolError::Io(_) => ReadErrorAction::Disconnect,
        // Handle future variants by their own recoverability
        other if other.is_recoverable() => ReadErrorAction::SkipFrame {
            reason: "protocol_error",
        },
        _ => ReadErrorAction::Disconnect,
    }
}

/// Whether a rejected chat body is worth a warning.
///
/// Blank bodies are noise and only show up at debug level.
pub(super) fn is_noise(e: &ValidationError) -> bool {
    matches!(e, ValidationError::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_disconnect() {
        let e = ProtocolError::Io(std::io::ErrorKind::ConnectionReset.into());
        assert_eq!(classify_read_error(&e), ReadErrorAction::Disconnect);
    }

    #[test]
    fn frame_errors_are_skipped() {
        let long = ProtocolError::MessageTooLong {
            actual: 5000,
            limit: 4096,
        };
        assert_eq!(
            classify_read_error(&long),
            ReadErrorAction::SkipFrame {
                reason: "frame_too_long"
            }
        );

        let json = ProtocolError::Json(serde_json::from_str::<u8>("x").unwrap_err());
        assert_eq!(
            classify_read_error(&json),
            ReadErrorAction::SkipFrame {
                reason: "malformed_frame"
            }
        );
    }

    #[test]
    fn blank_body_is_noise() {
        assert!(is_noise(&ValidationError::Empty));
        assert!(!is_noise(&ValidationError::TooLong {
            actual: 129,
            limit: 128
        }));
    }
}
