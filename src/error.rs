//! Unified error handling for chitchatd.
//!
//! Validation errors live in `chitchat_proto`; this module covers what only
//! the relay can get wrong: handing a message to a recipient's queue, and
//! driving a session through its lifecycle.

use crate::state::SessionState;
use thiserror::Error;

// ============================================================================
// Delivery Errors (broadcast fan-out)
// ============================================================================

/// Failure to hand a message to one recipient's outbound queue.
///
/// Always local to that recipient: the broadcast carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("outbound queue closed")]
    Closed,

    #[error("outbound queue full")]
    QueueFull,
}

impl DeliveryError {
    /// Get a static error code string for log fields.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Closed => "queue_closed",
            Self::QueueFull => "queue_full",
        }
    }
}

impl<T> From<tokio::sync::mpsc::error::TrySendError<T>> for DeliveryError {
    fn from(e: tokio::sync::mpsc::error::TrySendError<T>) -> Self {
        match e {
            tokio::sync::mpsc::error::TrySendError::Full(_) => Self::QueueFull,
            tokio::sync::mpsc::error::TrySendError::Closed(_) => Self::Closed,
        }
    }
}

// ============================================================================
// Session Errors (connection lifecycle)
// ============================================================================

/// Errors raised while driving one session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session transition {from:?} -> {to:?}")]
    InvalidTransition { from: SessionState, to: SessionState },

    #[error("session has no identity before joining")]
    NoIdentity,
}
