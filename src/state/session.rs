//! Session lifecycle and outbound handles.
//!
//! ## State Machine
//!
//! ```text
//! ┌─────────┐ join frame ┌────────┐ read error / EOF ┌─────────┐ unregistered ┌────────┐
//! │ Joining │ ─────────▶ │ Active │ ───────────────▶ │ Leaving │ ───────────▶ │ Closed │
//! └─────────┘            └────────┘                  └─────────┘              └────────┘
//!      │                                                                          ▲
//!      └────────────────────── stream ended before join ─────────────────────────┘
//! ```
//!
//! A [`Session`] is owned by its connection task and tracks the state. The
//! registry only ever sees the [`SessionHandle`]: identity plus the sending
//! end of that session's own outbound queue.

use crate::error::{DeliveryError, SessionError};
use crate::state::Uid;
use chitchat_proto::ChatMessage;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Lifecycle state of one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Connection accepted, waiting for the join frame.
    Joining,
    /// Registered and relaying.
    Active,
    /// Receive loop ended; being removed.
    Leaving,
    /// Terminal.
    Closed,
}

impl SessionState {
    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(self, next: Self) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Joining, Active) | (Joining, Closed) | (Active, Leaving) | (Leaving, Closed)
        )
    }

    /// Whether no further transitions are possible.
    #[allow(dead_code)]
    pub fn is_terminal(self) -> bool {
        self == Self::Closed
    }
}

/// Per-connection lifecycle tracker.
#[derive(Debug)]
pub struct Session {
    uid: Uid,
    identity: Option<String>,
    state: SessionState,
}

impl Session {
    /// A freshly accepted connection.
    pub fn new(uid: Uid) -> Self {
        Self {
            uid,
            identity: None,
            state: SessionState::Joining,
        }
    }

    /// Resolved identity; `None` while joining.
    #[allow(dead_code)]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Joining → Active under `identity`.
    pub fn activate(&mut self, identity: String) -> Result<(), SessionError> {
        self.transition(SessionState::Active)?;
        self.identity = Some(identity);
        Ok(())
    }

    /// Active → Leaving. Returns the departing identity.
    pub fn begin_leave(&mut self) -> Result<&str, SessionError> {
        self.transition(SessionState::Leaving)?;
        self.identity.as_deref().ok_or(SessionError::NoIdentity)
    }

    /// Leaving → Closed, or Joining → Closed when no join ever arrived.
    pub fn close(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Closed)
    }

    fn transition(&mut self, next: SessionState) -> Result<(), SessionError> {
        if !self.state.can_transition_to(next) {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        debug!(uid = %self.uid, from = ?self.state, to = ?next, "Session state changed");
        self.state = next;
        Ok(())
    }
}

/// Receiving end of a session's outbound queue, drained by its writer task.
pub type OutboundQueue = mpsc::Receiver<Arc<ChatMessage>>;

/// Create a bounded outbound queue for one session.
pub fn outbound_channel(capacity: usize) -> (mpsc::Sender<Arc<ChatMessage>>, OutboundQueue) {
    mpsc::channel(capacity)
}

/// Registry entry for an active session.
#[derive(Debug)]
pub struct SessionHandle {
    uid: Uid,
    identity: String,
    outbound: mpsc::Sender<Arc<ChatMessage>>,
}

impl SessionHandle {
    pub fn new(
        uid: impl Into<Uid>,
        identity: impl Into<String>,
        outbound: mpsc::Sender<Arc<ChatMessage>>,
    ) -> Self {
        Self {
            uid: uid.into(),
            identity: identity.into(),
            outbound,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Hand a message to this session's queue without waiting.
    pub fn deliver(&self, msg: Arc<ChatMessage>) -> Result<(), DeliveryError> {
        self.outbound.try_send(msg).map_err(DeliveryError::from)
    }
}
