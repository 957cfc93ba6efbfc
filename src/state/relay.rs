//! The relay: server clock plus registry.
//!
//! Every event that passes through the server gets its authoritative Lamport
//! timestamp here. Client-originated events (joins, chat lines) are
//! `observe`d; the server's own leave announcements are `tick`ed.
//!
//! Incoming timestamps are range-checked before they are observed, so no
//! peer can drive the clock to `i64::MAX` where it would stop producing
//! distinct values.

use crate::state::{BroadcastReport, Registry, SessionHandle, Uid, UidGenerator};
use chitchat_proto::{
    ChatMessage, LamportClock, ValidationError, validate_body, validate_identity,
    validate_timestamp,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared relay state, one per server process.
pub struct Relay {
    server_name: String,
    clock: LamportClock,
    registry: Registry,
    uids: UidGenerator,
}

impl Relay {
    pub fn new(server_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            clock: LamportClock::new(),
            registry: Registry::new(),
            uids: UidGenerator::default(),
        }
    }

    pub fn clock(&self) -> &LamportClock {
        &self.clock
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Allocate an id for a newly accepted connection.
    pub fn next_uid(&self) -> Uid {
        self.uids.next()
    }

    /// Register a joining session and announce it to everyone, the joiner
    /// included.
    ///
    /// A join timestamp outside the accepted range refuses the join: nothing
    /// is registered and the clock does not move.
    pub fn join(
        &self,
        handle: Arc<SessionHandle>,
        join_timestamp: i64,
    ) -> Result<Arc<ChatMessage>, ValidationError> {
        validate_timestamp(join_timestamp)?;

        let identity = handle.identity().to_string();
        let uid = handle.uid().to_string();
        self.registry.register(handle);

        let lamport = self.clock.observe(join_timestamp);
        let announcement = Arc::new(ChatMessage::new(
            lamport,
            self.server_name.as_str(),
            format!("Participant {identity} joined Chit Chat at Lamport time {lamport}"),
        ));
        let report = self.registry.broadcast_all(&announcement);

        info!(
            uid = %uid,
            identity = %identity,
            lamport,
            participants = report.recipients(),
            "Participant joined"
        );
        Ok(announcement)
    }

    /// Stamp a chat message from `sender` and pass it to every other session.
    ///
    /// A rejected frame is not an event: the clock does not move and nothing
    /// is sent.
    pub fn relay_message(
        &self,
        sender: &str,
        msg: ChatMessage,
    ) -> Result<(Arc<ChatMessage>, BroadcastReport), ValidationError> {
        validate_body(&msg.message)?;
        validate_identity(&msg.from)?;
        validate_timestamp(msg.lamport_timestamp)?;

        let received = msg.lamport_timestamp;
        let lamport = self.clock.observe(received);
        let msg = Arc::new(msg.with_timestamp(lamport));
        let report = self.registry.broadcast_except(&msg, sender);

        debug!(
            identity = %sender,
            received,
            lamport,
            delivered = report.delivered,
            "Message relayed"
        );
        Ok((msg, report))
    }

    /// Remove a departing session and tell the others.
    ///
    /// Returns `None` without ticking when `uid` no longer owns `identity`,
    /// i.e. a newer connection already took the identity over.
    pub fn leave(&self, identity: &str, uid: &str) -> Option<Arc<ChatMessage>> {
        self.registry.unregister_session(identity, uid)?;

        let lamport = self.clock.tick();
        let announcement = Arc::new(ChatMessage::new(
            lamport,
            self.server_name.as_str(),
            format!("Participant {identity} left Chit Chat at Lamport time {lamport}"),
        ));
        self.registry.broadcast_except(&announcement, identity);

        info!(uid = %uid, identity = %identity, lamport, "Participant left");
        Some(announcement)
    }
}
