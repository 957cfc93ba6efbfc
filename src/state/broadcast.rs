//! Fan-out of one message to registered sessions.
//!
//! Membership is read once under the registry's read lock, so a broadcast
//! sees a consistent snapshot. Each recipient gets a non-blocking hand-off to
//! its own queue; one slow or gone recipient never holds up the rest.

use crate::error::DeliveryError;
use crate::state::Registry;
use chitchat_proto::ChatMessage;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of one broadcast.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Number of queues the message was handed to.
    pub delivered: usize,
    /// Recipients that could not take the message.
    pub failed: Vec<(String, DeliveryError)>,
}

impl BroadcastReport {
    /// Total recipients attempted.
    pub fn recipients(&self) -> usize {
        self.delivered + self.failed.len()
    }
}

impl Registry {
    /// Deliver `msg` to every registered session.
    pub fn broadcast_all(&self, msg: &Arc<ChatMessage>) -> BroadcastReport {
        self.fan_out(msg, None)
    }

    /// Deliver `msg` to every registered session except `excluded`.
    pub fn broadcast_except(&self, msg: &Arc<ChatMessage>, excluded: &str) -> BroadcastReport {
        self.fan_out(msg, Some(excluded))
    }

    fn fan_out(&self, msg: &Arc<ChatMessage>, excluded: Option<&str>) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let sessions = self.sessions.read();

        for (identity, handle) in sessions.iter() {
            if excluded == Some(identity.as_str()) {
                continue;
            }
            match handle.deliver(Arc::clone(msg)) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(
                        identity = %identity,
                        uid = %handle.uid(),
                        lamport = msg.lamport_timestamp,
                        error = %e,
                        code = e.error_code(),
                        "Delivery failed"
                    );
                    report.failed.push((identity.clone(), e));
                }
            }
        }
        drop(sessions);

        debug!(
            lamport = msg.lamport_timestamp,
            from = %msg.from,
            delivered = report.delivered,
            failed = report.failed.len(),
            "Message broadcast"
        );
        report
    }
}
