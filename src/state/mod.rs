//! Relay state.
//!
//! Everything a session task shares with the others is reachable from one
//! [`Relay`] handed out as `Arc<Relay>`:
//! - [`Registry`]: identity → session map behind a reader/writer lock
//! - broadcast fan-out over the registry ([`BroadcastReport`])
//! - the server's Lamport clock
//!
//! Per-connection lifecycle state ([`Session`]) stays with its own task.

mod broadcast;
mod registry;
mod relay;
mod session;
mod uid;

pub use broadcast::BroadcastReport;
pub use registry::Registry;
pub use relay::Relay;
pub use session::{OutboundQueue, Session, SessionHandle, SessionState, outbound_channel};
pub use uid::{Uid, UidGenerator};
