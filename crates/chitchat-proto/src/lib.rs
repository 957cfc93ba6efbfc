//! # chitchat-proto
//!
//! Wire protocol for the ChitChat relay: Lamport-stamped chat frames shared by
//! the server (`chitchatd`) and every client.
//!
//! ## Features
//!
//! - [`LamportClock`]: lock-free logical clock implementing the Lamport
//!   send (`tick`) and receive (`observe`) rules
//! - [`ChatMessage`]: the `(lamport_timestamp, from, message)` frame
//! - Body validation shared by senders and the relay
//! - Optional Tokio integration: newline-delimited JSON codec and the client
//!   send/receive loops
//!
//! ## Quick Start
//!
//! ```rust
//! use chitchat_proto::{validate_body, ChatMessage, LamportClock};
//!
//! let clock = LamportClock::new();
//! validate_body("hello").expect("valid body");
//!
//! let msg = ChatMessage::new(clock.tick(), "alice", "hello");
//! assert_eq!(msg.lamport_timestamp, 1);
//!
//! // A peer folds the timestamp into its own clock on receipt.
//! let peer = LamportClock::new();
//! assert_eq!(peer.observe(msg.lamport_timestamp), 2);
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod clock;
pub mod error;
pub mod message;
pub mod validate;

#[cfg(feature = "tokio")]
pub mod client;
#[cfg(feature = "tokio")]
pub mod codec;
#[cfg(feature = "tokio")]
pub mod line;

pub use self::clock::LamportClock;
pub use self::error::{ProtocolError, Result};
pub use self::message::{resolve_identity, ChatMessage, DEFAULT_IDENTITY, MAX_IDENTITY_LEN};
pub use self::validate::{
    validate_body, validate_bytes, validate_identity, validate_timestamp, ValidationError,
    MAX_BODY_LEN, MAX_TIMESTAMP,
};

#[cfg(feature = "tokio")]
pub use self::codec::{ChatCodec, Frame, DEFAULT_MAX_FRAME_LEN};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
