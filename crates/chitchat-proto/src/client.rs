//! Client session loops.
//!
//! A client owns one [`LamportClock`] shared by two concurrent halves:
//!
//! ```text
//!   user input ──▶ Outbound::send ──tick()──▶ [ChatCodec] ──▶ relay
//!   display   ◀── Inbound::recv ◀─observe()── [ChatCodec] ◀── relay
//! ```
//!
//! [`split`] builds both halves over any reader/writer pair and [`connect`]
//! does the same over TCP. The receive half ends only when the channel errors
//! or closes; there is no reconnect.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, warn};

use crate::clock::LamportClock;
use crate::codec::{ChatCodec, Frame};
use crate::error::ProtocolError;
use crate::message::{resolve_identity, ChatMessage};
use crate::validate::{validate_bytes, ValidationError};

/// Errors surfaced by the client halves.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The message failed validation and was not sent.
    #[error("message rejected: {0}")]
    Rejected(#[from] ValidationError),

    /// Transport or framing failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The relay closed the stream.
    #[error("connection closed by server")]
    Closed,
}

impl ClientError {
    /// Whether the session can keep going after this error.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// A message received from the relay, after folding its timestamp into the
/// local clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The message as relayed, carrying the server's authoritative timestamp.
    pub message: ChatMessage,
    /// Local clock value after `observe`.
    pub local_time: i64,
}

/// Sending half: stamps and transmits locally composed messages.
pub struct Outbound<W> {
    identity: String,
    clock: Arc<LamportClock>,
    sink: FramedWrite<W, ChatCodec>,
}

impl<W> Outbound<W>
where
    W: AsyncWrite + Unpin,
{
    /// Create a sending half for `identity` over `writer`.
    pub fn new(identity: impl Into<String>, clock: Arc<LamportClock>, writer: W) -> Self {
        Self {
            identity: identity.into(),
            clock,
            sink: FramedWrite::new(writer, ChatCodec::new()),
        }
    }

    /// Identity stamped on every outgoing message.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Shared clock.
    pub fn clock(&self) -> &Arc<LamportClock> {
        &self.clock
    }

    /// Announce this participant. Must be the first frame on the stream.
    pub async fn join(&mut self) -> Result<ChatMessage, ClientError> {
        let body = format!("{} has joined the chat!", self.identity);
        let msg = ChatMessage::new(self.clock.tick(), self.identity.clone(), body);
        self.sink.send(&msg).await?;
        debug!(lamport = msg.lamport_timestamp, "Join sent");
        Ok(msg)
    }

    /// Validate, stamp and send one message.
    ///
    /// Surrounding whitespace is trimmed first. A rejected body returns
    /// [`ClientError::Rejected`] without advancing the clock.
    pub async fn send(&mut self, raw: &[u8]) -> Result<ChatMessage, ClientError> {
        let body = validate_bytes(raw.trim_ascii())?;
        let msg = ChatMessage::new(self.clock.tick(), self.identity.clone(), body);
        self.sink.send(&msg).await?;
        debug!(lamport = msg.lamport_timestamp, "Message sent");
        Ok(msg)
    }
}

/// Receiving half: observes relayed timestamps and hands messages to the caller.
pub struct Inbound<R> {
    clock: Arc<LamportClock>,
    stream: FramedRead<R, ChatCodec>,
}

impl<R> Inbound<R>
where
    R: AsyncRead + Unpin,
{
    /// Create a receiving half over `reader`.
    pub fn new(clock: Arc<LamportClock>, reader: R) -> Self {
        Self {
            clock,
            stream: FramedRead::new(reader, ChatCodec::new()),
        }
    }

    /// Wait for the next relayed message.
    ///
    /// Malformed frames are logged and skipped.
    pub async fn recv(&mut self) -> Result<Delivery, ClientError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Frame::Message(message))) => {
                    let local_time = self.clock.observe(message.lamport_timestamp);
                    return Ok(Delivery {
                        message,
                        local_time,
                    });
                }
                Some(Ok(Frame::Malformed(e))) => {
                    warn!(error = %e, "Malformed frame from server skipped");
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Err(ClientError::Closed),
            }
        }
    }

    /// Receive until the channel fails, passing each delivery to `on_delivery`.
    ///
    /// Returns the error that ended the session.
    pub async fn run<F>(mut self, mut on_delivery: F) -> ClientError
    where
        F: FnMut(&Delivery),
    {
        loop {
            match self.recv().await {
                Ok(delivery) => {
                    debug!(
                        lamport = delivery.message.lamport_timestamp,
                        from = %delivery.message.from,
                        local_lamport = delivery.local_time,
                        "Message received"
                    );
                    on_delivery(&delivery);
                }
                Err(e) => return e,
            }
        }
    }
}

/// Build both halves over a reader/writer pair, sharing one fresh clock.
///
/// `requested` is resolved with [`resolve_identity`], so a blank name joins
/// as the default identity.
pub fn split<R, W>(reader: R, writer: W, requested: &str) -> (Outbound<W>, Inbound<R>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let clock = Arc::new(LamportClock::new());
    let outbound = Outbound::new(resolve_identity(requested), Arc::clone(&clock), writer);
    let inbound = Inbound::new(clock, reader);
    (outbound, inbound)
}

/// Connect to a relay over TCP.
pub async fn connect(
    addr: impl ToSocketAddrs,
    requested: &str,
) -> Result<(Outbound<OwnedWriteHalf>, Inbound<OwnedReadHalf>), ClientError> {
    let stream = TcpStream::connect(addr).await.map_err(ProtocolError::from)?;
    let (read_half, write_half) = stream.into_split();
    Ok(split(read_half, write_half, requested))
}
