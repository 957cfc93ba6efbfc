//! Connection - Handles an individual participant connection.
//!
//! Each Connection runs in its own Tokio task and walks one [`Session`]
//! through its lifecycle:
//!
//! ```text
//! Phase 1: Joining (read the join frame, sequential)
//!    ↓
//! Phase 2: Active
//!    ┌──────────────────────────────────────────────────────┐
//!    │  FramedRead ──▶ Relay::relay_message ──▶ Registry     │
//!    │                                            │ try_send │
//!    │                                            ▼          │
//!    │  FramedWrite ◀── writer task ◀── [Outbound Queue]     │
//!    └──────────────────────────────────────────────────────┘
//!    ↓
//! Phase 3: Leaving (unregister, leave announcement) → Closed
//! ```
//!
//! The writer task owns the transport's write half, so a peer that stops
//! reading only fills its own queue. Once the session has left, the writer
//! gets [`WRITER_DRAIN_TIMEOUT`] to flush what is queued before it is aborted.

mod error_handling;

use error_handling::{ReadErrorAction, classify_read_error, is_noise};

use crate::config::LimitsConfig;
use crate::state::{OutboundQueue, Relay, Session, SessionHandle, Uid, outbound_channel};
use crate::telemetry::spans;
use chitchat_proto::{ChatCodec, ChatMessage, Frame, ProtocolError, resolve_identity};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{Instrument, Span, debug, info, instrument, warn};

/// How long a departed session's writer may keep flushing.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// A participant connection handler.
pub struct Connection<R, W> {
    uid: Uid,
    peer: String,
    relay: Arc<Relay>,
    outbound_capacity: usize,
    reader: FramedRead<R, ChatCodec>,
    writer: FramedWrite<W, ChatCodec>,
}

impl Connection<OwnedReadHalf, OwnedWriteHalf> {
    /// Create a handler for an accepted TCP stream.
    pub fn tcp(
        uid: Uid,
        stream: TcpStream,
        addr: SocketAddr,
        relay: Arc<Relay>,
        limits: &LimitsConfig,
    ) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self::new(uid, addr.to_string(), read_half, write_half, relay, limits)
    }
}

impl<R, W> Connection<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    /// Create a handler over any reader/writer pair.
    pub fn new(
        uid: Uid,
        peer: impl Into<String>,
        reader: R,
        writer: W,
        relay: Arc<Relay>,
        limits: &LimitsConfig,
    ) -> Self {
        Self {
            uid,
            peer: peer.into(),
            relay,
            outbound_capacity: limits.outbound_queue,
            reader: FramedRead::new(reader, ChatCodec::with_max_len(limits.max_frame_bytes)),
            writer: FramedWrite::new(writer, ChatCodec::with_max_len(limits.max_frame_bytes)),
        }
    }

    /// Run the session until the peer goes away.
    #[instrument(
        skip(self),
        fields(uid = %self.uid, addr = %self.peer, identity = tracing::field::Empty),
        name = "session"
    )]
    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("Client connected");
        let mut session = Session::new(self.uid.clone());

        // Phase 1: Joining
        let join = match self.await_join().await {
            Ok(Some(join)) => join,
            Ok(None) => {
                session.close()?;
                info!("Client disconnected before joining");
                return Ok(());
            }
            Err(e) => {
                session.close()?;
                return Err(e.into());
            }
        };

        // Phase 2: Active
        let identity = resolve_identity(&join.from);
        Span::current().record("identity", identity.as_str());

        let (tx, queue) = outbound_channel(self.outbound_capacity);
        let handle = Arc::new(SessionHandle::new(self.uid.clone(), identity.clone(), tx));
        if let Err(e) = self.relay.join(handle, join.lamport_timestamp) {
            warn!(reason = e.reason(), error = %e, "Join refused");
            session.close()?;
            return Ok(());
        }
        session.activate(identity.clone())?;

        let mut writer = tokio::spawn(
            write_loop(self.writer, queue).instrument(spans::writer(&self.uid, &identity)),
        );

        let ended = receive_loop(&mut self.reader, &self.relay, &identity).await;

        // Phase 3: Leaving
        let departing = session.begin_leave()?.to_string();
        match &ended {
            Ok(()) => info!("Client disconnected"),
            Err(e) => info!(error = %e, "Client connection lost"),
        }
        if self.relay.leave(&departing, &self.uid).is_none() {
            debug!("Identity already taken over, no leave announcement");
        }
        session.close()?;

        // Unregistering dropped the last queue sender, so the writer drains
        // what is left and stops, unless the peer has stopped reading.
        match timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => debug!(error = %e, "Writer stopped early"),
            Ok(Err(e)) => warn!(error = %e, "Writer task failed"),
            Err(_) => {
                writer.abort();
                warn!(timeout = ?WRITER_DRAIN_TIMEOUT, "Writer stalled, aborted");
            }
        }
        Ok(())
    }

    /// Read until the first chat frame. `None` if the stream ends first.
    async fn await_join(&mut self) -> Result<Option<ChatMessage>, ProtocolError> {
        while let Some(frame) = self.reader.next().await {
            match frame? {
                Frame::Message(join) => return Ok(Some(join)),
                Frame::Malformed(e) => skip_or_fail(e)?,
            }
        }
        Ok(None)
    }
}

/// Active phase: relay every frame until the stream ends or breaks.
async fn receive_loop<R>(
    reader: &mut FramedRead<R, ChatCodec>,
    relay: &Relay,
    identity: &str,
) -> Result<(), ProtocolError>
where
    R: AsyncRead + Unpin,
{
    while let Some(frame) = reader.next().await {
        let msg = match frame? {
            Frame::Message(msg) => msg,
            Frame::Malformed(e) => {
                skip_or_fail(e)?;
                continue;
            }
        };

        if let Err(e) = relay.relay_message(identity, msg) {
            if is_noise(&e) {
                debug!("Blank message dropped");
            } else {
                warn!(reason = e.reason(), error = %e, "Message rejected");
            }
        }
    }
    Ok(())
}

/// Log a recoverable frame error, or hand back a fatal one.
fn skip_or_fail(e: ProtocolError) -> Result<(), ProtocolError> {
    match classify_read_error(&e) {
        ReadErrorAction::SkipFrame { reason } => {
            warn!(reason, error = %e, "Malformed frame skipped");
            Ok(())
        }
        ReadErrorAction::Disconnect => Err(e),
    }
}

/// Drain the session's outbound queue into the transport.
///
/// Only I/O errors end the loop. A message that cannot be encoded is dropped
/// for this recipient alone.
async fn write_loop<W>(
    mut sink: FramedWrite<W, ChatCodec>,
    mut queue: OutboundQueue,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(msg) = queue.recv().await {
        feed_or_skip(&mut sink, msg).await?;
        // Batch whatever else is already queued into one flush
        while let Ok(more) = queue.try_recv() {
            feed_or_skip(&mut sink, more).await?;
        }
        SinkExt::<Arc<ChatMessage>>::flush(&mut sink).await?;
    }
    Ok(())
}

async fn feed_or_skip<W>(
    sink: &mut FramedWrite<W, ChatCodec>,
    msg: Arc<ChatMessage>,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let lamport = msg.lamport_timestamp;
    match sink.feed(msg).await {
        Err(e) if e.is_recoverable() => {
            warn!(lamport, error = %e, "Outbound message dropped");
            Ok(())
        }
        result => result,
    }
}
