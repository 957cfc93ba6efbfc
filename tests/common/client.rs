//! Test chat client.
//!
//! Speaks raw frames so tests control every timestamp, and asserts on what
//! the relay sends back.

use chitchat_proto::{ChatCodec, ChatMessage, Frame};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;

/// A test chat client.
pub struct TestClient {
    framed: Framed<TcpStream, ChatCodec>,
    name: String,
    /// Local Lamport time, kept by hand.
    pub clock: i64,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str, name: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        Ok(Self {
            framed: Framed::new(stream, ChatCodec::new()),
            name: name.to_string(),
            clock: 0,
        })
    }

    /// Send a frame as-is.
    pub async fn send_frame(&mut self, msg: ChatMessage) -> anyhow::Result<()> {
        self.framed.send(msg).await?;
        Ok(())
    }

    /// Write raw bytes, bypassing the codec.
    #[allow(dead_code)]
    pub async fn send_raw(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        let stream = self.framed.get_mut();
        stream.write_all(bytes).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Tick and send a chat line.
    pub async fn say(&mut self, body: &str) -> anyhow::Result<i64> {
        self.clock += 1;
        let msg = ChatMessage::new(self.clock, self.name.clone(), body);
        self.send_frame(msg).await?;
        Ok(self.clock)
    }

    /// Send the join frame and wait for the relay's confirmation.
    pub async fn join(&mut self) -> anyhow::Result<ChatMessage> {
        let body = format!("{} has joined the chat!", self.name);
        self.clock += 1;
        self.send_frame(ChatMessage::new(self.clock, self.name.clone(), body))
            .await?;

        let expected = format!("Participant {} joined", self.name);
        let confirm = self.recv_until(|m| m.message.starts_with(&expected)).await?;
        Ok(confirm)
    }

    /// Receive a single message from the server.
    pub async fn recv(&mut self) -> anyhow::Result<ChatMessage> {
        self.recv_timeout(Duration::from_secs(5)).await
    }

    /// Receive a message with a timeout, folding its timestamp into `clock`.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<ChatMessage> {
        loop {
            match timeout(dur, self.framed.next()).await? {
                Some(Ok(Frame::Message(msg))) => {
                    self.clock = self.clock.max(msg.lamport_timestamp) + 1;
                    return Ok(msg);
                }
                Some(Ok(Frame::Malformed(e))) => anyhow::bail!("malformed frame: {e}"),
                Some(Err(e)) => return Err(e.into()),
                None => anyhow::bail!("connection closed"),
            }
        }
    }

    /// Receive messages until one matches, returning it.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<ChatMessage>
    where
        F: FnMut(&ChatMessage) -> bool,
    {
        loop {
            let msg = self.recv().await?;
            if predicate(&msg) {
                return Ok(msg);
            }
        }
    }

    /// Assert that nothing arrives for a short while.
    #[allow(dead_code)]
    pub async fn expect_silence(&mut self) -> anyhow::Result<()> {
        match self.recv_timeout(Duration::from_millis(200)).await {
            Ok(msg) => anyhow::bail!("unexpected message: {msg}"),
            Err(_) => Ok(()),
        }
    }
}
