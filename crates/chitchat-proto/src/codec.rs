//! Chat frame codec for tokio.
//!
//! Each frame is one JSON object on its own line:
//!
//! ```text
//! {"lamport_timestamp":4,"from":"alice","message":"hi"}\n
//! ```
//!
//! Decoding never fails on a single bad frame. Over-long, non-UTF-8 or
//! unparseable lines surface as [`Frame::Malformed`] so the caller can log and
//! keep reading; only I/O errors end the stream.

use std::borrow::Borrow;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};
use crate::line::LineCodec;
use crate::message::ChatMessage;

/// Default maximum encoded frame length in bytes.
pub const DEFAULT_MAX_FRAME_LEN: usize = crate::line::DEFAULT_MAX_LINE_LEN;

/// One decoded line.
#[derive(Debug)]
pub enum Frame {
    /// A well-formed chat message.
    Message(ChatMessage),
    /// A line that was consumed but could not be decoded.
    Malformed(ProtocolError),
}

/// Tokio codec for [`ChatMessage`] frames.
#[derive(Debug, Clone, Default)]
pub struct ChatCodec {
    inner: LineCodec,
}

impl ChatCodec {
    /// Create a codec with [`DEFAULT_MAX_FRAME_LEN`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with a custom max frame length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }
}

impl Decoder for ChatCodec {
    type Item = Frame;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Frame>> {
        loop {
            let line = match self.inner.decode(src) {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(None),
                Err(e) if e.is_recoverable() => return Ok(Some(Frame::Malformed(e))),
                Err(e) => return Err(e),
            };

            // Blank keep-alive lines carry no frame
            if line.trim().is_empty() {
                continue;
            }

            return Ok(Some(match serde_json::from_str(&line) {
                Ok(msg) => Frame::Message(msg),
                Err(e) => Frame::Malformed(e.into()),
            }));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<Frame>> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if src.is_empty() {
            return Ok(None);
        }
        // Peer closed mid-line: treat the tail as a final unterminated frame.
        src.put_u8(b'\n');
        self.decode(src)
    }
}

impl<M: Borrow<ChatMessage>> Encoder<M> for ChatCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: M, dst: &mut BytesMut) -> error::Result<()> {
        let json = serde_json::to_string(Borrow::<ChatMessage>::borrow(&msg))?;
        self.inner.encode(json, dst)
    }
}
