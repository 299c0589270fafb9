//! # Frame Codec
//!
//! The wire format as a `tokio_util` codec over `BytesMut`, for callers that
//! collect bytes themselves (async transports, event loops). Header checks,
//! compression and message parsing are shared with
//! [`MessageCodec`](crate::protocol::codec::MessageCodec).
//!
//! Unlike the blocking codec, an incomplete frame is not an error: `decode`
//! returns `Ok(None)` and leaves the buffer untouched until more bytes arrive.
//! Completed frames and failures are counted in the inner codec's metrics.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::config::{ProtocolConfig, HEADER_LEN};
use crate::core::buffer::ByteBuffer;
use crate::core::header::Header;
use crate::error::{ProtocolError, Result};
use crate::protocol::codec::MessageCodec;
use crate::protocol::message::Message;

#[derive(Debug, Clone, Default)]
pub struct FrameCodec {
    inner: MessageCodec,
}

impl FrameCodec {
    pub fn new(config: ProtocolConfig) -> Self {
        Self {
            inner: MessageCodec::new(config),
        }
    }
}

impl From<MessageCodec> for FrameCodec {
    fn from(inner: MessageCodec) -> Self {
        Self { inner }
    }
}

impl Decoder for FrameCodec {
    type Item = Message;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        match self.decode_frame(src) {
            Ok(Some((msg, bytes, compressed))) => {
                self.inner
                    .metrics()
                    .message_decoded(bytes as u64, compressed);
                Ok(Some(msg))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                self.inner.metrics().decode_error();
                warn!(error = %e, "Dropping undecodable frame");
                Err(e)
            }
        }
    }
}

impl FrameCodec {
    pub fn codec(&self) -> &MessageCodec {
        &self.inner
    }

    fn decode_frame(&self, src: &mut BytesMut) -> Result<Option<(Message, usize, bool)>> {
        if src.len() < HEADER_LEN {
            return Ok(None);
        }

        let mut raw = [0u8; HEADER_LEN];
        raw.copy_from_slice(&src[..HEADER_LEN]);
        let config = self.inner.config();
        let header = Header::decode(&raw, config.max_protocol_length)?;

        let frame_len = HEADER_LEN + header.length as usize;
        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        let frame = src.split_to(frame_len);
        let body = ByteBuffer::from_slice(config.buffer_base_size, &frame[HEADER_LEN..]);
        let msg = self.inner.open_frame(&header, body)?;
        Ok(Some((msg, frame_len, header.is_compressed())))
    }
}

impl Encoder<Message> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<()> {
        let (header, body) = self.inner.build_frame(&msg).map_err(|e| {
            self.inner.metrics().encode_error();
            e
        })?;
        let frame_len = HEADER_LEN + body.readable();
        dst.reserve(frame_len);
        dst.extend_from_slice(&header.to_bytes());
        for slice in body.read_slices(body.readable()) {
            dst.extend_from_slice(&slice);
        }
        self.inner
            .metrics()
            .message_encoded(frame_len as u64, header.is_compressed());
        Ok(())
    }
}
