//! # Message Codec
//!
//! Reads and writes one framed message per call over a blocking [`Stream`].
//!
//! ## Decode
//! 1. read the 8-byte header (short read is a stream failure)
//! 2. validate magic, version and length against `max_protocol_length`
//! 3. read exactly `length` body bytes into a fresh buffer
//! 4. gunzip the body if flag bit 0 is set
//! 5. read the type tag and parse the matching variant
//!
//! ## Encode
//! 1. serialize tag, fields and body into a fresh buffer
//! 2. gzip it if it is at least `gzip_threshold` bytes
//! 3. write the header, then the body; return the total bytes written
//!
//! The codec keeps no state between calls. A failed decode leaves the stream at
//! an unknown offset; whether to keep reading is the caller's decision.

use std::io;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{ProtocolConfig, HEADER_LEN};
use crate::core::buffer::ByteBuffer;
use crate::core::header::Header;
use crate::error::{ProtocolError, Result, StreamStage};
use crate::protocol::message::Message;
use crate::transport::stream::Stream;
use crate::utils::compression::GzipStream;
use crate::utils::metrics::Metrics;

#[derive(Debug, Clone)]
pub struct MessageCodec {
    config: ProtocolConfig,
    metrics: Arc<Metrics>,
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new(ProtocolConfig::default())
    }
}

impl MessageCodec {
    pub fn new(config: ProtocolConfig) -> Self {
        Self::with_metrics(config, Arc::new(Metrics::new()))
    }

    /// Codec reporting into a shared collector
    pub fn with_metrics(config: ProtocolConfig, metrics: Arc<Metrics>) -> Self {
        Self { config, metrics }
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Read and decode one message from `stream`.
    ///
    /// # Errors
    /// - `ProtocolError::StreamIOFailure` on a short or failed header/body read
    /// - `ProtocolError::ProtocolMagicMismatch`, `ProtocolVersionMismatch`,
    ///   `ProtocolLengthExceeded` for an invalid header
    /// - `ProtocolError::CompressionFailure` if the gzip body cannot be inflated
    /// - `ProtocolError::UnknownMessageType`, `MalformedMessageBody` for a bad body
    pub fn decode<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<Message> {
        match self.read_frame(stream) {
            Ok((msg, bytes, compressed)) => {
                self.metrics.message_decoded(bytes as u64, compressed);
                debug!(
                    kind = msg.message_type().name(),
                    bytes, compressed, "Frame decoded"
                );
                Ok(msg)
            }
            Err(e) => {
                self.metrics.decode_error();
                if e.is_disconnect() {
                    debug!(error = %e, "Stream ended before frame header");
                } else {
                    warn!(error = %e, "Dropping undecodable frame");
                }
                Err(e)
            }
        }
    }

    /// Encode `msg` and write it to `stream`, returning header + body bytes written.
    ///
    /// # Errors
    /// - `ProtocolError::CompressionFailure` if gzip fails
    /// - `ProtocolError::ProtocolLengthExceeded` if the body cannot be described by the header
    /// - `ProtocolError::StreamIOFailure` with stage `WriteHeader` or `WriteBody`
    pub fn encode<S: Stream + ?Sized>(&self, stream: &mut S, msg: &Message) -> Result<usize> {
        let result = self.build_frame(msg).and_then(|(header, mut body)| {
            stream
                .write_fixed(&header.to_bytes())
                .map_err(|e| ProtocolError::stream(StreamStage::WriteHeader, e))?;
            let written = stream
                .write_fixed_from(&mut body, header.length as usize)
                .map_err(|e| ProtocolError::stream(StreamStage::WriteBody, e))?;
            Ok((HEADER_LEN + written, header.is_compressed()))
        });

        match result {
            Ok((total, compressed)) => {
                self.metrics.message_encoded(total as u64, compressed);
                debug!(
                    kind = msg.message_type().name(),
                    bytes = total,
                    compressed,
                    "Frame encoded"
                );
                Ok(total)
            }
            Err(e) => {
                self.metrics.encode_error();
                warn!(error = %e, kind = msg.message_type().name(), "Failed to encode frame");
                Err(e)
            }
        }
    }

    /// Encode `msg` into a standalone frame
    pub fn encode_to_vec(&self, msg: &Message) -> Result<Vec<u8>> {
        let mut out = io::Cursor::new(Vec::new());
        self.encode(&mut out, msg)?;
        Ok(out.into_inner())
    }

    /// Decode one frame from the start of `frame`; trailing bytes are ignored
    pub fn decode_from_slice(&self, frame: &[u8]) -> Result<Message> {
        let mut input = io::Cursor::new(frame.to_vec());
        self.decode(&mut input)
    }

    /// Serialize `msg`, gzip it when large enough, and describe it with a header.
    /// The returned body has its cursor at 0.
    pub(crate) fn build_frame(&self, msg: &Message) -> Result<(Header, ByteBuffer)> {
        let mut body = ByteBuffer::new(self.config.buffer_base_size);
        msg.serialize(&mut body)?;
        body.set_position(0)?;

        let compressed = body.readable() >= self.config.gzip_threshold;
        if compressed {
            let mut gz = GzipStream::encoder(self.config.buffer_base_size);
            gz.write_buffer(&body)?;
            body = gz.into_result()?;
        }

        let readable = body.readable();
        let length = u32::try_from(readable)
            .ok()
            .filter(|len| i32::try_from(*len).is_ok())
            .ok_or(ProtocolError::ProtocolLengthExceeded {
                length: readable as u64,
                max: i32::MAX as u64,
            })?;

        Ok((Header::new(length, compressed), body))
    }

    /// Inflate (if flagged) and parse a complete frame body whose cursor is at 0
    pub(crate) fn open_frame(&self, header: &Header, body: ByteBuffer) -> Result<Message> {
        let mut body = if header.is_compressed() {
            let mut gz = GzipStream::decoder(
                self.config.buffer_base_size,
                self.config.max_protocol_length as usize,
            );
            gz.write_buffer(&body)?;
            gz.into_result()?
        } else {
            body
        };

        Message::parse(&mut body)
    }

    fn read_frame<S: Stream + ?Sized>(&self, stream: &mut S) -> Result<(Message, usize, bool)> {
        let mut raw = [0u8; HEADER_LEN];
        let n = stream
            .read_fixed(&mut raw)
            .map_err(|e| ProtocolError::stream(StreamStage::ReadHeader, e))?;
        if n != HEADER_LEN {
            return Err(short_read(StreamStage::ReadHeader, n, HEADER_LEN));
        }

        let header = Header::decode(&raw, self.config.max_protocol_length)?;
        let length = header.length as usize;

        let mut body = ByteBuffer::new(self.config.buffer_base_size);
        let n = stream
            .read_fixed_into(&mut body, length)
            .map_err(|e| ProtocolError::stream(StreamStage::ReadBody, e))?;
        if n != length {
            return Err(short_read(StreamStage::ReadBody, n, length));
        }
        body.set_position(0)?;

        let msg = self.open_frame(&header, body)?;
        Ok((msg, HEADER_LEN + length, header.is_compressed()))
    }
}

fn short_read(stage: StreamStage, got: usize, wanted: usize) -> ProtocolError {
    ProtocolError::stream(
        stage,
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("stream ended after {got} of {wanted} bytes"),
        ),
    )
}
