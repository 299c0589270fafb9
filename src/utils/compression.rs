//! # Gzip Compression
//!
//! Streaming gzip encoder/decoder that writes its output straight into a
//! [`ByteBuffer`], so frame bodies never pass through an intermediate `Vec`.
//!
//! Decompression enforces an output limit (the codec passes its
//! `max_protocol_length`) to stop decompression bombs.

use std::io::{self, Write};

use flate2::write::{GzDecoder, GzEncoder};
use flate2::Compression;

use crate::core::buffer::ByteBuffer;
use crate::error::{constants, ProtocolError, Result};

/// Sink that refuses to grow past `limit` bytes
struct LimitedBuffer {
    buf: ByteBuffer,
    limit: usize,
}

impl Write for LimitedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.buf.size().saturating_add(data.len()) > self.limit {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                constants::ERR_GZIP_LIMIT,
            ));
        }
        self.buf.write(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

enum Inner {
    Encode(GzEncoder<ByteBuffer>),
    Decode(GzDecoder<LimitedBuffer>),
}

/// Gzip stream in either direction
pub struct GzipStream {
    inner: Inner,
}

impl GzipStream {
    /// Compressing stream producing a buffer with `base_size` chunks
    pub fn encoder(base_size: usize) -> Self {
        Self {
            inner: Inner::Encode(GzEncoder::new(
                ByteBuffer::new(base_size),
                Compression::default(),
            )),
        }
    }

    /// Decompressing stream that fails once output would exceed `limit` bytes
    pub fn decoder(base_size: usize, limit: usize) -> Self {
        Self {
            inner: Inner::Decode(GzDecoder::new(LimitedBuffer {
                buf: ByteBuffer::new(base_size),
                limit,
            })),
        }
    }

    /// Feed bytes through the stream.
    ///
    /// # Errors
    /// Returns `ProtocolError::CompressionFailure` if the codec rejects the data
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        let result = match &mut self.inner {
            Inner::Encode(enc) => enc.write_all(data),
            Inner::Decode(dec) => dec.write_all(data),
        };
        result.map_err(|e| self.failure(e))
    }

    /// Feed the readable bytes of `src` segment by segment; `src` is not consumed.
    pub fn write_buffer(&mut self, src: &ByteBuffer) -> Result<()> {
        for slice in src.read_slices(src.readable()) {
            self.write(&slice)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        let result = match &mut self.inner {
            Inner::Encode(enc) => enc.flush(),
            Inner::Decode(dec) => dec.flush(),
        };
        result.map_err(|e| self.failure(e))
    }

    /// Finish the stream and return its output, cursor rewound to 0.
    ///
    /// # Errors
    /// Returns `ProtocolError::CompressionFailure` if the stream is incomplete or corrupt
    pub fn into_result(self) -> Result<ByteBuffer> {
        let mut out = match self.inner {
            Inner::Encode(enc) => enc
                .finish()
                .map_err(|e| ProtocolError::CompressionFailure(format!("gzip encode: {e}")))?,
            Inner::Decode(dec) => {
                dec.finish()
                    .map_err(|e| ProtocolError::CompressionFailure(format!("gzip decode: {e}")))?
                    .buf
            }
        };
        out.set_position(0)?;
        Ok(out)
    }

    fn failure(&self, e: io::Error) -> ProtocolError {
        let direction = match self.inner {
            Inner::Encode(_) => "encode",
            Inner::Decode(_) => "decode",
        };
        ProtocolError::CompressionFailure(format!("gzip {direction}: {e}"))
    }
}

/// Gzip `data` in one shot
pub fn compress_gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut gz = GzipStream::encoder(data.len().max(64));
    gz.write(data)?;
    Ok(gz.into_result()?.to_vec())
}

/// Gunzip `data` in one shot, failing if the output would exceed `limit`
pub fn decompress_gzip(data: &[u8], limit: usize) -> Result<Vec<u8>> {
    let mut gz = GzipStream::decoder(4096, limit);
    gz.write(data)?;
    Ok(gz.into_result()?.to_vec())
}
