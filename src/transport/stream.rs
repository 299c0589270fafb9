//! # Blocking Stream
//!
//! The byte-stream boundary the codec reads frames from and writes frames to.
//! Any `Read + Write` type (a `TcpStream`, a `UnixStream`, an in-memory
//! [`MemoryStream`]) is a [`Stream`].
//!
//! Transfers to and from a [`ByteBuffer`] go through its vectored segments, so
//! frame bodies land directly in chunk memory.

use std::collections::VecDeque;
use std::io::{self, Read, Write};

use crate::core::buffer::ByteBuffer;

pub trait Stream {
    /// Fill `buf` completely unless the stream ends first; returns bytes read.
    fn read_fixed(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all of `buf`; returns bytes written.
    fn write_fixed(&mut self, buf: &[u8]) -> io::Result<usize>;

    fn close(&mut self) -> io::Result<()>;

    /// Read up to `len` bytes into `dst` at its cursor and advance the cursor
    /// by the amount read. A short count means the stream ended.
    fn read_fixed_into(&mut self, dst: &mut ByteBuffer, len: usize) -> io::Result<usize> {
        let start = dst.position();
        let mut filled = 0;
        for slice in dst.write_slices(len).iter_mut() {
            let n = self.read_fixed(slice)?;
            filled += n;
            if n < slice.len() {
                break;
            }
        }
        dst.set_position(start + filled)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        Ok(filled)
    }

    /// Write up to `len` readable bytes of `src` and advance its cursor past them.
    fn write_fixed_from(&mut self, src: &mut ByteBuffer, len: usize) -> io::Result<usize> {
        let len = len.min(src.readable());
        for slice in src.read_slices(len) {
            self.write_fixed(&slice)?;
        }
        src.advance(len);
        Ok(len)
    }
}

impl<T: Read + Write> Stream for T {
    fn read_fixed(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    fn write_fixed(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_all(buf)?;
        Ok(buf.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// In-memory stream.
///
/// In loopback mode writes become readable input; otherwise reads drain the
/// preloaded input and writes collect in [`MemoryStream::outbound`].
#[derive(Debug, Default)]
pub struct MemoryStream {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
    loopback: bool,
}

impl MemoryStream {
    pub fn loopback() -> Self {
        Self {
            loopback: true,
            ..Self::default()
        }
    }

    pub fn with_input(input: impl Into<Vec<u8>>) -> Self {
        Self {
            inbound: VecDeque::from(input.into()),
            ..Self::default()
        }
    }

    pub fn push_inbound(&mut self, data: &[u8]) {
        self.inbound.extend(data);
    }

    /// Bytes still waiting to be read
    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    /// Drop all but the first `len` unread bytes
    pub fn truncate_inbound(&mut self, len: usize) {
        self.inbound.truncate(len);
    }

    pub fn outbound(&self) -> &[u8] {
        &self.outbound
    }

    pub fn take_outbound(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outbound)
    }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inbound.read(buf)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.loopback {
            self.inbound.extend(buf);
        } else {
            self.outbound.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_read_fixed_reports_short_count() {
        let mut stream = MemoryStream::with_input(vec![1, 2, 3]);
        let mut buf = [0u8; 5];
        assert_eq!(stream.read_fixed(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(stream.read_fixed(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_read_into_buffer_spans_chunks() {
        let data: Vec<u8> = (0..100).collect();
        let mut stream = MemoryStream::with_input(data.clone());
        let mut buf = ByteBuffer::new(7);
        buf.write(b"xy");

        assert_eq!(stream.read_fixed_into(&mut buf, 100).unwrap(), 100);
        assert_eq!(buf.position(), 102);
        assert_eq!(buf.size(), 102);

        buf.set_position(2).unwrap();
        assert_eq!(buf.to_vec(), data);
    }

    #[test]
    fn test_read_into_buffer_short() {
        let mut stream = MemoryStream::with_input(vec![9u8; 10]);
        let mut buf = ByteBuffer::new(4);
        assert_eq!(stream.read_fixed_into(&mut buf, 16).unwrap(), 10);
        assert_eq!(buf.position(), 10);
        assert_eq!(buf.size(), 10);
    }

    #[test]
    fn test_write_from_buffer_advances_source() {
        let mut src = ByteBuffer::from_slice(3, b"hello world");
        let mut stream = MemoryStream::default();
        assert_eq!(stream.write_fixed_from(&mut src, 5).unwrap(), 5);
        assert_eq!(src.position(), 5);
        assert_eq!(stream.write_fixed_from(&mut src, 100).unwrap(), 6);
        assert_eq!(stream.outbound(), b"hello world");
        assert_eq!(src.readable(), 0);
    }

    #[test]
    fn test_loopback() {
        let mut stream = MemoryStream::loopback();
        stream.write_fixed(b"ping").unwrap();
        assert_eq!(stream.pending(), 4);
        let mut buf = [0u8; 4];
        stream.read_fixed(&mut buf).unwrap();
        assert_eq!(&buf, b"ping");
        assert!(stream.outbound().is_empty());
        stream.close().unwrap();
    }
}
