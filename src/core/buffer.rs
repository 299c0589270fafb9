//! # Chunked Byte Buffer
//!
//! A growable byte store made of fixed-size chunks appended in allocation order.
//! The buffer exposes one logical byte stream with a single cursor shared by
//! reads and writes.
//!
//! ## Invariants
//! - `0 <= position <= size <= capacity`
//! - `capacity` only grows; [`ByteBuffer::clear`] keeps every chunk
//! - chunk memory never moves once allocated, so vectored segments handed out
//!   by [`ByteBuffer::read_slices`] and [`ByteBuffer::write_slices`] stay valid
//!   for the lifetime of the borrow
//! - a failed read leaves `position` and `size` untouched
//!
//! Typed encoders live in sibling modules as further `impl ByteBuffer` blocks:
//! fixed-width values in `fixed`, varints in `varint`, strings in `strings`.

use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::{self, IoSlice, IoSliceMut, Read, Write};
use std::path::Path;

use tracing::{trace, warn};

use crate::config::DEFAULT_BUFFER_BASE_SIZE;
use crate::error::{ProtocolError, Result, StreamStage};
use crate::utils::metrics::Timer;

/// Byte order used for fixed-width values and fixed-width length prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Network order, the wire default
    #[default]
    Big,
    Little,
}

/// Chunked byte buffer with a shared read/write cursor
pub struct ByteBuffer {
    base_size: usize,
    position: usize,
    size: usize,
    chunks: Vec<Box<[u8]>>,
    endian: Endian,
}

impl ByteBuffer {
    /// Create a buffer that grows in chunks of `base_size` bytes.
    ///
    /// A `base_size` of zero is raised to one.
    pub fn new(base_size: usize) -> Self {
        let base_size = base_size.max(1);
        Self {
            base_size,
            position: 0,
            size: 0,
            chunks: vec![new_chunk(base_size)],
            endian: Endian::Big,
        }
    }

    /// Create a buffer holding a copy of `data`, cursor at 0
    pub fn from_slice(base_size: usize, data: &[u8]) -> Self {
        let mut buf = Self::new(base_size);
        buf.write(data);
        buf.position = 0;
        buf
    }

    pub fn base_size(&self) -> usize {
        self.base_size
    }

    /// Current cursor
    pub fn position(&self) -> usize {
        self.position
    }

    /// Logical length: the high-water mark of valid bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total bytes allocated across all chunks
    pub fn capacity(&self) -> usize {
        self.chunks.len() * self.base_size
    }

    /// Bytes that can be written at the cursor without allocating
    pub fn remaining_capacity(&self) -> usize {
        self.capacity() - self.position
    }

    /// Bytes between the cursor and the logical end
    pub fn readable(&self) -> usize {
        self.size - self.position
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    pub fn is_little_endian(&self) -> bool {
        self.endian == Endian::Little
    }

    /// Move the cursor to an absolute position.
    ///
    /// Moving past `size` (but within capacity) extends `size` to the new
    /// position; the skipped bytes keep whatever the chunk held.
    ///
    /// # Errors
    /// Returns `ProtocolError::PositionOutOfRange` if `position > capacity`
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        let capacity = self.capacity();
        if position > capacity {
            return Err(ProtocolError::PositionOutOfRange { position, capacity });
        }
        self.position = position;
        if self.position > self.size {
            self.size = self.position;
        }
        Ok(())
    }

    /// Reset cursor and size to zero; allocated chunks are kept for reuse
    pub fn clear(&mut self) {
        self.position = 0;
        self.size = 0;
    }

    /// Write raw bytes at the cursor, growing as needed
    pub fn write(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.ensure_capacity(data.len());

        let mut pos = self.position;
        let mut done = 0;
        while done < data.len() {
            let (index, offset) = self.locate(pos);
            let n = (self.base_size - offset).min(data.len() - done);
            self.chunks[index][offset..offset + n].copy_from_slice(&data[done..done + n]);
            done += n;
            pos += n;
        }

        self.position = pos;
        if self.position > self.size {
            self.size = self.position;
        }
    }

    /// Fill `out` from the cursor and advance it.
    ///
    /// # Errors
    /// Returns `ProtocolError::BufferUnderrun` if fewer than `out.len()` bytes remain
    pub fn read(&mut self, out: &mut [u8]) -> Result<()> {
        let available = self.readable();
        if available < out.len() {
            return Err(ProtocolError::BufferUnderrun {
                requested: out.len(),
                available,
            });
        }
        self.copy_out(self.position, out);
        self.position += out.len();
        Ok(())
    }

    /// Fill `out` starting at `position` without moving the cursor.
    ///
    /// # Errors
    /// Returns `ProtocolError::BufferUnderrun` if `size - position < out.len()`
    pub fn read_at(&self, out: &mut [u8], position: usize) -> Result<()> {
        let available = self.size.saturating_sub(position);
        if available < out.len() {
            return Err(ProtocolError::BufferUnderrun {
                requested: out.len(),
                available,
            });
        }
        self.copy_out(position, out);
        Ok(())
    }

    /// Copy of the readable bytes `[position, size)`
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.readable()];
        self.copy_out(self.position, &mut out);
        out
    }

    /// Readable bytes as text, invalid UTF-8 replaced
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.to_vec()).into_owned()
    }

    /// Hex dump of the readable bytes, 32 bytes per line
    pub fn to_hex_string(&self) -> String {
        let bytes = self.to_vec();
        let mut out = String::with_capacity(bytes.len() * 3 + bytes.len() / 32);
        for (i, byte) in bytes.iter().enumerate() {
            if i > 0 && i % 32 == 0 {
                out.push('\n');
            }
            let _ = write!(out, "{byte:02x} ");
        }
        out
    }

    /// Segments covering up to `len` readable bytes from the cursor
    pub fn read_slices(&self, len: usize) -> Vec<IoSlice<'_>> {
        self.read_slices_at(len, self.position)
    }

    /// Segments covering up to `len` bytes starting at `position`, clipped to `size`
    pub fn read_slices_at(&self, len: usize, position: usize) -> Vec<IoSlice<'_>> {
        let len = len.min(self.size.saturating_sub(position));
        let end = position + len;
        let mut slices = Vec::with_capacity(len / self.base_size + 2);
        let mut pos = position;
        while pos < end {
            let (index, offset) = self.locate(pos);
            let n = (self.base_size - offset).min(end - pos);
            slices.push(IoSlice::new(&self.chunks[index][offset..offset + n]));
            pos += n;
        }
        slices
    }

    /// Grow capacity to fit `len` bytes at the cursor and return the writable
    /// segments covering them.
    ///
    /// The cursor does not move; after filling the segments the caller
    /// advances it with [`ByteBuffer::set_position`].
    pub fn write_slices(&mut self, len: usize) -> Vec<IoSliceMut<'_>> {
        if len == 0 {
            return Vec::new();
        }
        self.ensure_capacity(len);

        let base = self.base_size;
        let start = self.position;
        let end = start + len;
        let mut slices = Vec::with_capacity(len / base + 2);
        let mut pos = start;
        for chunk in self.chunks.iter_mut().skip(start / base) {
            if pos >= end {
                break;
            }
            let offset = pos % base;
            let n = (base - offset).min(end - pos);
            slices.push(IoSliceMut::new(&mut chunk[offset..offset + n]));
            pos += n;
        }
        slices
    }

    /// Write `[position, size)` to `path`, replacing its contents.
    ///
    /// # Errors
    /// Returns `ProtocolError::StreamIOFailure` if the file cannot be created or written
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let _timer = Timer::start("buffer_write_to_file");
        let path = path.as_ref();
        let mut file = File::create(path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to create buffer file");
            ProtocolError::stream(StreamStage::File, e)
        })?;

        for slice in self.read_slices(self.readable()) {
            file.write_all(&slice)
                .map_err(|e| ProtocolError::stream(StreamStage::File, e))?;
        }
        file.flush()
            .map_err(|e| ProtocolError::stream(StreamStage::File, e))?;

        trace!(path = %path.display(), bytes = self.readable(), "Buffer written to file");
        Ok(())
    }

    /// Write the whole contents of `path` at the cursor through the normal
    /// write path, advancing the cursor and `size`.
    ///
    /// # Errors
    /// Returns `ProtocolError::StreamIOFailure` if the file cannot be opened or
    /// read; position and size are then unchanged
    pub fn read_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let _timer = Timer::start("buffer_read_from_file");
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to open buffer file");
            ProtocolError::stream(StreamStage::File, e)
        })?;

        let start = self.position;
        let mut chunk = vec![0u8; self.base_size];
        self.transact(|buf| loop {
            match file.read(&mut chunk) {
                Ok(0) => break Ok(()),
                Ok(n) => buf.write(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(ProtocolError::stream(StreamStage::File, e)),
            }
        })?;

        trace!(path = %path.display(), bytes = self.position - start, "Buffer read from file");
        Ok(())
    }

    /// Run `op`, restoring cursor and size if it fails
    pub(crate) fn transact<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let (position, size) = (self.position, self.size);
        let result = op(self);
        if result.is_err() {
            self.position = position;
            self.size = size;
        }
        result
    }

    /// Byte at `pos`; callers guarantee `pos < size`
    pub(crate) fn byte_at(&self, pos: usize) -> u8 {
        let (index, offset) = self.locate(pos);
        self.chunks[index][offset]
    }

    /// Move the cursor forward over bytes already known to be readable
    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.readable());
        self.position += n;
    }

    fn locate(&self, pos: usize) -> (usize, usize) {
        (pos / self.base_size, pos % self.base_size)
    }

    fn ensure_capacity(&mut self, additional: usize) {
        let needed = self.position.saturating_add(additional);
        while self.capacity() < needed {
            self.chunks.push(new_chunk(self.base_size));
        }
    }

    fn copy_out(&self, mut pos: usize, out: &mut [u8]) {
        let mut done = 0;
        while done < out.len() {
            let (index, offset) = self.locate(pos);
            let n = (self.base_size - offset).min(out.len() - done);
            out[done..done + n].copy_from_slice(&self.chunks[index][offset..offset + n]);
            done += n;
            pos += n;
        }
    }
}

fn new_chunk(size: usize) -> Box<[u8]> {
    vec![0u8; size].into_boxed_slice()
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_BASE_SIZE)
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("base_size", &self.base_size)
            .field("position", &self.position)
            .field("size", &self.size)
            .field("capacity", &self.capacity())
            .field("endian", &self.endian)
            .finish()
    }
}

// io adapters let the gzip collaborator stream straight into chunk memory
impl Write for ByteBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ByteBuffer::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for ByteBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.readable());
        self.copy_out(self.position, &mut buf[..n]);
        self.position += n;
        Ok(n)
    }
}
