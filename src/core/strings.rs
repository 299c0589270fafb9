//! Length-prefixed byte strings.
//!
//! Prefixes are either fixed-width (16/32/64 bits, in the buffer's byte order)
//! or a varint. Reads check the declared length against the readable bytes
//! before allocating anything, and rewind the prefix on failure.

use crate::core::buffer::ByteBuffer;
use crate::error::{ProtocolError, Result};

impl ByteBuffer {
    /// Write `value` behind a 16-bit length prefix.
    ///
    /// # Errors
    /// Returns `ProtocolError::StringTooLong` if `value` exceeds `u16::MAX` bytes
    pub fn write_string_f16(&mut self, value: impl AsRef<[u8]>) -> Result<()> {
        let value = value.as_ref();
        let len = u16::try_from(value.len()).map_err(|_| ProtocolError::StringTooLong {
            len: value.len(),
            prefix_bits: 16,
        })?;
        self.write_u16(len);
        self.write(value);
        Ok(())
    }

    /// Write `value` behind a 32-bit length prefix.
    ///
    /// # Errors
    /// Returns `ProtocolError::StringTooLong` if `value` exceeds `u32::MAX` bytes
    pub fn write_string_f32(&mut self, value: impl AsRef<[u8]>) -> Result<()> {
        let value = value.as_ref();
        let len = u32::try_from(value.len()).map_err(|_| ProtocolError::StringTooLong {
            len: value.len(),
            prefix_bits: 32,
        })?;
        self.write_u32(len);
        self.write(value);
        Ok(())
    }

    /// Write `value` behind a 64-bit length prefix.
    ///
    /// Infallible: any slice length fits a `u64`.
    pub fn write_string_f64(&mut self, value: impl AsRef<[u8]>) {
        let value = value.as_ref();
        self.write_u64(value.len() as u64);
        self.write(value);
    }

    /// Write `value` behind a varint length prefix.
    ///
    /// Infallible: the prefix is a 64-bit varint, which holds any slice length.
    pub fn write_string_varint(&mut self, value: impl AsRef<[u8]>) {
        let value = value.as_ref();
        self.write_var_u64(value.len() as u64);
        self.write(value);
    }

    /// Write `value` with no prefix; the reader must know the length.
    pub fn write_string_raw(&mut self, value: impl AsRef<[u8]>) {
        self.write(value.as_ref());
    }

    pub fn read_string_f16(&mut self) -> Result<Vec<u8>> {
        self.transact(|buf| {
            let len = buf.read_u16()?;
            buf.read_string_raw(usize::from(len))
        })
    }

    pub fn read_string_f32(&mut self) -> Result<Vec<u8>> {
        self.transact(|buf| {
            let len = buf.read_u32()?;
            buf.read_string_raw(clamp_len(u64::from(len)))
        })
    }

    pub fn read_string_f64(&mut self) -> Result<Vec<u8>> {
        self.transact(|buf| {
            let len = buf.read_u64()?;
            buf.read_string_raw(clamp_len(len))
        })
    }

    pub fn read_string_varint(&mut self) -> Result<Vec<u8>> {
        self.transact(|buf| {
            let len = buf.read_var_u64()?;
            buf.read_string_raw(clamp_len(len))
        })
    }

    /// Read exactly `len` bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::BufferUnderrun` if fewer than `len` bytes remain
    pub fn read_string_raw(&mut self, len: usize) -> Result<Vec<u8>> {
        let available = self.readable();
        if available < len {
            return Err(ProtocolError::BufferUnderrun {
                requested: len,
                available,
            });
        }
        let mut out = vec![0u8; len];
        self.read(&mut out)?;
        Ok(out)
    }
}

// a length that cannot be addressed can never be satisfied; let the underrun check reject it
fn clamp_len(len: u64) -> usize {
    usize::try_from(len).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::core::buffer::Endian;

    #[test]
    fn test_string_prefix_roundtrip() {
        let mut buf = ByteBuffer::new(5);
        buf.write_string_f16("sixteen").unwrap();
        buf.write_string_f32(b"thirty-two").unwrap();
        buf.write_string_f64("sixty-four");
        buf.write_string_varint("varint");
        buf.write_string_raw("raw");

        buf.set_position(0).unwrap();
        assert_eq!(buf.read_string_f16().unwrap(), b"sixteen");
        assert_eq!(buf.read_string_f32().unwrap(), b"thirty-two");
        assert_eq!(buf.read_string_f64().unwrap(), b"sixty-four");
        assert_eq!(buf.read_string_varint().unwrap(), b"varint");
        assert_eq!(buf.read_string_raw(3).unwrap(), b"raw");
        assert_eq!(buf.readable(), 0);
    }

    #[test]
    fn test_prefix_follows_endianness() {
        let mut buf = ByteBuffer::new(16);
        buf.set_endian(Endian::Little);
        buf.write_string_f16("ab").unwrap();
        buf.set_position(0).unwrap();
        assert_eq!(buf.to_vec(), vec![0x02, 0x00, b'a', b'b']);
    }

    #[test]
    fn test_empty_string() {
        let mut buf = ByteBuffer::new(4);
        buf.write_string_varint("");
        assert_eq!(buf.size(), 1);
        buf.set_position(0).unwrap();
        assert!(buf.read_string_varint().unwrap().is_empty());
    }

    #[test]
    fn test_declared_length_beyond_data_rewinds() {
        let mut buf = ByteBuffer::new(8);
        buf.write_u32(1000);
        buf.write(b"short");
        buf.set_position(0).unwrap();

        let err = buf.read_string_f32().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::BufferUnderrun {
                requested: 1000,
                available: 5
            }
        ));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_hostile_u64_length_is_rejected() {
        let mut buf = ByteBuffer::new(8);
        buf.write_u64(u64::MAX);
        buf.set_position(0).unwrap();
        assert!(matches!(
            buf.read_string_f64(),
            Err(ProtocolError::BufferUnderrun { .. })
        ));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_f16_rejects_oversized_value() {
        let mut buf = ByteBuffer::new(1024);
        let big = vec![0u8; usize::from(u16::MAX) + 1];
        assert!(matches!(
            buf.write_string_f16(&big),
            Err(ProtocolError::StringTooLong {
                prefix_bits: 16,
                ..
            })
        ));
        assert_eq!(buf.size(), 0);
    }

    #[test]
    fn test_wide_prefixes_take_what_f16_refuses() {
        let big = vec![3u8; usize::from(u16::MAX) + 1];
        let mut buf = ByteBuffer::new(4096);
        buf.write_string_f64(&big);
        buf.write_string_varint(&big);
        assert_eq!(buf.size(), 8 + 3 + 2 * big.len());

        buf.set_position(0).unwrap();
        assert_eq!(buf.read_string_f64().unwrap(), big);
        assert_eq!(buf.read_string_varint().unwrap(), big);
    }
}
