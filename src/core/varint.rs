//! # Varint Encoding
//!
//! Unsigned values are written 7 bits per byte, lowest group first, with the
//! high bit set on every byte except the last. Signed values are zig-zag mapped
//! first so small magnitudes stay short.
//!
//! ```text
//! 0..128          -> 1 byte
//! 128..16384      -> 2 bytes
//! 16384..2097152  -> 3 bytes
//! ```

use crate::core::buffer::ByteBuffer;
use crate::error::{ProtocolError, Result};

/// Longest encoding of a 32-bit value
pub const MAX_VARINT_LEN_32: usize = 5;

/// Longest encoding of a 64-bit value
pub const MAX_VARINT_LEN_64: usize = 10;

#[inline]
pub fn zigzag_encode_32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

#[inline]
pub fn zigzag_decode_32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

#[inline]
pub fn zigzag_encode_64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[inline]
pub fn zigzag_decode_64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Number of bytes `value` occupies once varint-encoded
pub fn varint_len(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

/// Encode `value` into `out`, returning the number of bytes used
pub fn encode_varint(mut value: u64, out: &mut [u8; MAX_VARINT_LEN_64]) -> usize {
    let mut i = 0;
    while value >= 0x80 {
        out[i] = (value as u8 & 0x7F) | 0x80;
        value >>= 7;
        i += 1;
    }
    out[i] = value as u8;
    i + 1
}

impl ByteBuffer {
    pub fn write_var_u32(&mut self, value: u32) {
        self.write_var_u64(u64::from(value));
    }

    pub fn write_var_i32(&mut self, value: i32) {
        self.write_var_u32(zigzag_encode_32(value));
    }

    pub fn write_var_u64(&mut self, value: u64) {
        let mut scratch = [0u8; MAX_VARINT_LEN_64];
        let len = encode_varint(value, &mut scratch);
        self.write(&scratch[..len]);
    }

    pub fn write_var_i64(&mut self, value: i64) {
        self.write_var_u64(zigzag_encode_64(value));
    }

    /// Read a varint-encoded `u32`.
    ///
    /// # Errors
    /// - `ProtocolError::BufferUnderrun` if the data ends mid-varint
    /// - `ProtocolError::VarintOverflow` if the encoding is longer than 5 bytes
    ///   or the value exceeds `u32::MAX`
    pub fn read_var_u32(&mut self) -> Result<u32> {
        let (value, len) = self.peek_varint(MAX_VARINT_LEN_32)?;
        let value = u32::try_from(value).map_err(|_| ProtocolError::VarintOverflow {
            max_bytes: MAX_VARINT_LEN_32,
        })?;
        self.advance(len);
        Ok(value)
    }

    pub fn read_var_i32(&mut self) -> Result<i32> {
        self.read_var_u32().map(zigzag_decode_32)
    }

    /// Read a varint-encoded `u64`.
    ///
    /// # Errors
    /// - `ProtocolError::BufferUnderrun` if the data ends mid-varint
    /// - `ProtocolError::VarintOverflow` if the encoding is longer than 10 bytes
    ///   or carries bits beyond 64
    pub fn read_var_u64(&mut self) -> Result<u64> {
        let (value, len) = self.peek_varint(MAX_VARINT_LEN_64)?;
        self.advance(len);
        Ok(value)
    }

    pub fn read_var_i64(&mut self) -> Result<i64> {
        self.read_var_u64().map(zigzag_decode_64)
    }

    // Decodes at the cursor without consuming, so a failure leaves it in place.
    fn peek_varint(&self, max_bytes: usize) -> Result<(u64, usize)> {
        let start = self.position();
        let mut value = 0u64;
        for i in 0..max_bytes {
            let pos = start + i;
            if pos >= self.size() {
                return Err(ProtocolError::BufferUnderrun {
                    requested: i + 1,
                    available: self.readable(),
                });
            }
            let byte = self.byte_at(pos);
            let bits = u64::from(byte & 0x7F);
            let shift = 7 * i as u32;
            if shift == 63 && bits > 1 {
                return Err(ProtocolError::VarintOverflow { max_bytes });
            }
            value |= bits << shift;
            if byte & 0x80 == 0 {
                return Ok((value, i + 1));
            }
        }
        Err(ProtocolError::VarintOverflow { max_bytes })
    }
}
