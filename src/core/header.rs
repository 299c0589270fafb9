//! # Frame Header
//!
//! Every frame opens with a fixed 8-byte header. It is never varint-encoded.
//!
//! ```text
//! [Magic(2) = AB CD] [Version(1) = 1] [Flags(1)] [Length(4, big-endian)]
//! ```
//!
//! Bit 0 of `flags` marks a gzip-compressed body. `length` counts the body bytes
//! that follow, after compression.

use crate::config::{FLAG_GZIP, HEADER_LEN, MAGIC_BYTES, PROTOCOL_VERSION};
use crate::error::{ProtocolError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub flags: u8,
    pub length: u32,
}

impl Header {
    pub fn new(length: u32, compressed: bool) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            flags: if compressed { FLAG_GZIP } else { 0 },
            length,
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_GZIP != 0
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..2].copy_from_slice(&MAGIC_BYTES);
        out[2] = self.version;
        out[3] = self.flags;
        out[4..8].copy_from_slice(&self.length.to_be_bytes());
        out
    }

    /// Parse and validate a header.
    ///
    /// Checks run in wire order: magic, version, then length. A length with the
    /// sign bit set is rejected as if it exceeded the limit.
    ///
    /// # Errors
    /// - `ProtocolError::ProtocolMagicMismatch` if the magic differs
    /// - `ProtocolError::ProtocolVersionMismatch` if the version is not 1
    /// - `ProtocolError::ProtocolLengthExceeded` if `length >= max_length` or negative as i32
    pub fn decode(bytes: &[u8; HEADER_LEN], max_length: u32) -> Result<Self> {
        let magic = [bytes[0], bytes[1]];
        if magic != MAGIC_BYTES {
            return Err(ProtocolError::ProtocolMagicMismatch(magic));
        }

        let version = bytes[2];
        if version != PROTOCOL_VERSION {
            return Err(ProtocolError::ProtocolVersionMismatch(version));
        }

        let length = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if i32::try_from(length).is_err() || length >= max_length {
            return Err(ProtocolError::ProtocolLengthExceeded {
                length: u64::from(length),
                max: u64::from(max_length),
            });
        }

        Ok(Self {
            version,
            flags: bytes[3],
            length,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_header_layout() {
        let bytes = Header::new(0x0102_0304, true).to_bytes();
        assert_eq!(bytes, [0xAB, 0xCD, 0x01, 0x01, 0x01, 0x02, 0x03, 0x04]);
        let bytes = Header::new(5, false).to_bytes();
        assert_eq!(bytes[3], 0);
    }

    #[test]
    fn test_decode_valid() {
        let header = Header::decode(&Header::new(42, true).to_bytes(), 1024).unwrap();
        assert_eq!(header.length, 42);
        assert!(header.is_compressed());
        assert_eq!(header.version, PROTOCOL_VERSION);
    }

    #[test]
    fn test_decode_bad_magic() {
        let mut bytes = Header::new(1, false).to_bytes();
        bytes[1] = 0xCE;
        assert!(matches!(
            Header::decode(&bytes, 1024),
            Err(ProtocolError::ProtocolMagicMismatch([0xAB, 0xCE]))
        ));
    }

    #[test]
    fn test_decode_bad_version() {
        let mut bytes = Header::new(1, false).to_bytes();
        bytes[2] = 2;
        assert!(matches!(
            Header::decode(&bytes, 1024),
            Err(ProtocolError::ProtocolVersionMismatch(2))
        ));
    }

    #[test]
    fn test_decode_length_limit_is_exclusive() {
        let bytes = Header::new(1024, false).to_bytes();
        assert!(matches!(
            Header::decode(&bytes, 1024),
            Err(ProtocolError::ProtocolLengthExceeded {
                length: 1024,
                max: 1024
            })
        ));
        assert!(Header::decode(&Header::new(1023, false).to_bytes(), 1024).is_ok());
    }

    #[test]
    fn test_decode_negative_length() {
        let bytes = Header::new(0x8000_0000, false).to_bytes();
        assert!(matches!(
            Header::decode(&bytes, u32::MAX),
            Err(ProtocolError::ProtocolLengthExceeded { .. })
        ));
    }
}
