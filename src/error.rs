//! # Error Types
//!
//! Error handling for the buffer, the message model and the wire codec.
//!
//! Every failure carries a specific kind instead of collapsing to a boolean, so
//! callers (and tests) can tell a bad magic from a truncated stream.
//!
//! ## Error Categories
//! - **Buffer Errors**: underruns, cursor out of range, malformed varints
//! - **Protocol Errors**: magic/version/length violations, unknown message types
//! - **Compression Errors**: gzip encode/decode failures, decompression limits
//! - **Stream Errors**: short reads and failed writes, tagged with the stage
//!
//! ## Example Usage
//! ```rust
//! use rock_wire::core::buffer::ByteBuffer;
//! use rock_wire::error::ProtocolError;
//!
//! let mut buf = ByteBuffer::new(16);
//! buf.write_u8(7);
//! buf.set_position(0).unwrap();
//! match buf.read_u32() {
//!     Err(ProtocolError::BufferUnderrun { requested, available }) => {
//!         assert_eq!((requested, available), (4, 1));
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Dispatcher lock errors
    pub const ERR_DISPATCHER_WRITE_LOCK: &str = "Failed to acquire write lock on dispatcher";
    pub const ERR_DISPATCHER_READ_LOCK: &str = "Failed to acquire read lock on dispatcher";

    /// Message body errors
    pub const ERR_RESULT_MESSAGE_UTF8: &str = "result message is not valid UTF-8";
    pub const ERR_MISSING_TYPE_TAG: &str = "frame body is empty (no type tag)";

    /// Compression errors
    pub const ERR_GZIP_LIMIT: &str = "decompressed output exceeds limit";
}

/// Point in a stream exchange where an I/O failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStage {
    ReadHeader,
    ReadBody,
    WriteHeader,
    WriteBody,
    File,
}

impl fmt::Display for StreamStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            StreamStage::ReadHeader => "reading header",
            StreamStage::ReadBody => "reading body",
            StreamStage::WriteHeader => "writing header",
            StreamStage::WriteBody => "writing body",
            StreamStage::File => "accessing file",
        };
        f.write_str(stage)
    }
}

// ProtocolError is the primary error type for all operations in this crate
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Buffer underrun: requested {requested} bytes, {available} available")]
    BufferUnderrun { requested: usize, available: usize },

    #[error("Position {position} out of range (capacity {capacity})")]
    PositionOutOfRange { position: usize, capacity: usize },

    #[error("Varint does not terminate within {max_bytes} bytes or overflows its width")]
    VarintOverflow { max_bytes: usize },

    #[error("String of {len} bytes does not fit a {prefix_bits}-bit length prefix")]
    StringTooLong { len: usize, prefix_bits: u32 },

    #[error("Protocol magic mismatch: {0:02x?}")]
    ProtocolMagicMismatch([u8; 2]),

    #[error("Protocol version mismatch: {0}")]
    ProtocolVersionMismatch(u8),

    #[error("Protocol length {length} exceeds limit {max}")]
    ProtocolLengthExceeded { length: u64, max: u64 },

    #[error("Compression failed: {0}")]
    CompressionFailure(String),

    #[error("Unknown message type: {0}")]
    UnknownMessageType(u8),

    #[error("Malformed message body: {0}")]
    MalformedMessageBody(String),

    #[error("Stream I/O failure while {stage}: {source}")]
    StreamIOFailure {
        stage: StreamStage,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("No handler registered for command {0}")]
    UnhandledCommand(u32),

    #[error("Unexpected message type")]
    UnexpectedMessage,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Custom error: {0}")]
    Custom(String),
}

impl ProtocolError {
    pub(crate) fn stream(stage: StreamStage, source: io::Error) -> Self {
        ProtocolError::StreamIOFailure { stage, source }
    }

    /// True when the peer went away while the next frame header was expected.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            ProtocolError::StreamIOFailure {
                stage: StreamStage::ReadHeader,
                source,
            } if source.kind() == io::ErrorKind::UnexpectedEof
        )
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
