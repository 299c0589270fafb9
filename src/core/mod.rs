//! # Core Components
//!
//! The chunked [`ByteBuffer`](buffer::ByteBuffer) and everything that encodes
//! into it.
//!
//! ## Components
//! - **Buffer**: chunked storage with a cursor, vectored segments, file I/O
//! - **Fixed / Varint / Strings**: typed read/write methods on the buffer
//! - **Header**: the 8-byte frame header
//!
//! ## Limits
//! - Header length must be below `max_protocol_length` and fit a non-negative i32
//! - Varints stop at 5 (32-bit) or 10 (64-bit) bytes
//! - Reads fail rather than allocate past the available data

pub mod buffer;
pub mod fixed;
pub mod header;
pub mod strings;
pub mod varint;
