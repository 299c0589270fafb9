//! # rock-wire
//!
//! A chunked, growable byte buffer with binary codecs, and a framed
//! request/response/notify protocol built on it.
//!
//! ## Layers
//! - [`core`]: [`ByteBuffer`], fixed-width/varint/string codecs, the frame header
//! - [`protocol`]: message model, blocking [`MessageCodec`], the `tokio_util`
//!   [`FrameCodec`], dispatcher, sessions
//! - [`transport`]: the [`Stream`] boundary and an in-memory stream
//! - [`utils`]: gzip, logging setup, metrics
//!
//! ## Wire Format
//! ```text
//! [Magic AB CD] [Version 1] [Flags] [Length u32 BE] [Body(Length)]
//! ```
//! Flag bit 0 marks a gzip body. The (decompressed) body starts with a type
//! tag: 1 request, 2 response, 3 notify.
//!
//! ## Example
//! ```
//! use rock_wire::{Message, MessageCodec, MemoryStream, Request};
//!
//! let codec = MessageCodec::default();
//! let mut stream = MemoryStream::loopback();
//! codec.encode(&mut stream, &Request::new(7, 3, "ping").into()).unwrap();
//! let msg = codec.decode(&mut stream).unwrap();
//! assert_eq!(msg, Message::from(Request::new(7, 3, "ping")));
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod utils;

pub use crate::config::{LoggingConfig, ProtocolConfig, RockConfig};
pub use crate::core::buffer::{ByteBuffer, Endian};
pub use crate::core::header::Header;
pub use crate::error::{ProtocolError, Result, StreamStage};
pub use crate::protocol::codec::MessageCodec;
pub use crate::protocol::dispatcher::Dispatcher;
pub use crate::protocol::frame::FrameCodec;
pub use crate::protocol::message::{Message, MessageType, Notify, Request, Response};
pub use crate::protocol::session::Session;
pub use crate::transport::stream::{MemoryStream, Stream};
