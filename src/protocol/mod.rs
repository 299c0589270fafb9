//! # Protocol Layer
//!
//! Typed messages and how they travel.
//!
//! - **Message**: `Request`, `Response`, `Notify` and their body layout
//! - **Codec**: one frame per call over a blocking stream
//! - **Frame**: the same wire format as a `tokio_util` codec over `BytesMut`
//! - **Dispatcher**: handler tables keyed by command / notify code
//! - **Session**: request/response correlation and a serve loop

pub mod codec;
pub mod dispatcher;
pub mod frame;
pub mod message;
pub mod session;
