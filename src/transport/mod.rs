//! # Transport
//!
//! Byte streams the codec runs over.

pub mod stream;
