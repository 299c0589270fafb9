//! # Utility Modules
//!
//! Supporting utilities for compression, logging, and metrics.
//!
//! ## Components
//! - **Compression**: streaming gzip into a `ByteBuffer`, with an output limit
//! - **Logging**: `tracing` subscriber setup from `LoggingConfig`
//! - **Metrics**: thread-safe counters for encode/decode activity

pub mod compression;
pub mod logging;
pub mod metrics;

pub use metrics::{global_metrics, Metrics, MetricsSnapshot};
