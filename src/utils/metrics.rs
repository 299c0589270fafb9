//! Observability and Metrics
//!
//! Atomic counters for codec traffic. A [`MessageCodec`] owns an `Arc<Metrics>`
//! so several codecs can report into one collector.
//!
//! [`MessageCodec`]: crate::protocol::codec::MessageCodec

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Metrics collector for codec operations
#[derive(Debug)]
pub struct Metrics {
    /// Messages successfully encoded and written
    pub messages_encoded: AtomicU64,
    /// Messages successfully read and decoded
    pub messages_decoded: AtomicU64,
    /// Frame bytes written (header + body)
    pub bytes_written: AtomicU64,
    /// Frame bytes read (header + body)
    pub bytes_read: AtomicU64,
    /// Frames written with a gzip body
    pub frames_compressed: AtomicU64,
    /// Frames read with a gzip body
    pub frames_decompressed: AtomicU64,
    /// Encode attempts that failed
    pub encode_errors: AtomicU64,
    /// Decode attempts that failed (I/O or protocol)
    pub decode_errors: AtomicU64,
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            messages_encoded: AtomicU64::new(0),
            messages_decoded: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
            frames_compressed: AtomicU64::new(0),
            frames_decompressed: AtomicU64::new(0),
            encode_errors: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a frame written to a stream
    pub fn message_encoded(&self, byte_count: u64, compressed: bool) {
        self.messages_encoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(byte_count, Ordering::Relaxed);
        if compressed {
            self.frames_compressed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a frame read from a stream
    pub fn message_decoded(&self, byte_count: u64, compressed: bool) {
        self.messages_decoded.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(byte_count, Ordering::Relaxed);
        if compressed {
            self.frames_decompressed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn encode_error(&self) {
        self.encode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_encoded: self.messages_encoded.load(Ordering::Relaxed),
            messages_decoded: self.messages_decoded.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            frames_compressed: self.frames_compressed.load(Ordering::Relaxed),
            frames_decompressed: self.frames_decompressed.load(Ordering::Relaxed),
            encode_errors: self.encode_errors.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            messages_encoded = snapshot.messages_encoded,
            messages_decoded = snapshot.messages_decoded,
            bytes_written = snapshot.bytes_written,
            bytes_read = snapshot.bytes_read,
            frames_compressed = snapshot.frames_compressed,
            frames_decompressed = snapshot.frames_decompressed,
            encode_errors = snapshot.encode_errors,
            decode_errors = snapshot.decode_errors,
            uptime_seconds = snapshot.uptime_seconds,
            "Codec metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub messages_encoded: u64,
    pub messages_decoded: u64,
    pub bytes_written: u64,
    pub bytes_read: u64,
    pub frames_compressed: u64,
    pub frames_decompressed: u64,
    pub encode_errors: u64,
    pub decode_errors: u64,
    pub uptime_seconds: u64,
}

static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Process-wide collector for callers that do not wire their own
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = Metrics::new();
        metrics.message_encoded(100, true);
        metrics.message_encoded(20, false);
        metrics.message_decoded(50, false);
        metrics.decode_error();

        let snap = metrics.snapshot();
        assert_eq!(snap.messages_encoded, 2);
        assert_eq!(snap.bytes_written, 120);
        assert_eq!(snap.frames_compressed, 1);
        assert_eq!(snap.messages_decoded, 1);
        assert_eq!(snap.bytes_read, 50);
        assert_eq!(snap.frames_decompressed, 0);
        assert_eq!(snap.decode_errors, 1);
        assert_eq!(snap.encode_errors, 0);
    }
}
