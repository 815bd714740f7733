//! Common types and utilities for sinks
//!
//! Shared functionality across all sink types.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Destination for rendered documents
///
/// A pipeline calls `write` once per rendered record, serially. One sink
/// instance may be shared by several pipelines, so implementations must be
/// safe to call from concurrent invocations.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Writer name used in configuration and logs
    fn name(&self) -> &str;

    /// Deliver one document to `destination`
    async fn write(&self, destination: &str, document: Bytes) -> Result<(), SinkError>;

    /// Establish connections now instead of on the first write
    async fn connect(&self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Release connections and flush buffered output
    async fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Point-in-time write counters
    fn metrics(&self) -> MetricsSnapshot;
}

/// Metrics shared by all sink types
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Documents successfully written
    pub documents_written: AtomicU64,

    /// Total payload bytes written
    pub bytes_written: AtomicU64,

    /// Write errors encountered
    pub write_errors: AtomicU64,

    /// Connections established (network sinks)
    pub connects: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            documents_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            connects: AtomicU64::new(0),
        }
    }

    /// Record a successfully written document
    #[inline]
    pub fn document_written(&self, bytes: u64) {
        self.documents_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a write error
    #[inline]
    pub fn write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a new connection
    #[inline]
    pub fn connected(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_written: self.documents_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            connects: self.connects.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of sink metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub documents_written: u64,
    pub bytes_written: u64,
    pub write_errors: u64,
    pub connects: u64,
}

/// Common sink errors
#[derive(Debug, Error)]
pub enum SinkError {
    /// Connection error (for network sinks)
    #[error("connection to {target} failed: {message}")]
    Connection { target: String, message: String },

    /// Failed to write data
    #[error("write failed: {0}")]
    Write(String),

    /// Operation did not complete in time
    #[error("{operation} timed out")]
    Timeout { operation: &'static str },

    /// Sink was closed before the write
    #[error("sink '{0}' is closed")]
    Closed(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SinkError {
    /// Create a connection error
    pub fn connection(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a write error
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
