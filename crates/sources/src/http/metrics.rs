//! HTTP source metrics
//!
//! Atomic counters for tracking webhook requests.

use std::sync::atomic::{AtomicU64, Ordering};

/// HTTP source metrics
#[derive(Debug, Default)]
pub struct HttpSourceMetrics {
    /// Total HTTP requests received
    pub requests_received: AtomicU64,

    /// Requests answered with 200
    pub requests_accepted: AtomicU64,

    /// Requests answered with an error status
    pub requests_rejected: AtomicU64,

    /// Request body bytes received
    pub bytes_received: AtomicU64,

    /// Bodies written to the capture directory
    pub bodies_captured: AtomicU64,
}

impl HttpSourceMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            requests_received: AtomicU64::new(0),
            requests_accepted: AtomicU64::new(0),
            requests_rejected: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            bodies_captured: AtomicU64::new(0),
        }
    }

    /// Record a request received
    #[inline]
    pub fn request_received(&self) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn request_accepted(&self) {
        self.requests_accepted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn request_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record bytes received
    #[inline]
    pub fn bytes_received(&self, bytes: u64) {
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn body_captured(&self) {
        self.bodies_captured.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> HttpMetricsSnapshot {
        HttpMetricsSnapshot {
            requests_received: self.requests_received.load(Ordering::Relaxed),
            requests_accepted: self.requests_accepted.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            bodies_captured: self.bodies_captured.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpMetricsSnapshot {
    pub requests_received: u64,
    pub requests_accepted: u64,
    pub requests_rejected: u64,
    pub bytes_received: u64,
    pub bodies_captured: u64,
}
