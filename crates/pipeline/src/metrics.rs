//! Pipeline metrics
//!
//! Atomic counters for one event's pipeline. All operations use relaxed
//! ordering; values are eventually consistent, not real-time.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for one pipeline
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Calls to `adapt`
    invocations: AtomicU64,

    /// Invocations that reported an error
    failures: AtomicU64,

    /// Records produced by the decoder
    records_decoded: AtomicU64,

    /// Outputs rendered by successful render tasks
    outputs_rendered: AtomicU64,

    /// Outputs accepted by the sink
    outputs_delivered: AtomicU64,

    /// Outputs the sink rejected
    sink_errors: AtomicU64,
}

impl PipelineMetrics {
    /// Create new metrics instance with all counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            invocations: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            records_decoded: AtomicU64::new(0),
            outputs_rendered: AtomicU64::new(0),
            outputs_delivered: AtomicU64::new(0),
            sink_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_invocation(&self) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_decoded(&self, records: u64) {
        self.records_decoded.fetch_add(records, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rendered(&self) {
        self.outputs_rendered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_delivered(&self) {
        self.outputs_delivered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_sink_error(&self) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            invocations: self.invocations.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            records_decoded: self.records_decoded.load(Ordering::Relaxed),
            outputs_rendered: self.outputs_rendered.load(Ordering::Relaxed),
            outputs_delivered: self.outputs_delivered.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of pipeline metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub invocations: u64,
    pub failures: u64,
    pub records_decoded: u64,
    pub outputs_rendered: u64,
    pub outputs_delivered: u64,
    pub sink_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = PipelineMetrics::new();
        metrics.record_invocation();
        metrics.record_invocation();
        metrics.record_failure();
        metrics.record_decoded(5);
        metrics.record_rendered();
        metrics.record_delivered();
        metrics.record_sink_error();

        let s = metrics.snapshot();
        assert_eq!(s.invocations, 2);
        assert_eq!(s.failures, 1);
        assert_eq!(s.records_decoded, 5);
        assert_eq!(s.outputs_rendered, 1);
        assert_eq!(s.outputs_delivered, 1);
        assert_eq!(s.sink_errors, 1);
    }
}
