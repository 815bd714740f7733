//! Null sink - discards all data
//!
//! Accepts every document, updates metrics and drops it. Useful for
//! exercising event definitions without a message bus.

use async_trait::async_trait;
use bytes::Bytes;

use crate::common::{MetricsSnapshot, Sink, SinkError, SinkMetrics};

/// Null sink that discards every document
#[derive(Debug, Default)]
pub struct NullSink {
    metrics: SinkMetrics,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Sink for NullSink {
    fn name(&self) -> &str {
        "null"
    }

    async fn write(&self, destination: &str, document: Bytes) -> Result<(), SinkError> {
        tracing::trace!(sink = "null", destination = %destination, bytes = document.len(), "discarded document");
        self.metrics.document_written(document.len() as u64);
        Ok(())
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
