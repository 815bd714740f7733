//! Stdout Sink - Human-readable debug output
//!
//! Prints each rendered document, prefixed with its destination, one record
//! per line. Not intended for production use at high throughput.
//!
//! # Example Output
//!
//! ```text
//! [github.push] {"repo":"hookbus","ref":"main"}
//! [inventory] {"sku":"A-1","qty":3}
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::common::{MetricsSnapshot, Sink, SinkError, SinkMetrics};

#[cfg(test)]
#[path = "stdout_test.rs"]
mod tests;

/// Configuration for stdout sink
#[derive(Debug, Clone)]
pub struct StdoutConfig {
    /// Prefix each document with `[destination] `
    pub show_destination: bool,
}

impl Default for StdoutConfig {
    fn default() -> Self {
        Self {
            show_destination: true,
        }
    }
}

impl StdoutConfig {
    /// Documents only, for piping into other tools
    pub fn raw() -> Self {
        Self {
            show_destination: false,
        }
    }
}

type Output = Box<dyn AsyncWrite + Send + Unpin>;

/// Stdout sink for debug output
pub struct StdoutSink {
    config: StdoutConfig,

    /// Serializes whole records so lines never interleave
    out: Mutex<Output>,

    metrics: SinkMetrics,
}

impl StdoutSink {
    /// Create a sink writing to the process stdout
    pub fn new(config: StdoutConfig) -> Self {
        Self::with_writer(config, tokio::io::stdout())
    }

    /// Create a sink writing to any async writer
    pub fn with_writer<W>(config: StdoutConfig, writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            config,
            out: Mutex::new(Box::new(writer)),
            metrics: SinkMetrics::new(),
        }
    }

    fn format_record(&self, destination: &str, document: &[u8]) -> Vec<u8> {
        let mut line = Vec::with_capacity(destination.len() + document.len() + 4);
        if self.config.show_destination {
            line.push(b'[');
            line.extend_from_slice(destination.as_bytes());
            line.extend_from_slice(b"] ");
        }
        line.extend_from_slice(document);
        if !document.ends_with(b"\n") {
            line.push(b'\n');
        }
        line
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new(StdoutConfig::default())
    }
}

#[async_trait]
impl Sink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn write(&self, destination: &str, document: Bytes) -> Result<(), SinkError> {
        let line = self.format_record(destination, &document);

        let mut out = self.out.lock().await;
        let result = async {
            out.write_all(&line).await?;
            out.flush().await
        }
        .await;

        match result {
            Ok(()) => {
                self.metrics.document_written(document.len() as u64);
                Ok(())
            }
            Err(e) => {
                self.metrics.write_error();
                Err(SinkError::Io(e))
            }
        }
    }

    async fn close(&self) -> Result<(), SinkError> {
        self.out.lock().await.flush().await?;
        Ok(())
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
