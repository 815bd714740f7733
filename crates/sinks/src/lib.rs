//! hookbus - Sinks
//!
//! Output writers for rendered documents.
//!
//! # Architecture
//!
//! A pipeline renders `(destination, document)` pairs and calls
//! `Sink::write` once per pair. One sink instance exists per writer name and
//! is shared by every event that uses it.
//!
//! ```text
//! [Pipeline] --(destination, Bytes)--> [Arc<dyn Sink>] --> [Destination]
//! ```
//!
//! # Available Sinks
//!
//! | Sink | Purpose |
//! |------|---------|
//! | `nats` | Publish to a NATS subject |
//! | `stdout` | Debug output |
//! | `null` | Discard everything |
//!
//! # Example
//!
//! ```
//! use hookbus_sinks::{Sink, NullSink};
//! use bytes::Bytes;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let sink = NullSink::new();
//! sink.write("orders.created", Bytes::from_static(b"{}")).await.unwrap();
//! assert_eq!(sink.metrics().documents_written, 1);
//! # }
//! ```

use std::sync::Arc;

use hookbus_config::NatsConfig;

/// Null sink - discards all data
pub mod null;

/// Stdout sink - human-readable debug output
pub mod stdout;

/// NATS sink - core protocol publisher
pub mod nats;

mod common;

pub use common::{MetricsSnapshot, Sink, SinkError, SinkMetrics};
pub use nats::{NatsSink, NatsSinkConfig};
pub use null::NullSink;
pub use stdout::{StdoutConfig, StdoutSink};

/// Settings needed to construct any sink
#[derive(Debug, Clone, Default)]
pub struct SinkSettings {
    pub nats: NatsConfig,
    pub stdout: StdoutConfig,
}

/// Create a sink from its writer name
///
/// Network sinks are created disconnected; they connect on first write.
///
/// # Errors
///
/// `SinkError::Config` for an unknown writer name or invalid settings.
pub fn sink_by_name(name: &str, settings: &SinkSettings) -> Result<Arc<dyn Sink>, SinkError> {
    match name {
        "nats" => {
            let config = NatsSinkConfig::from_config(&settings.nats)?;
            Ok(Arc::new(NatsSink::new(config)))
        }
        "stdout" => Ok(Arc::new(StdoutSink::new(settings.stdout.clone()))),
        "null" => Ok(Arc::new(NullSink::new())),
        other => Err(SinkError::config(format!("unknown writer name {}", other))),
    }
}
