//! hookbus - Sources
//!
//! Inbound transports that feed request bodies to event pipelines.
//!
//! # Available Sources
//!
//! - **HTTP** - Webhook receiver; the request path selects the pipeline
//!
//! # Example
//!
//! ```ignore
//! use hookbus_sources::http::{HttpSource, HttpSourceConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = HttpSourceConfig::from_config(&config.server, &config.debug);
//! let source = HttpSource::new(config, pipelines);
//! source.run(CancellationToken::new()).await?;
//! ```

pub mod http;

pub use http::{HttpMetricsSnapshot, HttpSource, HttpSourceConfig, HttpSourceError};
