//! hookbus - Pipeline
//!
//! The event adaptation pipeline: decode a payload, render documents and
//! destinations through templates, and deliver them to a sink.
//!
//! # Architecture
//!
//! ```text
//!                    ┌─ singleOutputEvent ──→ render(whole value) ──────────┐
//! payload ──→ Decoder┤                                                       ├──→ Sink
//!                    └─ many records ──→ [render task]* ──→ queue ──→ consumer┘
//!                                         (paced by BatchPolicy)
//! ```
//!
//! One `Pipeline` exists per configured event and is shared by every request
//! to that event. The pipeline holds no per-invocation state, so concurrent
//! `adapt` calls are independent.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use hookbus_format::{JsonDecoder, InputMode};
//! use hookbus_pipeline::{BatchPolicy, EventPolicy, Pipeline};
//! use hookbus_sinks::{NullSink, Sink};
//! use hookbus_template::{FunctionNamespace, TemplateSet};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let templates = TemplateSet::from_sources(
//!     "order.tmpl",
//!     "{{ id }}",
//!     "orders.{{ region }}",
//!     &FunctionNamespace::defaults(),
//! ).unwrap();
//!
//! let sink = Arc::new(NullSink::new());
//! let policy = EventPolicy {
//!     input: InputMode::Many,
//!     single_output: false,
//!     chroot_path: String::new(),
//!     batch: BatchPolicy::Unbounded,
//! };
//! let pipeline = Pipeline::new("/orders", Arc::new(JsonDecoder), templates, sink.clone(), policy).unwrap();
//!
//! let summary = pipeline
//!     .adapt(br#"[{"id":1,"region":"eu"},{"id":2,"region":"us"}]"#)
//!     .await
//!     .unwrap();
//! assert_eq!(summary.delivered, 2);
//! assert_eq!(sink.metrics().documents_written, 2);
//! # }
//! ```

mod batch;
mod error;
mod metrics;
mod pipeline;
mod task;

pub use batch::{BatchPolicy, DEFAULT_BATCH_INTERVAL};
pub use error::{PipelineError, Result};
pub use metrics::{MetricsSnapshot, PipelineMetrics};
pub use pipeline::{AdaptSummary, EventPolicy, Pipeline, PipelineContext};
pub use task::{Output, render};
