//! Event adaptation pipeline
//!
//! One `Pipeline` per configured event. It owns a decoder, the compiled
//! template set, a shared sink and the event's policy, and exposes a single
//! operation: `adapt(payload)`.
//!
//! # Dispatch
//!
//! The dispatch mode is resolved once, at construction:
//!
//! | singleInputEvent | singleOutputEvent | chrootPath | Mode |
//! |------------------|-------------------|------------|------|
//! | any | true | any | one render of the whole decoded value |
//! | false | false | any | one render task per record, paced by batch policy |
//! | true | false | set | not implemented |
//! | true | false | empty | invalid configuration (construction fails) |
//!
//! # Delivery
//!
//! ```text
//! records ──→ [render task]* ──→ unbounded queue ──→ consumer ──→ Sink::write (serial)
//! ```
//!
//! Render tasks run concurrently and push outputs as they finish; one
//! consumer drains the queue and writes each output in arrival order. A sink
//! failure is logged and delivery continues. Task failures are joined
//! fail-fast: the first error is kept, every task is still awaited, and
//! outputs already delivered stay delivered.

use std::collections::HashMap;
use std::sync::Arc;

use hookbus_config::EventConfig;
use hookbus_format::{Decoded, Decoder, FormatError, FormatOptions, InputMode, Record, decoder_by_name};
use hookbus_sinks::Sink;
use hookbus_template::{ExtensionRegistry, FunctionNamespace, TemplateError, TemplateSet};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::batch::BatchPolicy;
use crate::error::{PipelineError, Result};
use crate::metrics::{MetricsSnapshot, PipelineMetrics};
use crate::task::{Output, render};

/// Per-event behavior switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPolicy {
    pub input: InputMode,
    pub single_output: bool,
    pub chroot_path: String,
    pub batch: BatchPolicy,
}

impl EventPolicy {
    /// Resolve the policy of an event definition
    pub fn from_event(name: &str, event: &EventConfig) -> Self {
        Self {
            input: InputMode::from_single_flag(event.single_input_event),
            single_output: event.single_output_event,
            chroot_path: event.chroot_path.clone(),
            batch: BatchPolicy::from_event(name, event.batch_size, &event.batch_interval),
        }
    }
}

/// Shared resources a pipeline is built from
pub struct PipelineContext<'a> {
    pub extensions: &'a ExtensionRegistry,
    pub formats: &'a FormatOptions,
    /// Sink instances keyed by writer name
    pub sinks: &'a HashMap<String, Arc<dyn Sink>>,
}

/// What one invocation produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdaptSummary {
    /// Records decoded from the payload
    pub records: usize,
    /// Outputs rendered
    pub rendered: usize,
    /// Outputs the sink accepted
    pub delivered: usize,
    /// Outputs the sink rejected
    pub failed_writes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Dispatch {
    /// Render the whole decoded value once
    Whole,
    /// Render each record separately
    PerRecord,
    /// Iterate a nested collection of a single record
    Chroot(String),
}

impl Dispatch {
    fn resolve(event: &str, policy: &EventPolicy) -> Result<Self> {
        match (policy.input, policy.single_output) {
            (_, true) => Ok(Self::Whole),
            (InputMode::Many, false) => Ok(Self::PerRecord),
            (InputMode::Single, false) if policy.chroot_path.is_empty() => {
                Err(PipelineError::invalid_configuration(
                    event,
                    "multiple outputs from a single input require a chrootPath",
                ))
            }
            (InputMode::Single, false) => Ok(Self::Chroot(policy.chroot_path.clone())),
        }
    }
}

/// Event adaptation pipeline
pub struct Pipeline {
    name: String,
    decoder: Arc<dyn Decoder>,
    templates: Arc<TemplateSet>,
    sink: Arc<dyn Sink>,
    policy: EventPolicy,
    dispatch: Dispatch,
    metrics: PipelineMetrics,
}

impl Pipeline {
    /// Build the pipeline for the event mounted at `name`
    ///
    /// # Errors
    ///
    /// Unknown decoder or writer, extension load failures, template compile
    /// failures and invalid axis combinations.
    pub fn from_config(name: &str, event: &EventConfig, ctx: &PipelineContext<'_>) -> Result<Self> {
        let policy = EventPolicy::from_event(name, event);

        let decoder = decoder_by_name(&event.input_format, ctx.formats).map_err(|e| match e {
            FormatError::UnknownFormat(format) => PipelineError::UnknownFormat {
                event: name.to_string(),
                format,
            },
            other => other.into(),
        })?;

        let sink = ctx
            .sinks
            .get(&event.output_writer)
            .cloned()
            .ok_or_else(|| PipelineError::UnknownSink {
                event: name.to_string(),
                writer: event.output_writer.clone(),
            })?;

        let namespace = FunctionNamespace::build(ctx.extensions, &event.extended_functions)?;
        let templates =
            TemplateSet::compile(&event.output_template, &event.output_channel, &namespace)?;

        Self::new(name, decoder, templates, sink, policy)
    }

    /// Assemble a pipeline from already built parts
    pub fn new(
        name: impl Into<String>,
        decoder: Arc<dyn Decoder>,
        templates: TemplateSet,
        sink: Arc<dyn Sink>,
        policy: EventPolicy,
    ) -> Result<Self> {
        let name = name.into();
        let dispatch = Dispatch::resolve(&name, &policy)?;

        tracing::info!(
            event = %name,
            input_format = decoder.name(),
            writer = sink.name(),
            template = templates.document_name(),
            dispatch = ?dispatch,
            "pipeline ready"
        );

        Ok(Self {
            name,
            decoder,
            templates: Arc::new(templates),
            sink,
            policy,
            dispatch,
            metrics: PipelineMetrics::new(),
        })
    }

    /// Event path this pipeline serves
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> &EventPolicy {
        &self.policy
    }

    /// Name of the writer documents are delivered to
    pub fn writer(&self) -> &str {
        self.sink.name()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Decode `payload`, render every output and hand each to the sink
    ///
    /// Returns an error if decoding fails or any render task fails. Outputs
    /// rendered before a failure may already have been delivered.
    pub async fn adapt(&self, payload: &[u8]) -> Result<AdaptSummary> {
        self.metrics.record_invocation();

        let result = self.dispatch(payload).await;
        match &result {
            Ok(summary) => tracing::debug!(
                event = %self.name,
                records = summary.records,
                delivered = summary.delivered,
                failed_writes = summary.failed_writes,
                "event adapted"
            ),
            Err(e) => {
                self.metrics.record_failure();
                tracing::warn!(event = %self.name, error = %e, "failed to adapt event");
            }
        }
        result
    }

    async fn dispatch(&self, payload: &[u8]) -> Result<AdaptSummary> {
        let decoded = self.decoder.decode(payload, self.policy.input)?;
        let records = decoded.len();
        self.metrics.record_decoded(records as u64);

        let mut summary = match &self.dispatch {
            Dispatch::Whole => self.render_whole(decoded.into_value()).await?,
            Dispatch::PerRecord => {
                let records = match decoded {
                    Decoded::Many(records) => records,
                    Decoded::Single(record) => vec![record],
                };
                self.fan_out(records).await?
            }
            Dispatch::Chroot(path) => {
                return Err(PipelineError::not_implemented(
                    &self.name,
                    format!("iterating chrootPath '{}'", path),
                ));
            }
        };
        summary.records = records;
        Ok(summary)
    }

    /// Exactly one render against the whole value
    async fn render_whole(&self, data: Value) -> Result<AdaptSummary> {
        let output = render(&self.templates, &data)?;
        self.metrics.record_rendered();

        let mut summary = AdaptSummary {
            rendered: 1,
            ..Default::default()
        };
        if self.deliver(output).await {
            summary.delivered = 1;
        } else {
            summary.failed_writes = 1;
        }
        Ok(summary)
    }

    /// One render task per record; outputs are delivered as they arrive
    async fn fan_out(&self, records: Vec<Record>) -> Result<AdaptSummary> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Output>();

        let producer = self.run_tasks(records, tx);
        let consumer = async {
            let mut summary = AdaptSummary::default();
            while let Some(output) = rx.recv().await {
                if self.deliver(output).await {
                    summary.delivered += 1;
                } else {
                    summary.failed_writes += 1;
                }
            }
            summary
        };

        let (joined, mut summary) = tokio::join!(producer, consumer);
        match joined {
            Ok(rendered) => {
                summary.rendered = rendered;
                Ok(summary)
            }
            Err(e) => {
                if summary.delivered > 0 {
                    tracing::warn!(
                        event = %self.name,
                        delivered = summary.delivered,
                        "invocation failed after partial delivery"
                    );
                }
                Err(e)
            }
        }
    }

    /// Dispatch render tasks under the batch policy and join them fail-fast
    async fn run_tasks(
        &self,
        records: Vec<Record>,
        tx: mpsc::UnboundedSender<Output>,
    ) -> Result<usize> {
        let mut tasks = JoinSet::new();

        for (index, record) in records.into_iter().enumerate() {
            if let Some(pause) = self.policy.batch.delay_before(index) {
                tracing::trace!(event = %self.name, index, pause = ?pause, "batch full, pausing dispatch");
                tokio::time::sleep(pause).await;
            }

            let templates = Arc::clone(&self.templates);
            let tx = tx.clone();
            tasks.spawn(async move {
                let output = render(&templates, &Value::Object(record))?;
                // The consumer outlives every task.
                let _ = tx.send(output);
                Ok::<(), TemplateError>(())
            });
        }
        drop(tx);

        let mut first_error = None;
        let mut rendered = 0;
        while let Some(joined) = tasks.join_next().await {
            let error = match joined {
                Ok(Ok(())) => {
                    rendered += 1;
                    self.metrics.record_rendered();
                    continue;
                }
                Ok(Err(e)) => PipelineError::from(e),
                Err(e) => PipelineError::TaskFailed(e.to_string()),
            };
            if first_error.is_none() {
                first_error = Some(error);
            } else {
                tracing::debug!(event = %self.name, error = %error, "additional render task failure");
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(rendered),
        }
    }

    /// Write one output; failures are logged, never retried
    async fn deliver(&self, output: Output) -> bool {
        match self.sink.write(&output.destination, output.document).await {
            Ok(()) => {
                self.metrics.record_delivered();
                true
            }
            Err(e) => {
                self.metrics.record_sink_error();
                tracing::error!(
                    event = %self.name,
                    writer = self.sink.name(),
                    destination = %output.destination,
                    error = %e,
                    "failed to write document"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("decoder", &self.decoder.name())
            .field("writer", &self.sink.name())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
