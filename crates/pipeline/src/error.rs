//! Pipeline error types
//!
//! Construction errors and per-invocation errors of the adaptation pipeline.

use hookbus_format::FormatError;
use hookbus_template::TemplateError;
use thiserror::Error;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Payload could not be decoded or held no records
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Template compile, extension load or render failure
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Event names a decoder that does not exist
    #[error("event '{event}': unknown input format '{format}'")]
    UnknownFormat { event: String, format: String },

    /// Event names a writer that was not provided
    #[error("event '{event}': unknown output writer '{writer}'")]
    UnknownSink { event: String, writer: String },

    /// Axis combination that can never produce output
    #[error("invalid configuration for event '{event}': {message}")]
    InvalidConfiguration { event: String, message: String },

    /// Reserved behavior that is not available yet
    #[error("event '{event}': {feature} is not implemented")]
    NotImplemented { event: String, feature: String },

    /// A render task panicked or was cancelled
    #[error("render task failed: {0}")]
    TaskFailed(String),
}

impl PipelineError {
    /// Create an invalid configuration error
    pub fn invalid_configuration(event: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            event: event.into(),
            message: message.into(),
        }
    }

    /// Create a not implemented error
    pub fn not_implemented(event: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::NotImplemented {
            event: event.into(),
            feature: feature.into(),
        }
    }

    /// The payload itself is at fault (malformed or empty)
    pub fn is_payload_error(&self) -> bool {
        matches!(self, Self::Format(e) if e.is_payload_error())
    }

    /// A template failed while rendering
    pub fn is_render_error(&self) -> bool {
        matches!(self, Self::Template(TemplateError::Execution { .. }))
    }

    /// The event definition can never succeed as configured
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. } | Self::NotImplemented { .. }
        )
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
