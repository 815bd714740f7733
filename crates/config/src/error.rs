//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// No event is configured, nothing would ever be served
    #[error("no events are configured - at least one [events.\"/path\"] section is required")]
    NoEvents,

    /// Validation error - required field missing
    #[error("{component} '{name}' is missing required field '{field}'")]
    MissingField {
        /// Component type (e.g., "event", "csv")
        component: &'static str,
        /// Name of the component
        name: String,
        /// Missing field name
        field: &'static str,
    },

    /// Validation error - invalid value
    #[error("{component} '{name}' has invalid {field}: {message}")]
    InvalidValue {
        /// Component type
        component: &'static str,
        /// Name of the component
        name: String,
        /// Field name
        field: &'static str,
        /// Error message
        message: String,
    },
}

impl ConfigError {
    /// Create a MissingField error
    pub fn missing_field(
        component: &'static str,
        name: impl Into<String>,
        field: &'static str,
    ) -> Self {
        Self::MissingField {
            component,
            name: name.into(),
            field,
        }
    }

    /// Create an InvalidValue error
    pub fn invalid_value(
        component: &'static str,
        name: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            component,
            name: name.into(),
            field,
            message: message.into(),
        }
    }
}
