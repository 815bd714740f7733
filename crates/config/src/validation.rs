//! Configuration validation
//!
//! Validates config consistency:
//! - At least one event is configured
//! - Event paths are absolute
//! - Input formats and output writers are known
//! - Required event fields are present
//! - The CSV separator is a single ASCII character
//!
//! Axis combinations (single input with multiple outputs) are checked when
//! the pipeline is built, not here.

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::events::{
    EventConfig, KNOWN_INPUT_FORMATS, KNOWN_OUTPUT_WRITERS, is_known_input_format,
    is_known_output_writer,
};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_csv(config)?;
    validate_events(config)?;
    Ok(())
}

fn validate_csv(config: &Config) -> Result<()> {
    if config.csv.separator_byte().is_none() {
        return Err(ConfigError::invalid_value(
            "csv",
            "csv",
            "separator",
            format!(
                "'{}' must be exactly one ASCII character",
                config.csv.separator
            ),
        ));
    }
    Ok(())
}

fn validate_events(config: &Config) -> Result<()> {
    if config.events.is_empty() {
        return Err(ConfigError::NoEvents);
    }

    for (path, event) in &config.events {
        validate_event(path, event)?;
    }

    Ok(())
}

fn validate_event(path: &str, event: &EventConfig) -> Result<()> {
    if !path.starts_with('/') {
        return Err(ConfigError::invalid_value(
            "event",
            path,
            "path",
            "must start with '/'",
        ));
    }

    if event.input_format.is_empty() {
        return Err(ConfigError::missing_field("event", path, "inputFormat"));
    }
    if !is_known_input_format(&event.input_format) {
        return Err(ConfigError::invalid_value(
            "event",
            path,
            "inputFormat",
            format!(
                "unknown format '{}', available: [{}]",
                event.input_format,
                KNOWN_INPUT_FORMATS.join(", ")
            ),
        ));
    }

    if event.output_writer.is_empty() {
        return Err(ConfigError::missing_field("event", path, "outputWriter"));
    }
    if !is_known_output_writer(&event.output_writer) {
        return Err(ConfigError::invalid_value(
            "event",
            path,
            "outputWriter",
            format!(
                "unknown writer '{}', available: [{}]",
                event.output_writer,
                KNOWN_OUTPUT_WRITERS.join(", ")
            ),
        ));
    }

    if event.output_template.is_empty() {
        return Err(ConfigError::missing_field("event", path, "outputTemplate"));
    }

    if event.batch_size < 0 {
        return Err(ConfigError::invalid_value(
            "event",
            path,
            "batchSize",
            "must be >= 0",
        ));
    }

    for (module, functions) in &event.extended_functions {
        if functions.is_empty() {
            return Err(ConfigError::invalid_value(
                "event",
                path,
                "extendedFunctions",
                format!("module '{}' imports no functions", module),
            ));
        }
    }

    Ok(())
}
