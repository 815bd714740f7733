//! Event definitions
//!
//! One event binds an inbound HTTP path to a decoder, two templates and a
//! writer. Keys keep the camelCase names used by existing deployments.
//!
//! # Example
//!
//! ```toml
//! [events."/orders"]
//! inputFormat = "json"
//! outputTemplate = "templates/order.tmpl"
//! outputWriter = "nats"
//! outputChannel = "orders.{{ region }}"
//! batchSize = 50
//! batchInterval = "250ms"
//!
//! [events."/orders".extendedFunctions]
//! username = ["Username"]
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

/// Input formats understood by the decoders
pub const KNOWN_INPUT_FORMATS: &[&str] = &["json", "yaml", "csv"];

/// Output writers that can be named in `outputWriter`
pub const KNOWN_OUTPUT_WRITERS: &[&str] = &["nats", "stdout", "null"];

/// Check if an input format is known
pub fn is_known_input_format(name: &str) -> bool {
    KNOWN_INPUT_FORMATS.contains(&name)
}

/// Check if an output writer is known
pub fn is_known_output_writer(name: &str) -> bool {
    KNOWN_OUTPUT_WRITERS.contains(&name)
}

/// Configuration of a single event pipeline
///
/// Immutable once loaded. `batch_interval` is kept as the raw string: the
/// pipeline parses it exactly once when it is constructed and falls back to
/// one second when it is malformed.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct EventConfig {
    /// Decoder name (json, yaml, csv)
    pub input_format: String,

    /// Path to the document template file
    pub output_template: String,

    /// Writer name (nats, stdout, null)
    pub output_writer: String,

    /// Inline template rendered into the destination (e.g. a NATS subject)
    pub output_channel: String,

    /// Payload decodes to exactly one object instead of a sequence
    pub single_input_event: bool,

    /// Exactly one document is produced per request
    pub single_output_event: bool,

    /// Key path of a nested collection to iterate for single-input events
    pub chroot_path: String,

    /// Extension module name → functions to import from it
    pub extended_functions: BTreeMap<String, Vec<String>>,

    /// Documents rendered per scheduling group; 0 disables pacing
    pub batch_size: i64,

    /// Pause between scheduling groups (humantime, e.g. "500ms")
    pub batch_interval: String,
}

impl EventConfig {
    /// Whether dispatch pacing is active
    pub fn batching_enabled(&self) -> bool {
        self.batch_size > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_event() {
        let toml = r#"
inputFormat = "json"
outputTemplate = "templates/order.tmpl"
outputWriter = "nats"
outputChannel = "orders.{{ region }}"
singleInputEvent = false
singleOutputEvent = false
chrootPath = ""
batchSize = 50
batchInterval = "250ms"

[extendedFunctions]
username = ["Username"]
"#;
        let event: EventConfig = toml::from_str(toml).unwrap();
        assert_eq!(event.input_format, "json");
        assert_eq!(event.output_template, "templates/order.tmpl");
        assert_eq!(event.output_writer, "nats");
        assert_eq!(event.output_channel, "orders.{{ region }}");
        assert!(!event.single_input_event);
        assert!(!event.single_output_event);
        assert_eq!(event.batch_size, 50);
        assert_eq!(event.batch_interval, "250ms");
        assert_eq!(
            event.extended_functions.get("username"),
            Some(&vec!["Username".to_string()])
        );
        assert!(event.batching_enabled());
    }

    #[test]
    fn test_defaults_disable_batching() {
        let event: EventConfig = toml::from_str("inputFormat = \"yaml\"").unwrap();
        assert_eq!(event.batch_size, 0);
        assert!(event.batch_interval.is_empty());
        assert!(event.extended_functions.is_empty());
        assert!(!event.batching_enabled());
    }

    #[test]
    fn test_known_names() {
        assert!(is_known_input_format("csv"));
        assert!(!is_known_input_format("xml"));
        assert!(is_known_output_writer("nats"));
        assert!(!is_known_output_writer("kafka"));
    }
}
