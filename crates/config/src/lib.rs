//! hookbus configuration
//!
//! TOML-based configuration loading with sensible defaults. Only the
//! `[events]` table is required; everything else can be omitted.
//!
//! # Parsing
//!
//! ```
//! use hookbus_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str(r#"
//! [events."/hook"]
//! inputFormat = "json"
//! outputTemplate = "hook.tmpl"
//! outputWriter = "stdout"
//! outputChannel = "hooks"
//! "#).unwrap();
//! assert_eq!(config.events.len(), 1);
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [server]
//! port = 8080
//!
//! [log]
//! level = "debug"
//!
//! [nats]
//! url = "nats://127.0.0.1:4222"
//!
//! [events."/github"]
//! inputFormat = "json"
//! singleInputEvent = true
//! singleOutputEvent = true
//! outputTemplate = "templates/github.tmpl"
//! outputWriter = "nats"
//! outputChannel = "github.{{ action }}"
//! ```

mod error;
mod events;
mod formats;
mod logging;
mod nats;
mod server;
mod validation;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use events::{
    EventConfig, KNOWN_INPUT_FORMATS, KNOWN_OUTPUT_WRITERS, is_known_input_format,
    is_known_output_writer,
};
pub use formats::CsvConfig;
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use nats::NatsConfig;
pub use server::{DebugConfig, ServerConfig};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Request body capture
    pub debug: DebugConfig,

    /// Logging configuration
    pub log: LogConfig,

    /// Connection settings for the `nats` writer
    pub nats: NatsConfig,

    /// Options for the `csv` decoder
    pub csv: CsvConfig,

    /// Event definitions keyed by inbound path
    pub events: BTreeMap<String, EventConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Distinct writer names referenced by the configured events
    pub fn referenced_writers(&self) -> Vec<&str> {
        let mut writers: Vec<&str> = self
            .events
            .values()
            .map(|event| event.output_writer.as_str())
            .collect();
        writers.sort_unstable();
        writers.dedup();
        writers
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[server]
address = "127.0.0.1"
port = 9000

[debug]
enabled = true
directory = "/tmp/hookbus"

[log]
level = "debug"

[nats]
url = "nats://nats:4222"
write_timeout = "1s"

[csv]
separator = ";"

[events."/github"]
inputFormat = "json"
singleInputEvent = true
singleOutputEvent = true
outputTemplate = "templates/github.tmpl"
outputWriter = "nats"
outputChannel = "github.{{ action }}"

[events."/inventory"]
inputFormat = "csv"
outputTemplate = "templates/item.tmpl"
outputWriter = "stdout"
outputChannel = "inventory"
batchSize = 10
batchInterval = "100ms"
"#;
        let config = Config::from_str(toml).unwrap();

        assert_eq!(config.server.bind_address(), "127.0.0.1:9000");
        assert!(config.debug.enabled);
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.nats.url, "nats://nats:4222");
        assert_eq!(config.csv.separator_byte(), Some(b';'));
        assert_eq!(config.events.len(), 2);

        let github = &config.events["/github"];
        assert!(github.single_input_event);
        assert!(github.single_output_event);

        let inventory = &config.events["/inventory"];
        assert_eq!(inventory.batch_size, 10);
        assert_eq!(config.referenced_writers(), vec!["nats", "stdout"]);
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_str("invalid { toml");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[events.\"/a\"]\ninputFormat = \"yaml\"\noutputTemplate = \"a.tmpl\"\noutputWriter = \"null\"\noutputChannel = \"a\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.events["/a"].input_format, "yaml");
    }

    #[test]
    fn test_from_missing_file() {
        let err = Config::from_file("/nonexistent/hookbus.toml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }
}
