//! NATS writer configuration

use serde::Deserialize;
use std::time::Duration;

/// Connection settings for the `nats` output writer
///
/// # Example
///
/// ```toml
/// [nats]
/// url = "nats://nats.internal:4222"
/// connection_timeout = "5s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NatsConfig {
    /// Server address, with or without the `nats://` scheme
    /// Default: "127.0.0.1:4222"
    pub url: String,

    /// Client name announced in the CONNECT handshake
    /// Default: "hookbus"
    pub name: String,

    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub connection_timeout: Duration,

    /// Timeout for a single publish
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub write_timeout: Duration,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:4222".into(),
            name: "hookbus".into(),
            connection_timeout: Duration::from_secs(10),
            write_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NatsConfig::default();
        assert_eq!(config.url, "127.0.0.1:4222");
        assert_eq!(config.connection_timeout, Duration::from_secs(10));
        assert_eq!(config.write_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_humantime_durations() {
        let config: NatsConfig = toml::from_str(
            r#"
url = "nats://10.0.0.1:4222"
connection_timeout = "750ms"
write_timeout = "2s"
"#,
        )
        .unwrap();
        assert_eq!(config.url, "nats://10.0.0.1:4222");
        assert_eq!(config.connection_timeout, Duration::from_millis(750));
        assert_eq!(config.write_timeout, Duration::from_secs(2));
    }
}
