//! Input format options

use serde::Deserialize;

/// CSV decoder options
///
/// ```toml
/// [csv]
/// separator = ";"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Field separator, exactly one ASCII character
    /// Default: ","
    pub separator: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            separator: ",".into(),
        }
    }
}

impl CsvConfig {
    /// Separator as a byte, if it is a single ASCII character
    pub fn separator_byte(&self) -> Option<u8> {
        match self.separator.as_bytes() {
            [b] if b.is_ascii() => Some(*b),
            _ => None,
        }
    }
}
