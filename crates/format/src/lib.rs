//! hookbus - Format
//!
//! Decoders turn a raw request body into structured records.
//!
//! # Contract
//!
//! Every decoder offers two entry points and a pipeline only ever calls the
//! one matching its input mode:
//!
//! - `decode_single` - the payload is exactly one object
//! - `decode_many` - the payload is a non-empty sequence of objects
//!
//! ```text
//! bytes ──→ Decoder ──→ Decoded::Single(Record)
//!                   └─→ Decoded::Many(Vec<Record>)
//! ```
//!
//! An empty sequence is an error (`FormatError::EmptyInput`), never an empty
//! success.
//!
//! # Example
//!
//! ```
//! use hookbus_format::{decoder_by_name, FormatOptions, InputMode, Decoded};
//!
//! let decoder = decoder_by_name("json", &FormatOptions::default()).unwrap();
//! let decoded = decoder.decode(br#"[{"a":1},{"a":2}]"#, InputMode::Many).unwrap();
//! assert_eq!(decoded.len(), 2);
//! ```

mod delimited;
mod error;
mod json;
mod yaml;

use std::sync::Arc;

use serde_json::Value;

pub use delimited::CsvDecoder;
pub use error::{FormatError, Result};
pub use json::JsonDecoder;
pub use yaml::YamlDecoder;

/// One structured record: a string-keyed mapping
pub type Record = serde_json::Map<String, Value>;

/// Which decoder entry point a pipeline uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Single,
    Many,
}

impl InputMode {
    pub fn from_single_flag(single: bool) -> Self {
        if single { Self::Single } else { Self::Many }
    }
}

/// Result of decoding, tagged by the mode that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Single(Record),
    Many(Vec<Record>),
}

impl Decoded {
    /// Number of records
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(records) => records.len(),
        }
    }

    /// Always false for values produced by a decoder
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The decoded data as one value: the object, or the array of objects
    pub fn into_value(self) -> Value {
        match self {
            Self::Single(record) => Value::Object(record),
            Self::Many(records) => Value::Array(records.into_iter().map(Value::Object).collect()),
        }
    }
}

/// Payload decoder
///
/// Both operations are pure functions of the payload and may be called
/// concurrently.
pub trait Decoder: Send + Sync {
    /// Format name used in configuration
    fn name(&self) -> &'static str;

    /// Decode a payload holding exactly one object
    fn decode_single(&self, payload: &[u8]) -> Result<Record>;

    /// Decode a payload holding a non-empty sequence of objects
    fn decode_many(&self, payload: &[u8]) -> Result<Vec<Record>>;

    /// Decode with the entry point selected by `mode`
    fn decode(&self, payload: &[u8], mode: InputMode) -> Result<Decoded> {
        match mode {
            InputMode::Single => self.decode_single(payload).map(Decoded::Single),
            InputMode::Many => self.decode_many(payload).map(Decoded::Many),
        }
    }
}

/// Options shared by decoder constructors
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// CSV field separator
    pub csv_separator: u8,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { csv_separator: b',' }
    }
}

/// Create a decoder from its configuration name
///
/// # Errors
///
/// `FormatError::UnknownFormat` if no decoder has this name.
pub fn decoder_by_name(name: &str, options: &FormatOptions) -> Result<Arc<dyn Decoder>> {
    match name {
        "json" => Ok(Arc::new(JsonDecoder)),
        "yaml" => Ok(Arc::new(YamlDecoder)),
        "csv" => Ok(Arc::new(CsvDecoder::new(options.csv_separator))),
        other => Err(FormatError::UnknownFormat(other.to_string())),
    }
}

/// Require a decoded value to be one object
pub(crate) fn expect_record(format: &'static str, value: Value) -> Result<Record> {
    match value {
        Value::Object(record) => Ok(record),
        other => Err(FormatError::decode(
            format,
            format!("expected an object, found {}", kind(&other)),
        )),
    }
}

/// Require a decoded value to be a non-empty sequence of objects
pub(crate) fn expect_records(format: &'static str, value: Value) -> Result<Vec<Record>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(FormatError::decode(
                format,
                format!("expected a sequence, found {}", kind(&other)),
            ));
        }
    };

    if items.is_empty() {
        return Err(FormatError::empty(format));
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(FormatError::decode(
                format,
                format!("element {} is {}, expected an object", i, kind(&other)),
            )),
        })
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "an object",
    }
}
