//! YAML decoder

use serde_json::Value;

use crate::error::FormatError;
use crate::{Decoder, Record, Result, expect_record, expect_records};

const FORMAT: &str = "yaml";

/// Decodes YAML bodies into the same record model as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDecoder;

impl YamlDecoder {
    fn parse(payload: &[u8]) -> Result<Value> {
        serde_yaml::from_slice(payload).map_err(|e| FormatError::decode(FORMAT, e.to_string()))
    }
}

impl Decoder for YamlDecoder {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn decode_single(&self, payload: &[u8]) -> Result<Record> {
        expect_record(FORMAT, Self::parse(payload)?)
    }

    fn decode_many(&self, payload: &[u8]) -> Result<Vec<Record>> {
        expect_records(FORMAT, Self::parse(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_mapping() {
        let record = YamlDecoder
            .decode_single(b"name: ada\ntags:\n  - admin\n  - ops\n")
            .unwrap();
        assert_eq!(record["name"], json!("ada"));
        assert_eq!(record["tags"], json!(["admin", "ops"]));
    }

    #[test]
    fn test_many_sequence() {
        let records = YamlDecoder
            .decode_many(b"- id: 1\n- id: 2\n")
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["id"], json!(2));
    }

    #[test]
    fn test_many_empty_sequence() {
        let err = YamlDecoder.decode_many(b"[]").unwrap_err();
        assert!(matches!(err, FormatError::EmptyInput { .. }));
    }

    #[test]
    fn test_malformed() {
        let err = YamlDecoder.decode_single(b"key: [unclosed").unwrap_err();
        assert!(matches!(err, FormatError::Decode { format: "yaml", .. }));
    }
}
