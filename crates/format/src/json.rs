//! JSON decoder

use serde_json::Value;

use crate::{Decoder, Record, Result, expect_record, expect_records};
use crate::error::FormatError;

const FORMAT: &str = "json";

/// Decodes `application/json` bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl JsonDecoder {
    fn parse(payload: &[u8]) -> Result<Value> {
        serde_json::from_slice(payload).map_err(|e| FormatError::decode(FORMAT, e.to_string()))
    }
}

impl Decoder for JsonDecoder {
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
    fn test_single_object() {
        let record = JsonDecoder
            .decode_single(br#"{"user":{"name":"ada"},"count":3}"#)
            .unwrap();
        assert_eq!(record["count"], json!(3));
        assert_eq!(record["user"]["name"], json!("ada"));
    }

    #[test]
    fn test_single_rejects_array() {
        let err = JsonDecoder.decode_single(br#"[{"a":1}]"#).unwrap_err();
        assert!(matches!(err, FormatError::Decode { .. }));
    }

    #[test]
    fn test_many_preserves_order() {
        let records = JsonDecoder
            .decode_many(br#"[{"a":1},{"a":2},{"a":3}]"#)
            .unwrap();
        let values: Vec<_> = records.iter().map(|r| r["a"].clone()).collect();
        assert_eq!(values, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_many_empty_array() {
        let err = JsonDecoder.decode_many(b"[]").unwrap_err();
        assert!(matches!(err, FormatError::EmptyInput { format: "json" }));
    }

    #[test]
    fn test_many_rejects_object() {
        let err = JsonDecoder.decode_many(br#"{"a":1}"#).unwrap_err();
        assert!(matches!(err, FormatError::Decode { .. }));
    }

    #[test]
    fn test_malformed() {
        assert!(JsonDecoder.decode_single(b"{\"a\":").is_err());
        assert!(JsonDecoder.decode_many(b"").is_err());
    }
}
