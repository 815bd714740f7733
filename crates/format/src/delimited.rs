//! CSV decoder
//!
//! The first row is the header; every following row becomes one record
//! mapping header names to the row's string fields. A CSV body is always a
//! sequence, so `decode_single` is not supported.

use serde_json::Value;

use crate::error::FormatError;
use crate::{Decoder, Record, Result};

const FORMAT: &str = "csv";

/// Decodes delimiter-separated bodies with a header row
#[derive(Debug, Clone, Copy)]
pub struct CsvDecoder {
    separator: u8,
}

impl CsvDecoder {
    pub fn new(separator: u8) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> u8 {
        self.separator
    }

    fn reader<'a>(&self, payload: &'a [u8]) -> csv::Reader<&'a [u8]> {
        csv::ReaderBuilder::new()
            .delimiter(self.separator)
            .has_headers(true)
            .from_reader(payload)
    }
}

impl Default for CsvDecoder {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl Decoder for CsvDecoder {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn decode_single(&self, _payload: &[u8]) -> Result<Record> {
        Err(FormatError::decode(
            FORMAT,
            "cannot decode a single record from csv input",
        ))
    }

    fn decode_many(&self, payload: &[u8]) -> Result<Vec<Record>> {
        let mut reader = self.reader(payload);

        let headers = reader
            .headers()
            .map_err(|e| FormatError::decode(FORMAT, e.to_string()))?
            .clone();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| FormatError::decode(FORMAT, e.to_string()))?;
            let record: Record = headers
                .iter()
                .zip(row.iter())
                .map(|(name, field)| (name.to_string(), Value::String(field.to_string())))
                .collect();
            records.push(record);
        }

        if records.is_empty() {
            return Err(FormatError::empty(FORMAT));
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_become_records() {
        let payload = b"sku,qty\nA-1,3\nB-2,7\n";
        let records = CsvDecoder::default().decode_many(payload).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["sku"], json!("A-1"));
        assert_eq!(records[0]["qty"], json!("3"));
        assert_eq!(records[1]["sku"], json!("B-2"));
    }

    #[test]
    fn test_custom_separator() {
        let payload = b"first;last\nAda;Lovelace\n";
        let records = CsvDecoder::new(b';').decode_many(payload).unwrap();
        assert_eq!(records[0]["last"], json!("Lovelace"));
    }

    #[test]
    fn test_quoted_fields() {
        let payload = b"name,note\n\"Doe, Jane\",\"said \"\"hi\"\"\"\n";
        let records = CsvDecoder::default().decode_many(payload).unwrap();
        assert_eq!(records[0]["name"], json!("Doe, Jane"));
        assert_eq!(records[0]["note"], json!("said \"hi\""));
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = CsvDecoder::default().decode_many(b"a,b\n").unwrap_err();
        assert!(matches!(err, FormatError::EmptyInput { format: "csv" }));
    }

    #[test]
    fn test_empty_body_is_empty() {
        let err = CsvDecoder::default().decode_many(b"").unwrap_err();
        assert!(matches!(err, FormatError::EmptyInput { .. }));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let err = CsvDecoder::default()
            .decode_many(b"a,b\n1,2\n3\n")
            .unwrap_err();
        assert!(matches!(err, FormatError::Decode { .. }));
    }

    #[test]
    fn test_single_unsupported() {
        let err = CsvDecoder::default().decode_single(b"a\n1\n").unwrap_err();
        assert!(err.to_string().contains("single record"));
    }
}
