//! Tests for common sink types and utilities

use crate::{SinkError, SinkMetrics};

#[test]
fn test_metrics_new() {
    let snapshot = SinkMetrics::new().snapshot();

    assert_eq!(snapshot.documents_written, 0);
    assert_eq!(snapshot.bytes_written, 0);
    assert_eq!(snapshot.write_errors, 0);
    assert_eq!(snapshot.connects, 0);
}

#[test]
fn test_metrics_tracking() {
    let metrics = SinkMetrics::new();

    metrics.document_written(100);
    metrics.document_written(250);
    metrics.write_error();
    metrics.connected();

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.documents_written, 2);
    assert_eq!(snapshot.bytes_written, 350);
    assert_eq!(snapshot.write_errors, 1);
    assert_eq!(snapshot.connects, 1);
}

#[test]
fn test_error_display() {
    let err = SinkError::connection("127.0.0.1:4222", "refused");
    assert_eq!(err.to_string(), "connection to 127.0.0.1:4222 failed: refused");

    let err = SinkError::Timeout { operation: "publish" };
    assert_eq!(err.to_string(), "publish timed out");

    let err = SinkError::Closed("nats".into());
    assert!(err.to_string().contains("closed"));

    let err = SinkError::config("empty subject");
    assert!(err.to_string().contains("empty subject"));
}

#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
    let err: SinkError = io.into();
    assert!(matches!(err, SinkError::Io(_)));
}
