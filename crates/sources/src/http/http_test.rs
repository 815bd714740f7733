//! HTTP source tests

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hookbus_format::{InputMode, JsonDecoder};
use hookbus_pipeline::{BatchPolicy, EventPolicy, Pipeline};
use hookbus_sinks::{NatsSink, NatsSinkConfig, NullSink, Sink};
use hookbus_template::{FunctionNamespace, TemplateSet};
use tower::ServiceExt;

use super::*;

fn policy(single_input: bool, single_output: bool) -> EventPolicy {
    EventPolicy {
        input: InputMode::from_single_flag(single_input),
        single_output,
        chroot_path: String::new(),
        batch: BatchPolicy::Unbounded,
    }
}

fn pipeline(path: &str, document: &str, policy: EventPolicy, sink: Arc<dyn Sink>) -> Arc<Pipeline> {
    let templates =
        TemplateSet::from_sources("doc.tmpl", document, "events.{{ kind }}", &FunctionNamespace::defaults())
            .unwrap();
    Arc::new(Pipeline::new(path, Arc::new(JsonDecoder), templates, sink, policy).unwrap())
}

/// Source with `/orders` (many → many) and `/user` (single → single)
struct TestContext {
    source: HttpSource,
    sink: Arc<NullSink>,
}

fn test_source(config: HttpSourceConfig) -> TestContext {
    let sink = Arc::new(NullSink::new());
    let mut pipelines = HashMap::new();
    pipelines.insert(
        "/orders".to_string(),
        pipeline("/orders", "{{ id }}", policy(false, false), sink.clone()),
    );
    pipelines.insert(
        "/user".to_string(),
        pipeline("/user", "{{ name }}", policy(true, true), sink.clone()),
    );

    let mut chroot = policy(true, false);
    chroot.chroot_path = "items".into();
    pipelines.insert(
        "/nested".to_string(),
        pipeline("/nested", "{{ id }}", chroot, sink.clone()),
    );

    TestContext {
        source: HttpSource::new(config, pipelines),
        sink,
    }
}

fn post(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn send(ctx: &TestContext, request: Request<Body>) -> (StatusCode, String) {
    let response = ctx.source.router().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&body).into_owned())
}

// =============================================================================
// Successful requests
// =============================================================================

#[tokio::test]
async fn test_post_adapts_event() {
    let ctx = test_source(HttpSourceConfig::default());

    let (status, body) = send(
        &ctx,
        post("/orders", r#"[{"id":1,"kind":"a"},{"id":2,"kind":"b"}]"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
    assert_eq!(ctx.sink.metrics().documents_written, 2);

    let metrics = ctx.source.metrics().snapshot();
    assert_eq!(metrics.requests_received, 1);
    assert_eq!(metrics.requests_accepted, 1);
    assert_eq!(metrics.requests_rejected, 0);
    assert!(metrics.bytes_received > 0);
}

#[tokio::test]
async fn test_single_event() {
    let ctx = test_source(HttpSourceConfig::default());

    let (status, _) = send(&ctx, post("/user", r#"{"name":"ada","kind":"signup"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctx.sink.metrics().documents_written, 1);
}

#[tokio::test]
async fn test_sink_failure_still_ok() {
    let nats = NatsSinkConfig::new("127.0.0.1:1")
        .unwrap()
        .with_connection_timeout(Duration::from_millis(500));
    let sink: Arc<dyn Sink> = Arc::new(NatsSink::new(nats));

    let mut pipelines = HashMap::new();
    pipelines.insert(
        "/user".to_string(),
        pipeline("/user", "{{ name }}", policy(true, true), sink.clone()),
    );
    let source = HttpSource::new(HttpSourceConfig::default(), pipelines);

    let response = source
        .router()
        .oneshot(post("/user", r#"{"name":"ada","kind":"signup"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(sink.metrics().write_errors, 1);
}

// =============================================================================
// Routing errors
// =============================================================================

#[tokio::test]
async fn test_non_post_is_rejected() {
    let ctx = test_source(HttpSourceConfig::default());

    let request = Request::builder()
        .method("GET")
        .uri("/orders")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&ctx, request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(ctx.sink.metrics().documents_written, 0);
    assert_eq!(ctx.source.metrics().snapshot().requests_rejected, 1);
}

#[tokio::test]
async fn test_unknown_path() {
    let ctx = test_source(HttpSourceConfig::default());

    let (status, body) = send(&ctx, post("/missing", "{}")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("/missing"));
}

#[tokio::test]
async fn test_payload_too_large() {
    let config = HttpSourceConfig {
        max_payload_size: 16,
        ..Default::default()
    };
    let ctx = test_source(config);

    let (status, _) = send(
        &ctx,
        post("/orders", r#"[{"id":1,"kind":"a"},{"id":2,"kind":"b"}]"#),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(ctx.sink.metrics().documents_written, 0);
}

// =============================================================================
// Adaptation errors
// =============================================================================

#[tokio::test]
async fn test_malformed_payload_is_bad_request() {
    let ctx = test_source(HttpSourceConfig::default());

    let (status, _) = send(&ctx, post("/orders", "[{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_sequence_is_bad_request() {
    let ctx = test_source(HttpSourceConfig::default());

    let (status, body) = send(&ctx, post("/orders", "[]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("no records"));
}

#[tokio::test]
async fn test_render_failure_is_unprocessable() {
    let ctx = test_source(HttpSourceConfig::default());

    let (status, body) = send(&ctx, post("/user", r#"{"kind":"signup"}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.contains("doc.tmpl"));
}

#[tokio::test]
async fn test_chroot_is_not_implemented() {
    let ctx = test_source(HttpSourceConfig::default());

    let (status, _) = send(&ctx, post("/nested", r#"{"items":[{"id":1}]}"#)).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
}

// =============================================================================
// Capture
// =============================================================================

#[tokio::test]
async fn test_request_body_capture() {
    let dir = tempfile::tempdir().unwrap();
    let config = HttpSourceConfig {
        capture_directory: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let ctx = test_source(config);

    let (status, _) = send(&ctx, post("/user", r#"{"name":"ada","kind":"signup"}"#)).await;
    assert_eq!(status, StatusCode::OK);

    let files: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    assert_eq!(
        std::fs::read_to_string(&files[0]).unwrap(),
        r#"{"name":"ada","kind":"signup"}"#
    );
    assert_eq!(ctx.source.metrics().snapshot().bodies_captured, 1);
}

#[tokio::test]
async fn test_capture_precedes_routing() {
    let dir = tempfile::tempdir().unwrap();
    let config = HttpSourceConfig {
        capture_directory: Some(dir.path().join("captures")),
        ..Default::default()
    };
    let ctx = test_source(config);

    let (status, _) = send(&ctx, post("/missing", r#"{"lost":true}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method("PUT")
        .uri("/user")
        .body(Body::from("put-body"))
        .unwrap();
    let (status, _) = send(&ctx, request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let mut contents: Vec<String> = std::fs::read_dir(dir.path().join("captures"))
        .unwrap()
        .map(|entry| std::fs::read_to_string(entry.unwrap().path()).unwrap())
        .collect();
    contents.sort();
    assert_eq!(contents, vec![r#"{"lost":true}"#.to_string(), "put-body".to_string()]);
    assert_eq!(ctx.source.metrics().snapshot().bodies_captured, 2);
    assert_eq!(ctx.sink.metrics().documents_written, 0);
}

#[tokio::test]
async fn test_oversized_body_not_captured() {
    let dir = tempfile::tempdir().unwrap();
    let config = HttpSourceConfig {
        max_payload_size: 16,
        capture_directory: Some(dir.path().join("captures")),
        ..Default::default()
    };
    let ctx = test_source(config);

    let (status, _) = send(
        &ctx,
        post("/orders", r#"[{"id":1,"kind":"a"},{"id":2,"kind":"b"}]"#),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!dir.path().join("captures").exists());
}

// =============================================================================
// Server lifecycle
// =============================================================================

#[tokio::test]
async fn test_bind_failure() {
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = occupied.local_addr().unwrap().port();

    let config = HttpSourceConfig {
        address: "127.0.0.1".into(),
        port,
        ..Default::default()
    };
    let source = HttpSource::new(config, HashMap::new());

    let err = source
        .run(tokio_util::sync::CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpSourceError::Bind { ref address, .. } if address.ends_with(&port.to_string())));
}
