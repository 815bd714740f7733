//! HTTP request handler
//!
//! Every request goes through `dispatch`: the path selects the event
//! pipeline and the body is adapted before the response is written.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::{Method, StatusCode, Uri};
use axum::response::Response;
use hookbus_pipeline::Pipeline;

use super::capture::BodyCapture;
use super::metrics::HttpSourceMetrics;
use super::response::{error_response, ok_response, status_for};

/// Shared state for the handler
pub struct HandlerState {
    /// Pipelines keyed by event path
    pub pipelines: HashMap<String, Arc<Pipeline>>,
    pub metrics: Arc<HttpSourceMetrics>,
    pub capture: Option<BodyCapture>,
}

/// Fallback handler for every path and method
pub async fn dispatch(
    State(state): State<Arc<HandlerState>>,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    state.metrics.request_received();
    let path = uri.path();

    let response = handle(&state, &method, path, body).await;
    if response.status() == StatusCode::OK {
        state.metrics.request_accepted();
    } else {
        state.metrics.request_rejected();
    }

    tracing::debug!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "request handled"
    );
    response
}

async fn handle(
    state: &HandlerState,
    method: &Method,
    path: &str,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    // Every body that was read is captured, whatever the method or path.
    if let Ok(body) = &body {
        state.metrics.bytes_received(body.len() as u64);
        if let Some(capture) = &state.capture {
            capture_body(state, capture, path, body).await;
        }
    }

    if *method != Method::POST {
        return error_response(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("method {} not allowed, use POST", method),
        );
    }

    let Some(pipeline) = state.pipelines.get(path) else {
        return error_response(StatusCode::NOT_FOUND, format!("no event configured for {}", path));
    };

    // Bodies over the limit are refused by the extractor with 413.
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(path = %path, error = %rejection.body_text(), "rejected request body");
            return error_response(rejection.status(), rejection.body_text());
        }
    };

    match pipeline.adapt(&body).await {
        Ok(_) => ok_response(),
        Err(e) => error_response(status_for(&e), e.to_string()),
    }
}

async fn capture_body(state: &HandlerState, capture: &BodyCapture, path: &str, body: &[u8]) {
    match capture.write(body).await {
        Ok(file) => {
            state.metrics.body_captured();
            tracing::debug!(path = %path, file = %file.display(), "request body captured");
        }
        Err(e) => {
            tracing::warn!(path = %path, directory = %capture.directory().display(), error = %e, "failed to capture request body");
        }
    }
}
