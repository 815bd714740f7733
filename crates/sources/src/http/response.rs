//! HTTP response helpers
//!
//! Maps pipeline outcomes to status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hookbus_pipeline::PipelineError;

/// Body sent with every successful adaptation
pub const OK_BODY: &str = "ok";

/// Status code reported for a failed adaptation
///
/// | Failure | Status |
/// |---------|--------|
/// | malformed or empty payload | 400 |
/// | template render failure | 422 |
/// | unsupported event configuration | 501 |
/// | anything else | 500 |
pub fn status_for(error: &PipelineError) -> StatusCode {
    if error.is_payload_error() {
        StatusCode::BAD_REQUEST
    } else if error.is_render_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else if error.is_unsupported() {
        StatusCode::NOT_IMPLEMENTED
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Plain text success response
pub fn ok_response() -> Response {
    (StatusCode::OK, OK_BODY).into_response()
}

/// Plain text error response
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, message.into()).into_response()
}
