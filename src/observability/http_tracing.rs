//! # HTTP Request Tracing Middleware
//!
//! Axum middleware that wraps each request in a `request_span!` span and logs
//! its completion with status and latency.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::Instrument;

use crate::request_span;

/// Axum middleware that traces each HTTP request
///
/// Server errors are logged at `error`, client errors at `warn`, everything
/// else at `info`.
pub async fn trace_http_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = request_span!(method, path);
    let start = Instant::now();

    let response = next.run(request).instrument(span.clone()).await;

    let status = response.status().as_u16();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    span.in_scope(|| {
        if status >= 500 {
            tracing::error!(status, elapsed_ms, "Request failed");
        } else if status >= 400 {
            tracing::warn!(status, elapsed_ms, "Request rejected");
        } else {
            tracing::info!(status, elapsed_ms, "Request completed");
        }
    });

    response
}
