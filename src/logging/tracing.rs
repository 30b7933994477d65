use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::fmt;
use std::time::Instant;
use tracing::{Instrument, error, info, info_span};

use super::{generate_trace_id, sanitize_log_message};

/// HTTP header name for trace ID
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Longest caller-supplied trace id we are willing to echo back
const MAX_TRACE_ID_LEN: usize = 128;

/// Correlation id of one request.
///
/// Stored in the request extensions by [`trace_requests`] so later layers can
/// put it on their own log lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceId(String);

impl TraceId {
    /// Reuse the caller's `x-trace-id` when it is printable and reasonably
    /// short, otherwise mint a fresh UUID.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(TRACE_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty() && s.len() <= MAX_TRACE_ID_LEN)
            .map(|s| TraceId(s.to_string()))
            .unwrap_or_else(|| TraceId(generate_trace_id()))
    }

    /// Trace id attached to `request`, if the tracing middleware saw it
    pub fn of(request: &Request) -> Option<&TraceId> {
        request.extensions().get::<TraceId>()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Open an `http_request` span per request, log its outcome and echo the
/// trace id in the response headers.
pub async fn trace_requests(mut request: Request, next: Next) -> Response {
    let trace_id = TraceId::from_headers(request.headers());

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %request.method(),
        uri = %sanitize_log_message(&request.uri().to_string()),
    );
    request.extensions_mut().insert(trace_id.clone());

    let started = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;
    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;

    span.in_scope(|| {
        if response.status().is_server_error() {
            error!(%trace_id, status, latency_ms, "Request failed");
        } else {
            info!(%trace_id, status, latency_ms, "Request completed");
        }
    });

    if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }

    response
}
