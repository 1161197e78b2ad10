//! Minimal W3C trace-context propagation using manual header handling.

use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::Span;

/// W3C Trace Context header name
pub const TRACEPARENT: &str = "traceparent";

/// Read the raw `traceparent` header, if present and valid UTF-8.
pub fn extract_trace_parent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TRACEPARENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Inject a `traceparent` header for an outgoing request.
///
/// Span ids are random; spans are correlated through the `outgoing_http` span
/// fields rather than an exporter.
pub fn inject_trace_context(headers: &mut HeaderMap, _span: &Span) {
    let span_id = format!("{:016x}", rand::random::<u64>());
    let trace_id = format!("{:032x}", rand::random::<u128>());
    let traceparent = format!("00-{trace_id}-{span_id}-01");

    if let Ok(header_value) = HeaderValue::from_str(&traceparent) {
        headers.insert(HeaderName::from_static(TRACEPARENT), header_value);
    }
}

/// Parse the trace id out of a version-00 `traceparent` value.
pub fn parse_trace_id(traceparent: &str) -> Option<&str> {
    let mut parts = traceparent.split('-');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("00"), Some(trace_id), Some(_), Some(_)) if trace_id.len() == 32 => Some(trace_id),
        _ => None,
    }
}
