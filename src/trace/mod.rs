//! Distributed-trace header parsing.
//!
//! The inbound header is formatted as `TRACE_ID[/SPAN_ID[;o=FLAG]]`. Parsing
//! is best-effort: a missing or malformed header degrades to absent fields
//! and never produces an error, since logging must not fail the request.

/// Trace identifiers extracted from one request's header snapshot.
///
/// Either both fields follow the header, or the span is absent when the
/// header carried no span segment; a fully missing header yields both absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceContext {
    pub trace: Option<String>,
    pub span_id: Option<String>,
}

impl TraceContext {
    pub const fn empty() -> Self {
        Self {
            trace: None,
            span_id: None,
        }
    }
}

/// Parses a raw trace header value into backend-schema identifiers.
///
/// The segment before the first `/` becomes
/// `projects/{project}/traces/{TRACE_ID}`; the segment after it, with
/// everything from `;` onward stripped, becomes the span id.
pub fn extract(header_value: Option<&str>, project: &str) -> TraceContext {
    let Some(raw) = header_value else {
        return TraceContext::empty();
    };

    let (trace_id, rest) = match raw.split_once('/') {
        Some((trace_id, rest)) => (trace_id, Some(rest)),
        None => (raw, None),
    };

    if trace_id.is_empty() {
        return TraceContext::empty();
    }

    let span_id = rest
        .map(|segment| segment.split(';').next().unwrap_or(segment))
        .filter(|span| !span.is_empty())
        .map(str::to_string);

    TraceContext {
        trace: Some(format!("projects/{project}/traces/{trace_id}")),
        span_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_header_yields_trace_and_span() {
        let context = extract(Some("abc123/456;o=1"), "P");
        assert_eq!(context.trace.as_deref(), Some("projects/P/traces/abc123"));
        assert_eq!(context.span_id.as_deref(), Some("456"));
    }

    #[test]
    fn absent_header_yields_nothing() {
        assert_eq!(extract(None, "P"), TraceContext::empty());
    }

    #[test]
    fn trace_without_span() {
        let context = extract(Some("abc123"), "P");
        assert_eq!(context.trace.as_deref(), Some("projects/P/traces/abc123"));
        assert_eq!(context.span_id, None);
    }

    #[test]
    fn span_without_options_flag() {
        let context = extract(Some("abc123/456"), "my-project");
        assert_eq!(
            context.trace.as_deref(),
            Some("projects/my-project/traces/abc123")
        );
        assert_eq!(context.span_id.as_deref(), Some("456"));
    }

    #[test]
    fn empty_span_segment_degrades_to_absent() {
        assert_eq!(extract(Some("abc123/"), "P").span_id, None);
        assert_eq!(extract(Some("abc123/;o=1"), "P").span_id, None);
    }

    #[test]
    fn empty_header_value_degrades_to_absent() {
        assert_eq!(extract(Some(""), "P"), TraceContext::empty());
        assert_eq!(extract(Some("/456"), "P"), TraceContext::empty());
    }
}
