//! Inbound request surface.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use http::header::{HeaderName, HeaderValue, USER_AGENT};
use http::HeaderMap;
use tracing::warn;

use super::event::AlbTargetGroupRequest;

/// Header carrying the load balancer's trace id.
pub const TRACE_ID_HEADER: &str = "x-amzn-trace-id";

/// Request as seen by handlers.
///
/// Headers from the single- and multi-value maps are merged into one case-insensitive
/// [`HeaderMap`]; the body is base64-decoded up front when the event says so.
#[derive(Debug, Clone)]
pub struct Request {
    event: AlbTargetGroupRequest,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Request {
    /// Build a request from a load balancer event.
    #[must_use]
    pub fn from_event(event: AlbTargetGroupRequest) -> Self {
        let mut headers = HeaderMap::new();
        for (name, values) in &event.multi_value_headers {
            for value in values {
                append_header(&mut headers, name, value);
            }
        }
        for (name, value) in &event.headers {
            if !headers.contains_key(name.as_str()) {
                append_header(&mut headers, name, value);
            }
        }

        let body = decode_body(&event);

        Self {
            event,
            headers,
            body,
        }
    }

    /// Build a bare request with the given method and path.
    #[must_use]
    pub fn new(method: &str, path: &str) -> Self {
        Self::from_event(AlbTargetGroupRequest {
            http_method: method.to_string(),
            path: path.to_string(),
            ..AlbTargetGroupRequest::default()
        })
    }

    /// Append a header value.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        append_header(&mut self.headers, name, value);
        self.event
            .multi_value_headers
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.to_string());
        self
    }

    /// Append a query parameter value.
    #[must_use]
    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.event
            .multi_value_query_string_parameters
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Underlying event.
    #[must_use]
    pub fn event(&self) -> &AlbTargetGroupRequest {
        &self.event
    }

    /// HTTP method exactly as received.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.event.http_method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.event.path
    }

    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.header(TRACE_ID_HEADER)
    }

    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.header(USER_AGENT.as_str())
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All values of a header (case-insensitive).
    #[must_use]
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// First value of a query parameter.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.event
            .multi_value_query_string_parameters
            .get(name)
            .and_then(|values| values.first())
            .or_else(|| self.event.query_string_parameters.get(name))
            .map(String::as_str)
    }

    /// All values of a query parameter.
    #[must_use]
    pub fn query_values(&self, name: &str) -> Vec<&str> {
        match self.event.multi_value_query_string_parameters.get(name) {
            Some(values) => values.iter().map(String::as_str).collect(),
            None => self
                .event
                .query_string_parameters
                .get(name)
                .map(|v| vec![v.as_str()])
                .unwrap_or_default(),
        }
    }

    /// Decoded body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

fn append_header(headers: &mut HeaderMap, name: &str, value: &str) {
    match (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        (Ok(name), Ok(value)) => {
            headers.append(name, value);
        }
        _ => warn!(header = %name, "Dropping invalid request header"),
    }
}

fn decode_body(event: &AlbTargetGroupRequest) -> Vec<u8> {
    if event.body.is_empty() {
        return Vec::new();
    }
    if !event.is_base64_encoded {
        return event.body.as_bytes().to_vec();
    }
    match STANDARD.decode(&event.body) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Request body is not valid base64; treating as empty");
            Vec::new()
        }
    }
}
