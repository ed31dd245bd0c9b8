//! Response accumulator.
//!
//! Handlers write into a [`Response`] in place; the dispatcher calls [`Response::build`]
//! exactly once to produce the wire event.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use cookie::Cookie;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE, LOCATION, SET_COOKIE};
use http::{HeaderMap, StatusCode};
use tracing::warn;

use super::event::AlbTargetGroupResponse;

/// Response under construction.
///
/// A status of `0` means no handler has claimed the response yet. Building an unclaimed
/// response yields `200`.
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: u16,
    headers: HeaderMap,
    cookies: BTreeMap<String, Cookie<'static>>,
    body: Vec<u8>,
}

fn header_pair<K>(name: K, value: &str) -> Option<(HeaderName, HeaderValue)>
where
    K: TryInto<HeaderName>,
    K::Error: fmt::Display,
{
    let name = match name.try_into() {
        Ok(name) => name,
        Err(e) => {
            warn!(error = %e, "Ignoring invalid response header name");
            return None;
        }
    };
    match HeaderValue::from_str(value) {
        Ok(value) => Some((name, value)),
        Err(e) => {
            warn!(header = %name, error = %e, "Ignoring invalid response header value");
            None
        }
    }
}

impl Response {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status code; `0` when unset.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn set_status_code(&mut self, code: u16) -> &mut Self {
        self.status = code;
        self
    }

    /// Append a header value, keeping existing values.
    pub fn add_header<K>(&mut self, name: K, value: &str) -> &mut Self
    where
        K: TryInto<HeaderName>,
        K::Error: fmt::Display,
    {
        if let Some((name, value)) = header_pair(name, value) {
            self.headers.append(name, value);
        }
        self
    }

    /// Set a header, replacing existing values.
    pub fn set_header<K>(&mut self, name: K, value: &str) -> &mut Self
    where
        K: TryInto<HeaderName>,
        K::Error: fmt::Display,
    {
        if let Some((name, value)) = header_pair(name, value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn del_header(&mut self, name: &str) -> &mut Self {
        self.headers.remove(name);
        self
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&Cookie<'static>> {
        self.cookies.get(name)
    }

    /// Set a cookie; a later cookie with the same name replaces the earlier one.
    pub fn set_cookie(&mut self, cookie: Cookie<'static>) -> &mut Self {
        self.cookies.insert(cookie.name().to_string(), cookie);
        self
    }

    pub fn cookies(&self) -> impl Iterator<Item = &Cookie<'static>> {
        self.cookies.values()
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.body = body.into();
        self
    }

    pub fn set_content_type(&mut self, content_type: &str) -> &mut Self {
        self.set_header(CONTENT_TYPE, content_type)
    }

    /// Set a JSON body with the matching content type.
    pub fn json_response(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.set_content_type("application/json").set_body(body)
    }

    /// `302 Found` to `location`.
    pub fn redirect(&mut self, location: &str) -> &mut Self {
        self.set_status_code(StatusCode::FOUND.as_u16())
            .set_header(LOCATION, location)
    }

    /// Finalize into the wire response.
    #[must_use]
    pub fn build(self) -> AlbTargetGroupResponse {
        let mut headers = self.headers;
        for cookie in self.cookies.values() {
            if let Some((name, value)) = header_pair(SET_COOKIE, &cookie.to_string()) {
                headers.append(name, value);
            }
        }

        let code = if self.status == 0 { 200 } else { self.status };
        let status_description = match StatusCode::from_u16(code) {
            Ok(status) => match status.canonical_reason() {
                Some(reason) => format!("{code} {reason}"),
                None => code.to_string(),
            },
            Err(_) => code.to_string(),
        };

        let mut multi_value_headers: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in &headers {
            multi_value_headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        AlbTargetGroupResponse {
            status_code: code,
            status_description,
            headers: HashMap::new(),
            multi_value_headers,
            body: STANDARD.encode(&self.body),
            is_base64_encoded: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_status_builds_200() {
        let resp = Response::new().build();
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.status_description, "200 OK");
        assert!(resp.is_base64_encoded);
        assert_eq!(resp.body, "");
    }

    #[test]
    fn test_cookies_become_set_cookie() {
        let mut resp = Response::new();
        resp.set_cookie(Cookie::new("session", "abc"))
            .set_cookie(Cookie::new("session", "def"))
            .set_cookie(Cookie::new("theme", "dark"));
        let built = resp.build();
        let cookies = &built.multi_value_headers["set-cookie"];
        assert_eq!(cookies.len(), 2);
        assert!(cookies.contains(&"session=def".to_string()));
        assert!(cookies.contains(&"theme=dark".to_string()));
    }

    #[test]
    fn test_set_header_replaces_add_header_appends() {
        let mut resp = Response::new();
        resp.add_header("x-a", "1").add_header("x-a", "2");
        assert_eq!(resp.header_values("x-a"), vec!["1", "2"]);
        resp.set_header("x-a", "3");
        assert_eq!(resp.header_values("x-a"), vec!["3"]);
        resp.del_header("x-a");
        assert!(resp.header("x-a").is_none());
    }

    #[test]
    fn test_invalid_header_is_ignored() {
        let mut resp = Response::new();
        resp.add_header("bad header", "v").add_header("x-ok", "line\nbreak");
        assert!(resp.headers().is_empty());
    }

    #[test]
    fn test_redirect() {
        let mut resp = Response::new();
        resp.redirect("https://example.com/next");
        assert_eq!(resp.status_code(), 302);
        assert_eq!(resp.header("location"), Some("https://example.com/next"));
    }
}
