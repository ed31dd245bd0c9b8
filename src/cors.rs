//! CORS echo helper.
//!
//! Load balancer functions usually sit behind an API origin they trust, so the helper
//! reflects what the browser asked for instead of enforcing a policy:
//!
//! - `Access-Control-Allow-Origin`: the request `Origin`, or `*` when it is absent or `null`
//! - `Access-Control-Allow-Headers`: the `Access-Control-Request-Headers` value, if any
//! - `Access-Control-Allow-Methods`: the `Access-Control-Request-Method` value, if any

use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
};

use crate::server::{Request, Response};

/// Add CORS headers mirroring the request's preflight headers.
pub fn cors_helper(req: &Request, resp: &mut Response) {
    match req.header(ORIGIN.as_str()) {
        Some(origin) if !origin.is_empty() && origin != "null" => {
            resp.add_header(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        _ => {
            resp.add_header(ACCESS_CONTROL_ALLOW_ORIGIN, "*");
        }
    }

    if let Some(headers) = req.header(ACCESS_CONTROL_REQUEST_HEADERS.as_str()) {
        if !headers.is_empty() {
            resp.add_header(ACCESS_CONTROL_ALLOW_HEADERS, headers);
        }
    }

    if let Some(method) = req.header(ACCESS_CONTROL_REQUEST_METHOD.as_str()) {
        if !method.is_empty() {
            resp.add_header(ACCESS_CONTROL_ALLOW_METHODS, method);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echoes_preflight_headers() {
        let req = Request::new("OPTIONS", "/x")
            .with_header("Origin", "https://app.example.com")
            .with_header("access-control-request-headers", "content-type")
            .with_header("access-control-request-method", "POST");
        let mut resp = Response::new();
        cors_helper(&req, &mut resp);

        assert_eq!(
            resp.header("access-control-allow-origin"),
            Some("https://app.example.com")
        );
        assert_eq!(resp.header("access-control-allow-headers"), Some("content-type"));
        assert_eq!(resp.header("access-control-allow-methods"), Some("POST"));
    }

    #[test]
    fn test_null_origin_becomes_wildcard() {
        let req = Request::new("GET", "/x").with_header("origin", "null");
        let mut resp = Response::new();
        cors_helper(&req, &mut resp);

        assert_eq!(resp.header("access-control-allow-origin"), Some("*"));
        assert_eq!(resp.header("access-control-allow-methods"), None);
    }
}
