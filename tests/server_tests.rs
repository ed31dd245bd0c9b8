//! Tests for the ALB event surface: request decoding and response finalisation
//!
//! # Test Coverage
//!
//! - Events deserialised from load balancer JSON, including `null` maps
//! - Header merging (single- and multi-value) and case-insensitive lookup
//! - Base64 request bodies, including undecodable ones
//! - Response finalisation: status description, cookies, base64 body

use albrouter::dispatcher::{Context, Dispatcher};
use albrouter::error::{HandlerError, HandlerResult};
use albrouter::handlers::{Handler, RouteHandler};
use albrouter::server::{AlbTargetGroupRequest, Request, Response};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use cookie::Cookie;
use serde_json::json;

fn event(value: serde_json::Value) -> AlbTargetGroupRequest {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_request_merges_headers() {
    let req = Request::from_event(event(json!({
        "httpMethod": "GET",
        "path": "/",
        "headers": {"User-Agent": "curl/8.0", "x-amzn-trace-id": "Root=1-5759e988"},
        "multiValueHeaders": {"accept": ["text/html", "application/json"]},
    })));

    assert_eq!(req.user_agent(), Some("curl/8.0"));
    assert_eq!(req.header("USER-AGENT"), Some("curl/8.0"));
    assert_eq!(req.trace_id(), Some("Root=1-5759e988"));
    assert_eq!(req.header_values("Accept"), vec!["text/html", "application/json"]);
}

#[test]
fn test_multi_value_headers_take_precedence() {
    let req = Request::from_event(event(json!({
        "httpMethod": "GET",
        "path": "/",
        "headers": {"x-flag": "single"},
        "multiValueHeaders": {"x-flag": ["one", "two"]},
    })));

    assert_eq!(req.header_values("x-flag"), vec!["one", "two"]);
}

#[test]
fn test_query_values() {
    let req = Request::from_event(event(json!({
        "httpMethod": "GET",
        "path": "/search",
        "queryStringParameters": {"q": "rust"},
        "multiValueQueryStringParameters": {"tag": ["a", "b"]},
    })));

    assert_eq!(req.query_value("q"), Some("rust"));
    assert_eq!(req.query_values("tag"), vec!["a", "b"]);
    assert_eq!(req.query_value("tag"), Some("a"));
    assert!(req.query_values("missing").is_empty());
}

#[test]
fn test_base64_body_is_decoded() {
    let req = Request::from_event(event(json!({
        "httpMethod": "POST",
        "path": "/upload",
        "isBase64Encoded": true,
        "body": STANDARD.encode(b"\x00\x01binary"),
    })));
    assert_eq!(req.body(), b"\x00\x01binary");

    let req = Request::from_event(event(json!({
        "httpMethod": "POST",
        "path": "/upload",
        "isBase64Encoded": false,
        "body": "{\"plain\":true}",
    })));
    assert_eq!(req.body(), br#"{"plain":true}"#);
}

#[test]
fn test_undecodable_body_is_empty() {
    let req = Request::from_event(event(json!({
        "httpMethod": "POST",
        "path": "/upload",
        "isBase64Encoded": true,
        "body": "***not base64***",
    })));
    assert!(req.body().is_empty());
}

struct Session;

impl Handler for Session {
    fn run(&self, _ctx: &mut Context<'_>, req: &Request, resp: &mut Response) -> HandlerResult {
        let payload: serde_json::Value =
            serde_json::from_slice(req.body()).map_err(HandlerError::opaque)?;
        resp.set_status_code(201)
            .set_cookie(Cookie::new("session", "s-1"))
            .set_cookie(Cookie::build(("theme", "dark")).path("/").build())
            .add_header("x-user", payload["user"].as_str().unwrap_or_default())
            .json_response(br#"{"created":true}"#.to_vec());
        Ok(())
    }
}

#[test]
fn test_serve_round_trip() {
    let dispatcher = Dispatcher::builder()
        .endpoint("/sessions", vec![RouteHandler::plain(Session)])
        .build();

    let outcome = dispatcher
        .serve(event(json!({
            "httpMethod": "POST",
            "path": "/sessions",
            "isBase64Encoded": true,
            "body": STANDARD.encode(br#"{"user":"ferris"}"#),
            "requestContext": {"elb": {"targetGroupArn": "arn:aws:elasticloadbalancing:tg/app"}},
        })))
        .unwrap();
    assert!(outcome.error.is_none());

    let resp = outcome.response;
    assert_eq!(resp.status_code, 201);
    assert_eq!(resp.status_description, "201 Created");
    assert!(resp.is_base64_encoded);
    assert_eq!(STANDARD.decode(&resp.body).unwrap(), br#"{"created":true}"#);
    assert_eq!(resp.multi_value_headers["x-user"], vec!["ferris"]);
    assert_eq!(
        resp.multi_value_headers["content-type"],
        vec!["application/json"]
    );

    let mut cookies = resp.multi_value_headers["set-cookie"].clone();
    cookies.sort();
    assert_eq!(cookies, vec!["session=s-1", "theme=dark; Path=/"]);

    let wire = serde_json::to_value(&resp).unwrap();
    assert_eq!(wire["statusCode"], 201);
    assert_eq!(wire["isBase64Encoded"], true);
    assert!(wire.get("multiValueHeaders").is_some());
}

#[test]
fn test_unmatched_event_gets_not_found_body() {
    let dispatcher = Dispatcher::builder().build();
    let outcome = dispatcher
        .serve(event(json!({
            "httpMethod": "GET",
            "path": "/nothing/here",
            "headers": {"origin": "https://app.example.com"},
        })))
        .unwrap();

    let resp = outcome.response;
    assert_eq!(resp.status_code, 404);
    assert_eq!(resp.status_description, "404 Not Found");
    assert_eq!(
        resp.multi_value_headers["access-control-allow-origin"],
        vec!["https://app.example.com"]
    );
    let body: serde_json::Value =
        serde_json::from_slice(&STANDARD.decode(&resp.body).unwrap()).unwrap();
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["status_code"], 404);
}
