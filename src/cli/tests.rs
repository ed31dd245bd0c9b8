//! Unit tests for CLI commands

use std::io::Write as _;

use crate::cli::{run_cli, Cli, Commands};
use clap::Parser;

#[test]
fn test_routes_command_parses_repeated_routes() {
    let cli = Cli::try_parse_from(["albrouter", "routes", "-r", "/a/:x", "--route", "/w/*"]).unwrap();

    match cli.command {
        Commands::Routes { routes } => assert_eq!(routes, vec!["/a/:x", "/w/*"]),
        other => panic!("Expected Routes command, got {other:?}"),
    }
}

#[test]
fn test_routes_requires_a_route() {
    assert!(Cli::try_parse_from(["albrouter", "routes"]).is_err());
}

#[test]
fn test_routes_output() {
    let cli = Cli::try_parse_from([
        "albrouter",
        "routes",
        "-r",
        "/auth/group/user/:user_id",
        "-r",
        "/wild/*",
    ])
    .unwrap();
    let mut out = Vec::new();
    run_cli(cli, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text, "/\n/auth/group/user/:user_id\n/wild/*\n");
}

#[test]
fn test_resolve_output() {
    let cli = Cli::try_parse_from(["albrouter", "resolve", "-r", "/w/*", "/w/c/d"]).unwrap();
    let mut out = Vec::new();
    run_cli(cli, &mut out).unwrap();

    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["matched"], true);
    assert_eq!(v["pattern"], "/w/*");
    assert_eq!(v["node_type"], "Recursive");
    assert_eq!(v["params"]["w"], "c/d");
    assert_eq!(v["is_last"], false);
}

#[test]
fn test_resolve_miss() {
    let cli = Cli::try_parse_from(["albrouter", "resolve", "-r", "/a", "/b/c"]).unwrap();
    let mut out = Vec::new();
    run_cli(cli, &mut out).unwrap();

    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["matched"], false);
}

#[test]
fn test_invoke_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"httpMethod":"GET","path":"/users/9","headers":{{"x-amzn-trace-id":"Root=1-abc"}}}}"#
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "albrouter",
        "invoke",
        "-r",
        "/users/:user_id",
        "--event",
        file.path().to_str().unwrap(),
    ])
    .unwrap();
    let mut out = Vec::new();
    run_cli(cli, &mut out).unwrap();

    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["statusCode"], 200);
    assert_eq!(v["isBase64Encoded"], true);
}

#[test]
fn test_invoke_missing_file_fails() {
    let cli = Cli::try_parse_from([
        "albrouter",
        "invoke",
        "-r",
        "/a",
        "--event",
        "/definitely/not/here.json",
    ])
    .unwrap();
    let mut out = Vec::new();
    let err = run_cli(cli, &mut out).unwrap_err();
    assert!(err.to_string().contains("Failed to read event file"));
}
