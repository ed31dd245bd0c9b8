//! End-to-end tests for the `albrouter` binary

use std::io::Write;
use std::process::{Command, Stdio};

fn albrouter() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_albrouter"));
    cmd.env("ALBROUTER_LOG_LEVEL", "warn");
    cmd
}

#[test]
fn test_cli_routes_lists_table() {
    let output = albrouter()
        .args(["routes", "-r", "/users/:user_id", "-r", "/static/*", "-r", "/health"])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, "/\n/health\n/static/*\n/users/:user_id\n");
}

#[test]
fn test_cli_resolve_prints_match() {
    let output = albrouter()
        .args(["resolve", "-r", "/a/:x", "-r", "/a/b", "/a/v1"])
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["pattern"], "/a/:x");
    assert_eq!(v["params"]["x"], "v1");
    assert_eq!(v["is_last"], false);
}

#[test]
fn test_cli_invoke_reads_event_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("event.json");
    std::fs::write(
        &path,
        r#"{"httpMethod":"GET","path":"/users/42","queryStringParameters":{"expand":"books"}}"#,
    )
    .unwrap();

    let output = albrouter()
        .args(["invoke", "-r", "/users/:user_id", "--event"])
        .arg(&path)
        .output()
        .expect("run cli");
    assert!(output.status.success());

    let resp: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(resp["statusCode"], 200);
    assert_eq!(resp["statusDescription"], "200 OK");

    use base64::{engine::general_purpose::STANDARD, Engine as _};
    let body = STANDARD.decode(resp["body"].as_str().unwrap()).unwrap();
    let echo: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(echo["pattern"], "/users/:user_id");
    assert_eq!(echo["params"]["user_id"], "42");
    assert_eq!(echo["query"]["expand"][0], "books");
}

#[test]
fn test_cli_invoke_reads_stdin() {
    let mut child = albrouter()
        .args(["invoke", "-r", "/ping", "--event", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn cli");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(br#"{"httpMethod":"GET","path":"/missing"}"#)
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let resp: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(resp["statusCode"], 404);
}

#[test]
fn test_cli_invoke_rejects_bad_event() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("event.json");
    std::fs::write(&path, "not json").unwrap();

    let output = albrouter()
        .args(["invoke", "-r", "/ping", "--event"])
        .arg(&path)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Event is not a valid ALB target-group request"));
}
