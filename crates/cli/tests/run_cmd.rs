//! CLI tests for the `cmdgraph run` subcommand against the embedded demo grammar.

use std::process::Command;

use assert_cmd::cargo;

fn cmdgraph() -> Command {
    Command::new(cargo::cargo_bin!("cmdgraph"))
}

fn run_json(args: &[&str]) -> (bool, serde_json::Value) {
    let output = cmdgraph()
        .args(args)
        .args(["--output", "json"])
        .output()
        .expect("run cmdgraph");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json = serde_json::from_str(&stdout).expect("valid json");
    (output.status.success(), json)
}

#[test]
fn run_returns_handler_result() {
    let (ok, json) = run_json(&["run", "give alice 5"]);
    assert!(ok);
    assert_eq!(json["ok"], true);
    assert_eq!(json["result"], 5);
    assert_eq!(json["notifications"][0]["source"], "console");
    assert_eq!(json["notifications"][0]["success"], true);
}

#[test]
fn run_follows_alias_redirect() {
    let (ok, json) = run_json(&["run", r#"msg "hi there""#]);
    assert!(ok);
    assert_eq!(json["result"], 8);
}

#[test]
fn run_as_renames_source() {
    let (ok, json) = run_json(&["run", "as bob ping"]);
    assert!(ok);
    assert_eq!(json["result"], 1);
    assert_eq!(json["notifications"][0]["source"], "bob");
}

#[test]
fn run_each_forks_per_name() {
    let (ok, json) = run_json(&["run", r#"each "ann,ben,cal" ping"#]);
    assert!(ok);
    assert_eq!(json["result"], 3);
    let sources: Vec<_> = json["notifications"]
        .as_array()
        .expect("notifications array")
        .iter()
        .map(|n| n["source"].as_str().unwrap_or_default().to_owned())
        .collect();
    assert_eq!(sources, ["ann", "ben", "cal"]);
}

#[test]
fn run_bound_violation_reports_cursor() {
    let (ok, json) = run_json(&["run", "give alice 99"]);
    assert!(!ok);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "CMD2002");
    assert_eq!(json["error"]["cursor"], 11);
}

#[test]
fn run_unknown_command_reports_position_zero() {
    let (ok, json) = run_json(&["run", "launch"]);
    assert!(!ok);
    assert_eq!(json["error"]["code"], "CMD3001");
    assert_eq!(json["error"]["cursor"], 0);
}

#[test]
fn run_requires_permission() {
    let (ok, json) = run_json(&["run", "admin reload"]);
    assert!(!ok);
    assert_eq!(json["error"]["code"], "CMD3001");

    let (ok, json) = run_json(&["run", "admin reload", "--permission", "admin"]);
    assert!(ok, "{json}");
    assert_eq!(json["result"], 0);
}

#[test]
fn run_handler_failure_has_no_cursor() {
    let (ok, json) = run_json(&["run", "admin shutdown", "-p", "admin"]);
    assert!(!ok);
    assert_eq!(json["error"]["code"], "CMD4001");
    assert_eq!(json["error"]["message"], "refusing to shut down");
    assert!(json["error"].get("cursor").is_none());
}

#[test]
fn run_pretty_prints_result_on_stdout() {
    let output = cmdgraph()
        .args(["run", "toggle true", "--output", "pretty"])
        .output()
        .expect("run cmdgraph");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1");
}

#[test]
fn run_pretty_error_goes_to_stderr() {
    let output = cmdgraph()
        .args(["run", "give alice 99", "--output", "pretty"])
        .output()
        .expect("run cmdgraph");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CMD2002"), "unexpected stderr: {stderr}");
}
