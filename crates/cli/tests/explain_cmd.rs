//! CLI tests for the `cmdgraph explain` subcommand.

use std::process::Command;

use assert_cmd::cargo;

fn cmdgraph() -> Command {
    Command::new(cargo::cargo_bin!("cmdgraph"))
}

#[test]
fn explain_known_code_json_returns_explanation() {
    let output = cmdgraph()
        .args(["explain", "CMD3001", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["id"], "CMD3001");
    assert!(json["explanation"].is_string());
}

#[test]
fn explain_unknown_code_json_returns_null_explanation() {
    let output = cmdgraph()
        .args(["explain", "CMD9999", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["id"], "CMD9999");
    assert!(json["explanation"].is_null());
}

#[test]
fn explain_pretty_shows_human_readable_text() {
    let output = cmdgraph()
        .args(["explain", "CMD2002", "--output", "pretty"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("CMD2002") && stdout.contains(':'),
        "unexpected output: {stdout}"
    );
}

#[test]
fn explain_needs_no_grammar() {
    // A broken --grammar path is never read for `explain`.
    let output = cmdgraph()
        .args(["explain", "CMD1001", "--grammar", "missing.json", "--output", "json"])
        .output()
        .expect("run explain command");
    assert!(output.status.success());
}
