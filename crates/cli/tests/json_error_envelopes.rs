//! Ensure CLI failures that are not command-line errors honor `--output json`.

use std::fs;
use std::process::Command;

use assert_cmd::cargo;

fn cmdgraph() -> Command {
    Command::new(cargo::cargo_bin!("cmdgraph"))
}

fn write_temp_grammar(content: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("grammar.json");
    fs::write(&path, content).expect("write temp grammar");
    (dir, path.to_string_lossy().to_string())
}

fn envelope(args: &[&str]) -> serde_json::Value {
    let output = cmdgraph()
        .args(args)
        .args(["--output", "json"])
        .output()
        .expect("run cmdgraph");
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json envelope");
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "command_failed");
    json
}

#[test]
fn missing_grammar_file_emits_json_error_envelope() {
    let json = envelope(&["run", "ping", "--grammar", "nope-does-not-exist.json"]);
    assert!(
        json["message"]
            .as_str()
            .is_some_and(|m| m.contains("failed to read grammar file")),
        "unexpected message: {}",
        json["message"]
    );
}

#[test]
fn invalid_grammar_emits_json_error_envelope() {
    let (_dir, path) = write_temp_grammar(
        r#"{ "schema_version": "1.0.0", "commands": [{ "literal": "two words" }] }"#,
    );
    let json = envelope(&["run", "ping", "--grammar", &path]);
    let message = json["message"].as_str().unwrap_or_default();
    assert!(message.contains("failed to load grammar file"), "{message}");
    assert!(message.contains("must not contain spaces"), "{message}");
}

#[test]
fn unresolved_redirect_emits_json_error_envelope() {
    let (_dir, path) = write_temp_grammar(
        r#"{ "schema_version": "1.0.0", "commands": [{ "literal": "go", "redirect": ["nowhere"] }] }"#,
    );
    let json = envelope(&["usage", "--grammar", &path]);
    let message = json["message"].as_str().unwrap_or_default();
    assert!(message.contains("unknown path 'nowhere'"), "{message}");
}

#[test]
fn custom_grammar_is_used_when_given() {
    let (_dir, path) = write_temp_grammar(
        r#"{ "schema_version": "1.0.0", "commands": [{ "literal": "hello", "executes": { "return": 7 } }] }"#,
    );
    let output = cmdgraph()
        .args(["run", "hello", "--grammar", &path, "--output", "json"])
        .output()
        .expect("run cmdgraph");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["result"], 7);

    // The demo grammar is not merged in.
    let json = envelope_syntax(&["run", "ping", "--grammar", &path]);
    assert_eq!(json["error"]["code"], "CMD3001");
}

fn envelope_syntax(args: &[&str]) -> serde_json::Value {
    let output = cmdgraph()
        .args(args)
        .args(["--output", "json"])
        .output()
        .expect("run cmdgraph");
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("valid json")
}
