//! `idl-to-json` binary tests.

mod fixtures;

use std::ffi::OsStr;
use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn idl_to_json(args: &[&OsStr]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_idl-to-json"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run idl-to-json")
}

#[test]
fn test_cli_prints_json_and_warnings() {
    let (_dir, root) = fixtures::stage_blink();
    let output = idl_to_json(&[root.as_os_str()]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["Document", "EventTarget", "Node", "ParentNode"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    let warnings: Vec<&str> = stderr.lines().filter(|l| l.starts_with("warning: ")).collect();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[1].contains("Document implements MissingMixin, but cannot find MissingMixin"));
}

#[test]
fn test_cli_syntax_error_exits_nonzero() {
    let (_dir, root) = fixtures::stage_blink();
    fs::write(root.join("core/dom/Broken.idl"), "interface Broken { void f(; };").unwrap();

    let output = idl_to_json(&[root.as_os_str()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Broken.idl"));
}

#[test]
fn test_cli_config_and_dialect_flags() {
    let (dir, root) = fixtures::stage_webkit();
    let config = dir.path().join("idl.toml");
    fs::write(&config, fixtures::SED_PREPROCESS_CONFIG).unwrap();

    let output = idl_to_json(&[
        OsStr::new("--config"),
        config.as_os_str(),
        OsStr::new("--dialect"),
        OsStr::new("webkit"),
        root.as_os_str(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["DOMWindow"]["attributes"][0]["idl_type"]["base_type"], "CSS");
    assert!(json.get("DOMWindowCSS").is_none());
}

#[test]
fn test_cli_bad_config_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("idl.toml");
    fs::write(&config, "[discovery]\nsuffix = \"\"\n").unwrap();

    let output = idl_to_json(&[OsStr::new("--config"), config.as_os_str(), dir.path().as_os_str()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Validation error"));
}

#[test]
fn test_cli_unknown_dialect_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let output = idl_to_json(&[OsStr::new("--dialect"), OsStr::new("gecko"), dir.path().as_os_str()]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
