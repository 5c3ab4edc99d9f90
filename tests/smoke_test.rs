//! Smoke test for the cotkit binary

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

const GOOD: &str = r#"<event type="a-f-G" uid="X1" time="2024-01-01T00:00:00Z" start="2024-01-01T00:00:00Z" stale="2024-01-01T00:05:00Z" how="h-g-i-g-o"><point lat="1.5" lon="-2.5" hae="10.0" ce="5.0" le="3.0"/><detail><contact callsign="Bravo"/></detail></event>"#;

const MISSING_UID: &str = r#"<event type="a-f-G"><point lat="0" lon="0"/></event>"#;

const NO_POINT: &str = r#"<event type="a-f-G" uid="X3"/>"#;

fn message_file(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

fn cotkit(args: &[&Path], extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cotkit"))
        .args(extra)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("COTKIT_CONFIG")
        .output()
        .expect("Failed to run cotkit")
}

#[test]
fn test_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let good = message_file(dir.path(), "good.xml", GOOD);

    let output = cotkit(&[&good], &[]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(r#""uid": "X1""#));
    assert!(stdout.contains(r#""type": "a-f-G""#));
    assert!(stdout.contains("Bravo"));
}

#[test]
fn test_summary_output_skips_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let good = message_file(dir.path(), "good.xml", GOOD);
    let bad = message_file(dir.path(), "bad.xml", MISSING_UID);

    let output = cotkit(&[&good, &bad], &["--output", "summary"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, ["X1 a-f-G 1.500000,-2.500000 hae=10 detail=1"]);
}

#[test]
fn test_event_without_point_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let good = message_file(dir.path(), "good.xml", GOOD);
    let no_point = message_file(dir.path(), "no_point.xml", NO_POINT);

    let output = cotkit(&[&no_point, &good], &["--output", "summary"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("X3"));
    assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn test_strict_mode_fails_on_rejection() {
    let dir = tempfile::tempdir().unwrap();
    let good = message_file(dir.path(), "good.xml", GOOD);
    let bad = message_file(dir.path(), "bad.xml", MISSING_UID);

    assert!(cotkit(&[&good], &["--strict"]).status.success());
    assert!(!cotkit(&[&good, &bad], &["--strict"]).status.success());
}

#[test]
fn test_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let good = message_file(dir.path(), "good.xml", GOOD);
    let config = message_file(
        dir.path(),
        "cotkit.yaml",
        "parser:\n  max_detail_depth: 1\nlogging:\n  level: error\n",
    );

    // <contact> is nested past the configured depth limit
    let output = cotkit(
        &[&good],
        &["--config", config.to_str().unwrap(), "--strict"],
    );
    assert!(!output.status.success());
}
