// pact-audit-cli/tests/verify_command.rs
// ============================================================================
// Module: CLI Verify Command Tests
// Description: Integration tests spawning the pact-audit binary end to end.
// Purpose: Validate argument parsing, exit codes, and output encoding against
//          archives written to a temporary directory.
// Dependencies: pact-audit-cli binary, tempfile, zip
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::io::Write as _;
use std::path::PathBuf;
use std::process::Command;

const CONSTITUTION_TEXT: &[u8] = b"Rule text for the canonical constitution.\n";

/// Path to the compiled `pact-audit` binary.
fn pact_audit_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pact-audit"))
}

/// Writes a minimal, syntactically valid archive that is missing every
/// required member, so `verify` can report on it without crashing.
fn write_empty_archive(path: &std::path::Path) {
    let file = std::fs::File::create(path).expect("create archive");
    let mut writer = zip::ZipWriter::new(file);
    let options =
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    writer.start_file("README.txt", options).expect("start file");
    writer.write_all(b"not a pact pack").expect("write file");
    writer.finish().expect("finish archive");
}

#[test]
fn verify_on_archive_missing_required_members_exits_failure_and_prints_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let archive_path = dir.path().join("empty.zip");
    write_empty_archive(&archive_path);

    let output = Command::new(pact_audit_bin())
        .arg("verify")
        .arg(&archive_path)
        .output()
        .expect("spawn pact-audit");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value = serde_json::from_str(stdout.trim()).expect("parse report json");
    assert_eq!(report["ok"], serde_json::json!(false));
}

#[test]
fn verify_on_missing_archive_path_exits_two() {
    let output = Command::new(pact_audit_bin())
        .arg("verify")
        .arg("/nonexistent/path/to/pack.zip")
        .output()
        .expect("spawn pact-audit");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn verify_text_format_prints_the_outcome_line() {
    let dir = tempfile::tempdir().expect("tempdir");
    let archive_path = dir.path().join("empty.zip");
    write_empty_archive(&archive_path);

    let output = Command::new(pact_audit_bin())
        .arg("verify")
        .arg(&archive_path)
        .arg("--format")
        .arg("text")
        .output()
        .expect("spawn pact-audit");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("OUTCOME"));
}

#[test]
fn verify_with_constitution_override_reads_the_given_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let archive_path = dir.path().join("empty.zip");
    write_empty_archive(&archive_path);
    let constitution_path = dir.path().join("custom_constitution.md");
    std::fs::write(&constitution_path, CONSTITUTION_TEXT).expect("write constitution");

    let output = Command::new(pact_audit_bin())
        .arg("verify")
        .arg(&archive_path)
        .arg("--constitution")
        .arg(&constitution_path)
        .output()
        .expect("spawn pact-audit");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
}
