//! CLI integration tests for dupsketch.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a Command for the dupsketch binary.
#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin("dupsketch").unwrap()
}

const DUPLICATED_JSONL: &str = r#"{"id": 1, "text": "the quick brown fox jumps over the lazy dog", "source": "web"}
{"id": 2, "text": "the quick brown fox jumps over the lazy dog", "source": "book"}
{"id": 3, "text": "a completely different sentence about cats and windows"}
"#;

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Near-duplicate document filtering with MinHash and LSH",
        ))
        .stdout(predicate::str::contains("MinHash sketches and LSH banding").not());
}

#[test]
fn test_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dupsketch"));
}

#[test]
fn test_completions() {
    cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dupsketch"));
}

// ============================================================================
// Argument Validation Tests
// ============================================================================

#[test]
fn test_missing_input() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file is required"));
}

#[test]
fn test_missing_output_no_stats_only() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("test.jsonl");
    fs::write(&input, "").unwrap();

    cmd()
        .arg(input.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("output file required"));
}

#[test]
fn test_invalid_threshold_too_high() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("test.jsonl");
    fs::write(&input, "").unwrap();

    cmd()
        .args([input.to_str().unwrap(), "--threshold", "80", "--stats-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "threshold must be between 0.0 and 1.0",
        ));
}

#[test]
fn test_band_mismatch() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("test.txt");
    fs::write(&input, "some text\n").unwrap();

    cmd()
        .args([
            input.to_str().unwrap(),
            "--bands",
            "3",
            "--rows",
            "4",
            "--hash-functions",
            "10",
            "--stats-only",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bands * rows != num_hash_functions"));
}

#[test]
fn test_invalid_tokens_in_word() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("test.txt");
    fs::write(&input, "some text\n").unwrap();

    cmd()
        .args([input.to_str().unwrap(), "-k", "0", "--stats-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tokens in a word must be positive"));
}

// ============================================================================
// Deduplication Tests
// ============================================================================

#[test]
fn test_jsonl_stats_only() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("test.jsonl");
    fs::write(&input, DUPLICATED_JSONL).unwrap();

    cmd()
        .args([input.to_str().unwrap(), "--stats-only"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Total documents:   3"))
        .stderr(predicate::str::contains("Duplicates found:  1"));
}

#[test]
fn test_jsonl_dedup_preserves_fields() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("input.jsonl");
    let output = temp.path().join("output.jsonl");
    fs::write(&input, DUPLICATED_JSONL).unwrap();

    cmd()
        .args([input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Deduplication Results:"));

    let written = fs::read_to_string(&output).unwrap();
    let lines: Vec<_> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("\"source\": \"web\""));
    assert!(lines[1].contains("\"id\": 3"));
}

#[test]
fn test_plain_text_dedup() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("input.txt");
    let output = temp.path().join("output.txt");
    fs::write(
        &input,
        "first line of text here\nsecond unrelated line\nfirst line of text here\n",
    )
    .unwrap();

    cmd()
        .args([input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .success();

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written, "first line of text here\nsecond unrelated line\n");
}

#[test]
fn test_custom_field() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("test.jsonl");
    fs::write(
        &input,
        "{\"content\": \"hello world\"}\n{\"content\": \"hello world\"}\n",
    )
    .unwrap();

    cmd()
        .args([input.to_str().unwrap(), "--field", "content", "--stats-only"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Duplicates found:  1"));
}

#[test]
fn test_missing_field() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("test.jsonl");
    fs::write(&input, "{\"body\": \"hello world\"}\n").unwrap();

    cmd()
        .args([input.to_str().unwrap(), "--stats-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Field 'text' not found"));
}

#[test]
fn test_json_output() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("test.jsonl");
    fs::write(&input, DUPLICATED_JSONL).unwrap();

    let assert = cmd()
        .args([input.to_str().unwrap(), "--stats-only", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["total_documents"], 3);
    assert_eq!(json["unique_documents"], 2);
    assert_eq!(json["duplicates"], 1);
    assert!(json["output"].is_null());
}

#[test]
fn test_config_file() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("test.jsonl");
    let config = temp.path().join("dupsketch.toml");
    fs::write(&input, DUPLICATED_JSONL).unwrap();
    fs::write(&config, "bands = 10\nrows = 10\nnum_hash_functions = 100\n").unwrap();

    cmd()
        .args([
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--stats-only",
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"duplicates\": 1"));
}

#[test]
fn test_config_file_overridden_by_flags() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("test.jsonl");
    let config = temp.path().join("dupsketch.toml");
    fs::write(&input, DUPLICATED_JSONL).unwrap();
    fs::write(&config, "threshold = 0.9\n").unwrap();

    cmd()
        .args([
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--threshold",
            "2.0",
            "--stats-only",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("threshold must be between"));
}

#[test]
fn test_band_flags_imply_hash_functions() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("test.jsonl");
    fs::write(&input, DUPLICATED_JSONL).unwrap();

    cmd()
        .args([
            input.to_str().unwrap(),
            "--bands",
            "16",
            "--rows",
            "8",
            "--stats-only",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Duplicates found:  1"));
}
