use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use std::path::Path;
use tempfile::TempDir;

const SCENARIO: &str = "1 Scope\nSome body text.\n1.1 Identification\nMore text.";

/// `srs-check` pinned to the noop oracle and a private data directory.
fn srs_check(data: &Path) -> Command {
    let mut cmd = Command::cargo_bin("srs-check").unwrap();
    cmd.env("SRS_CHECK_PROVIDER", "noop")
        .env_remove("SRS_CHECK_API_KEY")
        .env("NO_COLOR", "1")
        .args(["--data-dir", data.to_str().unwrap()]);
    cmd
}

fn scenario(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("scenario.txt");
    write(&path, SCENARIO).unwrap();
    path
}

#[test]
fn parse_prints_tree_as_json() {
    let docs = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    let doc = scenario(&docs);

    srs_check(data.path())
        .args(["parse", doc.to_str().unwrap(), "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"label\": \"Scope\""))
        .stdout(predicate::str::contains("\"label\": \"Identification\""))
        .stdout(predicate::str::contains("\"cached\": false"));

    assert!(data.path().join("cache_index.json").exists());
}

#[test]
fn second_parse_reports_cache_hit() {
    let docs = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    let doc = scenario(&docs);

    srs_check(data.path())
        .args(["parse", doc.to_str().unwrap()])
        .assert()
        .success();
    srs_check(data.path())
        .args(["parse", doc.to_str().unwrap(), "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cached: true"));
}

#[test]
fn check_with_noop_provider_defaults_every_node() {
    let docs = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    let doc = scenario(&docs);

    srs_check(data.path())
        .args(["check", doc.to_str().unwrap(), "--json", "--timeout", "30s"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"defaulted\": 2"))
        .stdout(predicate::str::contains("\"non_compliant\": 0"));
}

#[test]
fn validate_unknown_document_fails() {
    let data = tempfile::tempdir().unwrap();
    srs_check(data.path())
        .args(["validate", "never-parsed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no tree stored"));
}

#[test]
fn remote_provider_without_key_fails() {
    let docs = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    let doc = scenario(&docs);

    srs_check(data.path())
        .env("SRS_CHECK_PROVIDER", "openai")
        .args(["check", doc.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SRS_CHECK_API_KEY"));
}

#[test]
fn rules_lists_builtin_corpus() {
    let data = tempfile::tempdir().unwrap();
    srs_check(data.path())
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("27 rule(s) loaded from built-in Appendix J"));
}

#[test]
fn unreadable_rules_file_falls_back_to_builtin() {
    let data = tempfile::tempdir().unwrap();
    srs_check(data.path())
        .args(["--rules-file", "/definitely/not/rules.md", "rules", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"embedded\""));
}

#[test]
fn cache_show_and_clear() {
    let docs = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    let doc = scenario(&docs);

    srs_check(data.path())
        .args(["parse", doc.to_str().unwrap()])
        .assert()
        .success();
    srs_check(data.path())
        .args(["cache", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 cache entry"));
    srs_check(data.path())
        .args(["cache", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 1 cache entries"));
    srs_check(data.path())
        .args(["cache", "show", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn missing_document_exits_with_failure() {
    let data = tempfile::tempdir().unwrap();
    srs_check(data.path())
        .args(["parse", "/definitely/not/here.docx"])
        .assert()
        .failure();
}

#[test]
fn config_file_sets_batch_size() {
    let docs = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    let doc = scenario(&docs);
    let config = docs.path().join("srs-check.toml");
    write(&config, "[validation]\nbatch_size = 1\nconcurrency = 1\n").unwrap();

    srs_check(data.path())
        .args([
            "--config",
            config.to_str().unwrap(),
            "check",
            doc.to_str().unwrap(),
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 3"));
}
