//! Command-line tests for the `legis-harvester` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .display()
        .to_string()
}

fn harvester() -> Command {
    Command::cargo_bin("legis-harvester").unwrap()
}

#[test]
fn test_parse_prints_json_and_reports_warnings() {
    harvester()
        .args(["parse", &fixture("lege_140000.html")])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""ver_id": "140000""#))
        .stdout(predicate::str::contains(r#""id": "id_art4""#))
        .stderr(predicate::str::contains("Articles: 4"))
        .stderr(predicate::str::contains("Warnings: 2"));
}

#[test]
fn test_parse_writes_yaml_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out").join("ordonanta.yaml");

    harvester()
        .args(["parse", &fixture("capitol_fara_carte.html"), "--format", "yaml", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Saved to:"));

    let yaml = fs::read_to_string(&output).unwrap();
    assert!(yaml.contains("id: default_book"));
    assert!(yaml.contains("synthetic: true"));
}

#[test]
fn test_parse_with_explicit_ver_id() {
    harvester()
        .args(["parse", &fixture("capitol_fara_carte.html"), "--ver-id", "555"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://legislatie.just.ro/Public/DetaliiDocument/555",
        ));
}

#[test]
fn test_missing_file_fails() {
    harvester()
        .args(["parse", "does-not-exist.html"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Input file does not exist"));
}

#[test]
fn test_convert_rejects_invalid_ver_id() {
    harvester()
        .args(["convert", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid version id"));
}

#[test]
fn test_convert_uses_cached_page() {
    let cache = TempDir::new().unwrap();
    fs::copy(fixture("capitol_fara_carte.html"), cache.path().join("77.html")).unwrap();

    harvester()
        .args(["convert", "77", "--cache-dir"])
        .arg(cache.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""id": "cap_2""#));
}
