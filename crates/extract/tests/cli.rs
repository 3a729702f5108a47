// ABOUTME: Integration tests for the misinfo-extract CLI binary.
// ABOUTME: Tests site selection, crawl stamping, output files and error exits.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const STORY_URL: &str = "https://news.example.com/2020/03/storm-floods-coastal-towns";

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn extract_cmd() -> Command {
    let mut cmd = Command::cargo_bin("misinfo-extract").unwrap();
    cmd.env("RUST_LOG", "error");
    cmd
}

#[test]
fn extracts_article_for_site_matched_by_url() {
    let output = extract_cmd()
        .arg("--config")
        .arg(fixture_path("sites.yml"))
        .arg("--html")
        .arg(fixture_path("story.html"))
        .arg("--url")
        .arg(STORY_URL)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let article: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(article["site_name"], "example-news");
    assert_eq!(article["title"], "Storm floods coastal towns");
    assert_eq!(article["byline"], "Jane Doe, John Smith");
    assert!(article["crawl_id"].is_null());
}

#[test]
fn explicit_site_and_crawl_info() {
    extract_cmd()
        .args(["--config", &fixture_path("sites.yml")])
        .args(["--site", "fallback-only"])
        .args(["--html", &fixture_path("story.html")])
        .args(["--url", "https://elsewhere.example/2020/03/storm"])
        .args(["--crawl-id", "crawl-42"])
        .args(["--crawl-datetime", "2020-03-15T00:00:00+00:00"])
        .arg("--compact")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""site_name":"fallback-only""#))
        .stdout(predicate::str::contains(r#""crawl_id":"crawl-42""#))
        .stdout(predicate::str::contains(
            r#""crawl_datetime":"2020-03-15T00:00:00+00:00""#,
        ));
}

#[test]
fn text_output_prints_paragraphs() {
    extract_cmd()
        .args(["--config", &fixture_path("sites.yml")])
        .args(["--html", &fixture_path("story.html")])
        .args(["--url", STORY_URL])
        .arg("--text")
        .assert()
        .success()
        .stdout(predicate::str::contains("\n\nOfficials said"))
        .stdout(predicate::str::contains("site_name").not());
}

#[test]
fn new_crawl_generates_an_id() {
    let output = extract_cmd()
        .args(["--config", &fixture_path("sites.yml")])
        .args(["--html", &fixture_path("story.html")])
        .args(["--url", STORY_URL])
        .arg("--new-crawl")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let article: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(article["crawl_id"].as_str().unwrap().len(), 36);
    assert!(article["crawl_datetime"]
        .as_str()
        .unwrap()
        .ends_with("+00:00"));
}

#[test]
fn writes_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let out_path = temp_dir.path().join("article.json");

    extract_cmd()
        .args(["--config", &fixture_path("sites.yml")])
        .args(["--html", &fixture_path("story.html")])
        .args(["--url", STORY_URL])
        .arg("--output")
        .arg(&out_path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(&out_path).unwrap();
    assert!(written.contains("harbour wall"));
}

#[test]
fn unknown_site_fails() {
    extract_cmd()
        .args(["--config", &fixture_path("sites.yml")])
        .args(["--site", "nope"])
        .args(["--html", &fixture_path("story.html")])
        .args(["--url", STORY_URL])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn unmatched_url_fails() {
    extract_cmd()
        .args(["--config", &fixture_path("sites.yml")])
        .args(["--html", &fixture_path("story.html")])
        .args(["--url", "https://unknown.example/a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no site"));
}

#[test]
fn broken_config_fails() {
    extract_cmd()
        .args(["--config", &fixture_path("sites.yml")])
        .args(["--site", "broken-site"])
        .args(["--html", &fixture_path("story.html")])
        .args(["--url", "https://broken.example.com/a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("select_expression"));
}

#[test]
fn malformed_yaml_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("sites.yml");
    fs::write(&config_path, "example: [unclosed").unwrap();

    extract_cmd()
        .arg("--config")
        .arg(&config_path)
        .args(["--html", &fixture_path("story.html")])
        .args(["--url", STORY_URL])
        .assert()
        .failure()
        .stderr(predicate::str::contains("LoadSiteConfigs"));
}

#[test]
fn crawl_id_requires_datetime() {
    extract_cmd()
        .args(["--config", &fixture_path("sites.yml")])
        .args(["--html", &fixture_path("story.html")])
        .args(["--url", STORY_URL])
        .args(["--crawl-id", "crawl-42"])
        .assert()
        .failure();
}
