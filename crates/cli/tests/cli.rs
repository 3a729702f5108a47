// ABOUTME: Integration tests for the misinfo-cli crawl plan printer.
// ABOUTME: Runs against the extract crate's fixture site configs.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn sites_path() -> String {
    format!(
        "{}/../extract/tests/fixtures/sites.yml",
        env!("CARGO_MANIFEST_DIR")
    )
}

fn cli_cmd() -> Command {
    let mut cmd = Command::cargo_bin("misinfo-cli").unwrap();
    cmd.env("RUST_LOG", "error");
    cmd
}

#[test]
fn single_site_prints_bare_plan() {
    let output = cli_cmd()
        .arg(sites_path())
        .args(["--site", "example-news"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let plan: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(plan["site_name"], "example-news");
    assert_eq!(plan["strategy"]["method"], "index_page");
    assert_eq!(
        plan["strategy"]["article_rule"]["restrict_xpath"],
        "//section[@class='headlines']"
    );
    assert_eq!(plan["article_filter"]["require"], r"/\d{4}/\d{2}/");
    assert_eq!(plan["strip_query_strings"], true);
}

#[test]
fn all_sites_are_enveloped() {
    let output = cli_cmd()
        .arg(sites_path())
        .args(["--max-articles", "10"])
        .arg("--compact")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let envelope: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(envelope["total_sites"], 4);
    assert_eq!(envelope["planned"], 4);
    assert_eq!(envelope["failed"], 0);
    let fallback = envelope["sites"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["site_name"] == "fallback-only")
        .unwrap();
    assert_eq!(fallback["plan"]["concurrent_requests"], 10);
}

#[test]
fn bad_regex_is_reported_per_site() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("sites.yml");
    fs::write(
        &config_path,
        "bad:\n  start_url: https://bad.example/\n  article:\n    url_must_contain: \"(\"\n",
    )
    .unwrap();

    cli_cmd()
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""failed": 1"#))
        .stdout(predicate::str::contains("article.url_must_contain"));
}

#[test]
fn unknown_site_fails() {
    cli_cmd()
        .arg(sites_path())
        .args(["--site", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
