use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_cli_help() {
    let mut cmd = cargo::cargo_bin_cmd!("metascout");
    let assert = cmd.arg("--help").assert();

    // On Windows, the binary name in help might be "metascout.exe"
    let expected_pattern = if cfg!(windows) {
        "metascout.exe [OPTIONS] <PAGE>"
    } else {
        "metascout [OPTIONS] <PAGE>"
    };

    assert
        .success()
        .stderr(predicate::str::is_empty())
        .stdout(predicate::str::contains(expected_pattern));
}

#[test]
fn test_cli_json_output() {
    let dir = tempdir().unwrap();
    let page_path = dir.path().join("page.json");
    fs::write(
        &page_path,
        r#"{
            "title": "Restaurant POS Pricing",
            "raw_text": "Compare restaurant POS plans. Every plan includes KOT printing and GST billing.",
            "keywords": ["restaurant pos"],
            "url": "/pricing",
            "content_type": "product"
        }"#,
    )
    .unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("metascout");
    cmd.current_dir(dir.path())
        .arg(&page_path)
        .arg("--output")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"canonical\": \"https://billbytekot.in/pricing\""))
        .stdout(predicate::str::contains("\"content_type\": \"product_page\""));
}

#[test]
fn test_cli_text_output_with_overrides() {
    let dir = tempdir().unwrap();
    let page_path = dir.path().join("page.yaml");
    fs::write(
        &page_path,
        "title: Cafe Billing\nraw_text: Billing for small cafes.\ncontent_type: landing\n",
    )
    .unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("metascout");
    cmd.current_dir(dir.path())
        .arg(&page_path)
        .arg("--site-name")
        .arg("Brew Desk")
        .arg("--base-url")
        .arg("https://brewdesk.example")
        .arg("--no-cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("MetaScout - Page Report"))
        .stdout(predicate::str::contains("Cafe Billing | Brew Desk"))
        .stdout(predicate::str::contains("https://brewdesk.example/"));
}

#[test]
fn test_cli_missing_page_file_fails() {
    let dir = tempdir().unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("metascout");
    cmd.current_dir(dir.path())
        .arg("missing.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load page"));
}

#[test]
fn test_cli_unsupported_page_format_fails() {
    let dir = tempdir().unwrap();
    let page_path = dir.path().join("page.txt");
    fs::write(&page_path, "title = nope").unwrap();

    let mut cmd = cargo::cargo_bin_cmd!("metascout");
    cmd.current_dir(dir.path())
        .arg(&page_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}
