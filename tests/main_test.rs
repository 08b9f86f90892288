use metascout::cli::Cli;
use metascout::models::PageReport;
use metascout::run;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn args(page: &Path) -> Cli {
    Cli {
        page: page.to_string_lossy().to_string(),
        output: "text".to_string(),
        save: None,
        verbose: false,
        site_name: None,
        base_url: None,
        no_cache: false,
        config: None,
    }
}

fn write_page(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

const BLOG_PAGE: &str = r#"{
    "title": "How KOT Software Cuts Kitchen Delays",
    "description": "Kitchen order tickets keep every order moving from the floor to the kitchen without shouting.",
    "raw_text": "KOT software sends every order straight to the kitchen. Restaurant billing gets faster when the kitchen and the counter share one screen. Read our pricing or start a free trial.",
    "keywords": ["kot software", {"term": "restaurant billing", "search_volume": 900}],
    "url": "/blog/kot-software",
    "content_type": "blog_post",
    "author": "Priya Sharma",
    "published_date": "2024-03-01",
    "faqs": [{"question": "Does KOT work offline?", "answer": "Yes, tickets print without internet."}]
}"#;

#[test]
fn test_run_text_output() {
    let dir = tempdir().unwrap();
    let page = write_page(dir.path(), "page.json", BLOG_PAGE);

    let result = run(args(&page));
    assert!(result.is_ok(), "{:?}", result.err());
}

#[test]
fn test_run_json_output_with_verbose() {
    let dir = tempdir().unwrap();
    let page = write_page(dir.path(), "page.json", BLOG_PAGE);

    let mut cli = args(&page);
    cli.output = "json".to_string();
    cli.verbose = true;

    assert!(run(cli).is_ok());
}

#[test]
fn test_run_saves_report() {
    let dir = tempdir().unwrap();
    let page = write_page(dir.path(), "page.json", BLOG_PAGE);
    let report_path = dir.path().join("report.json");

    let mut cli = args(&page);
    cli.save = Some(report_path.to_string_lossy().to_string());
    run(cli).unwrap();

    let saved = fs::read_to_string(&report_path).unwrap();
    let report: PageReport = serde_json::from_str(&saved).unwrap();
    assert_eq!(report.url, "https://billbytekot.in/blog/kot-software");
    assert_eq!(
        report.analysis.schema.as_ref().and_then(|s| s.schema_type()),
        Some("Article")
    );
    assert!(report.analysis.links.len() <= 8);
    assert!(report.analysis.meta_tags.title.chars().count() <= 60);
    assert!(!report.timestamp.is_empty());
}

#[test]
fn test_run_with_toml_page_and_config_file() {
    let dir = tempdir().unwrap();
    let page = write_page(
        dir.path(),
        "page.toml",
        r#"
title = "Espresso Bar POS"
raw_text = "A point of sale built for espresso bars and small cafes."
url = "/solutions/espresso"
content_type = "landing_page"
keywords = ["espresso pos"]
"#,
    );
    let config = write_page(
        dir.path(),
        "site.yaml",
        "site_name: Crema\nbase_url: https://crema.example\nmax_keywords: 3\n",
    );
    let report_path = dir.path().join("report.json");

    let mut cli = args(&page);
    cli.config = Some(config.to_string_lossy().to_string());
    cli.save = Some(report_path.to_string_lossy().to_string());
    run(cli).unwrap();

    let report: PageReport =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    let tags = &report.analysis.meta_tags;
    assert_eq!(tags.canonical, "https://crema.example/solutions/espresso");
    assert_eq!(tags.title, "Espresso Bar POS | Crema");
    assert_eq!(tags.keywords.split(", ").count(), 3);
    assert_eq!(
        report.analysis.schema.as_ref().and_then(|s| s.schema_type()),
        Some("SoftwareApplication")
    );
}

#[test]
fn test_run_category_page_has_no_schema() {
    let dir = tempdir().unwrap();
    let page = write_page(
        dir.path(),
        "page.yml",
        "title: All Restaurant Tools\ncontent_type: category\nraw_text: Every tool a restaurant needs.\n",
    );
    let report_path = dir.path().join("report.json");

    let mut cli = args(&page);
    cli.save = Some(report_path.to_string_lossy().to_string());
    run(cli).unwrap();

    let report: PageReport =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert!(report.analysis.schema.is_none());
    assert!(report.summary.schema_score.is_none());
}

#[test]
fn test_run_missing_page_file() {
    let dir = tempdir().unwrap();
    let result = run(args(&dir.path().join("nope.json")));

    let err = result.unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to load page"));
}

#[test]
fn test_run_invalid_config_file() {
    let dir = tempdir().unwrap();
    let page = write_page(dir.path(), "page.json", "{}");
    let config = write_page(dir.path(), "bad.json", "{ not json");

    let mut cli = args(&page);
    cli.config = Some(config.to_string_lossy().to_string());

    let err = run(cli).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to load config file"));
}

#[test]
fn test_run_empty_page_succeeds() {
    let dir = tempdir().unwrap();
    let page = write_page(dir.path(), "page.json", "{}");

    assert!(run(args(&page)).is_ok());
}
