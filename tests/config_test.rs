use metascout::cli::Cli;
use metascout::config::{Config, SiteConfig};
use metascout::topology::SiteTopology;
use std::fs;
use tempfile::tempdir;

fn cli() -> Cli {
    Cli {
        page: "page.json".to_string(),
        output: "text".to_string(),
        save: None,
        verbose: false,
        site_name: None,
        base_url: None,
        no_cache: false,
        config: None,
    }
}

fn run_with_config(config_name: &str, config_body: &str) -> std::process::Output {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join(config_name);
    fs::write(&config_path, config_body).unwrap();
    let page_path = dir.path().join("page.json");
    fs::write(&page_path, r#"{"title": "Pricing", "url": "/pricing"}"#).unwrap();

    std::process::Command::new(env!("CARGO_BIN_EXE_metascout"))
        .current_dir(dir.path())
        .arg(&page_path)
        .arg("--config")
        .arg(&config_path)
        .arg("--output")
        .arg("json")
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_cli_with_json_config() {
    let output = run_with_config(
        "config.json",
        r#"{
            "site_name": "Json Diner",
            "base_url": "https://json.example",
            "max_title_length": 50
        }"#,
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Pricing | Json Diner"));
    assert!(stdout.contains("https://json.example/pricing"));
}

#[test]
fn test_cli_with_toml_config() {
    let output = run_with_config(
        "config.toml",
        r#"
site_name = "Toml Tavern"
base_url = "https://toml.example"
twitter_handle = "@tomltavern"
"#,
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Pricing | Toml Tavern"));
    assert!(stdout.contains("@tomltavern"));
}

#[test]
fn test_cli_with_yaml_config() {
    let output = run_with_config(
        "config.yaml",
        "site_name: Yaml Yard\nbase_url: https://yaml.example\nlocale: en_GB\n",
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Pricing | Yaml Yard"));
    assert!(stdout.contains("en_GB"));
}

#[test]
fn test_cli_with_invalid_config_fails() {
    let output = run_with_config("config.toml", "site_name = [unterminated");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load config file"));
}

#[test]
fn test_cli_flag_overrides_config_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    fs::write(&config_path, r#"{"site_name": "File Name"}"#).unwrap();
    let page_path = dir.path().join("page.json");
    fs::write(&page_path, r#"{"title": "Pricing"}"#).unwrap();

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_metascout"))
        .current_dir(dir.path())
        .arg(&page_path)
        .arg("--config")
        .arg(&config_path)
        .arg("--site-name")
        .arg("Flag Name")
        .arg("--output")
        .arg("json")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Pricing | Flag Name"));
    assert!(!stdout.contains("File Name"));
}

#[test]
fn test_topology_overrides_from_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    fs::write(
        &config_path,
        r#"
base_url: https://bakery.example
pages:
  - url: /
    title: Home
    keywords: [bakery]
  - url: /sourdough
    title: Sourdough
    keywords: [sourdough bread]
    priority: 0.9
contextual_rules:
  - phrase: sourdough
    url: /sourdough
    anchor: our sourdough
    relevance: 0.9
"#,
    )
    .unwrap();

    let site: SiteConfig = Config::from_file(&config_path).unwrap().merge_with_cli(&cli());
    let topology = SiteTopology::from_config(&site);

    assert_eq!(topology.len(), 2);
    assert_eq!(topology.contextual_rules().len(), 1);
    assert_eq!(topology.get("/sourdough").map(|p| p.priority), Some(0.9));
    assert!(!topology.hubs().is_empty());
}
