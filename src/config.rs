use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::cli::Cli;
use crate::topology::{ContentHub, ContextualRule, TopologyPage};

pub const DEFAULT_SITE_NAME: &str = "BillByteKOT";
pub const DEFAULT_BASE_URL: &str = "https://billbytekot.in";

/// Optimal keyword density band, as fractions of total words.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityRange {
    pub min: f64,
    pub max: f64,
}

impl DensityRange {
    pub fn contains(&self, density: f64) -> bool {
        density >= self.min && density <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityTargets {
    pub primary: DensityRange,
    pub secondary: DensityRange,
}

impl Default for DensityTargets {
    fn default() -> Self {
        Self {
            primary: DensityRange {
                min: 0.01,
                max: 0.03,
            },
            secondary: DensityRange {
                min: 0.005,
                max: 0.02,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostalAddress {
    pub street_address: String,
    pub address_locality: String,
    pub address_region: String,
    pub postal_code: String,
    pub address_country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationInfo {
    pub legal_name: Option<String>,
    pub description: String,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub address: Option<PostalAddress>,
    pub same_as: Vec<String>,
    pub founding_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftwareInfo {
    pub application_category: String,
    pub operating_system: String,
    pub price: String,
    pub price_currency: String,
    pub rating_value: Option<f64>,
    pub rating_count: Option<u64>,
}

impl Default for SoftwareInfo {
    fn default() -> Self {
        Self {
            application_category: "BusinessApplication".to_string(),
            operating_system: "Web, Windows, Android".to_string(),
            price: "0".to_string(),
            price_currency: "INR".to_string(),
            rating_value: None,
            rating_count: None,
        }
    }
}

/// Resolved, immutable site configuration shared by every component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site_name: String,
    pub base_url: String,
    pub locale: String,
    pub twitter_handle: String,
    pub default_image: String,
    pub logo: String,
    pub organization: OrganizationInfo,
    pub software: SoftwareInfo,
    pub primary_keywords: Vec<String>,
    pub secondary_keywords: Vec<String>,
    pub density: DensityTargets,
    pub max_title_length: usize,
    pub max_description_length: usize,
    pub max_keywords: usize,
    /// Zero disables the keyword analysis cache.
    pub cache_capacity: usize,
    pub article_section: String,
    pub article_tags: Vec<String>,
    pub pages: Option<Vec<TopologyPage>>,
    pub hubs: Option<Vec<ContentHub>>,
    pub contextual_rules: Option<Vec<ContextualRule>>,
    pub anchor_variations: Option<BTreeMap<String, Vec<String>>>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: DEFAULT_SITE_NAME.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            locale: "en_IN".to_string(),
            twitter_handle: "@billbytekot".to_string(),
            default_image: format!("{}/og-image.png", DEFAULT_BASE_URL),
            logo: format!("{}/logo.png", DEFAULT_BASE_URL),
            organization: OrganizationInfo {
                description: "Restaurant billing and KOT management software for cafes, \
                              restaurants and cloud kitchens."
                    .to_string(),
                email: Some("support@billbytekot.in".to_string()),
                ..Default::default()
            },
            software: SoftwareInfo::default(),
            primary_keywords: vec![
                "restaurant billing software".to_string(),
                "restaurant pos".to_string(),
                "kot software".to_string(),
            ],
            secondary_keywords: vec![
                "billing app".to_string(),
                "gst billing".to_string(),
                "inventory management".to_string(),
                "table management".to_string(),
                "cafe billing".to_string(),
            ],
            density: DensityTargets::default(),
            max_title_length: 60,
            max_description_length: 155,
            max_keywords: 10,
            cache_capacity: 100,
            article_section: "Restaurant Management".to_string(),
            article_tags: vec![
                "Restaurant Billing".to_string(),
                "POS".to_string(),
                "Restaurant Technology".to_string(),
            ],
            pages: None,
            hubs: None,
            contextual_rules: None,
            anchor_variations: None,
        }
    }
}

impl SiteConfig {
    /// Base URL parsed as an absolute http(s) URL, or the built-in default.
    pub fn base(&self) -> Url {
        parse_http_url(&self.base_url)
            .or_else(|| parse_http_url(DEFAULT_BASE_URL))
            .unwrap_or_else(|| crate::canonical::FALLBACK_URL.clone())
    }

    /// `base_url` without a trailing slash, for string joins.
    pub fn base_str(&self) -> String {
        self.base().as_str().trim_end_matches('/').to_string()
    }
}

fn parse_http_url(raw: &str) -> Option<Url> {
    Url::parse(raw.trim())
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
}

/// Configuration file structure. All fields are optional to allow partial configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub site_name: Option<String>,
    pub base_url: Option<String>,
    pub locale: Option<String>,
    pub twitter_handle: Option<String>,
    pub default_image: Option<String>,
    pub logo: Option<String>,
    pub organization: Option<OrganizationInfo>,
    pub software: Option<SoftwareInfo>,
    pub primary_keywords: Option<Vec<String>>,
    pub secondary_keywords: Option<Vec<String>>,
    pub density: Option<DensityTargets>,
    pub max_title_length: Option<usize>,
    pub max_description_length: Option<usize>,
    pub max_keywords: Option<usize>,
    pub cache_capacity: Option<usize>,
    pub article_section: Option<String>,
    pub article_tags: Option<Vec<String>>,
    pub pages: Option<Vec<TopologyPage>>,
    pub hubs: Option<Vec<ContentHub>>,
    pub contextual_rules: Option<Vec<ContextualRule>>,
    pub anchor_variations: Option<BTreeMap<String, Vec<String>>>,
}

/// Configuration file format based on file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                "toml" => Some(ConfigFormat::Toml),
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                _ => None,
            })
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            ConfigFormat::Json => &["json"],
            ConfigFormat::Toml => &["toml"],
            ConfigFormat::Yaml => &["yaml", "yml"],
        }
    }
}

/// Reads a JSON, TOML or YAML file into `T`, picking the parser from the extension.
pub fn read_structured_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let format = ConfigFormat::from_path(path)
        .with_context(|| format!("Unsupported file format: {}", path.display()))?;

    let value = match format {
        ConfigFormat::Json => serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON: {}", path.display()))?,
        ConfigFormat::Toml => toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML: {}", path.display()))?,
        ConfigFormat::Yaml => serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML: {}", path.display()))?,
    };

    Ok(value)
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        read_structured_file(path).context("Failed to load config file")
    }

    /// Default configuration file paths, current directory first, then the user config directory
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for format in &[ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml] {
            for ext in format.extensions() {
                paths.push(PathBuf::from(format!("metascout.{}", ext)));
            }
        }

        // Use XDG_CONFIG_HOME if set, otherwise fall back to ~/.config
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .and_then(|p| {
                if p.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(p))
                }
            })
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

        if let Some(config_home) = config_home {
            let app_dir = config_home.join("metascout");
            for format in &[ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml] {
                for ext in format.extensions() {
                    paths.push(app_dir.join(format!("config.{}", ext)));
                }
            }
        }

        paths
    }

    /// Returns the first configuration file found, or None if no config exists
    pub fn from_default_paths() -> Result<Option<Self>> {
        for path in Self::default_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading config file");
                return Ok(Some(Self::from_file(&path)?));
            }
        }
        Ok(None)
    }

    /// Resolve into a `SiteConfig`. CLI arguments take precedence over file values,
    /// file values over built-in defaults.
    pub fn merge_with_cli(&self, cli: &Cli) -> SiteConfig {
        let defaults = SiteConfig::default();

        let base_url = cli
            .base_url
            .clone()
            .or_else(|| self.base_url.clone())
            .filter(|raw| {
                let valid = parse_http_url(raw).is_some();
                if !valid {
                    tracing::warn!(base_url = %raw, "Ignoring invalid base URL");
                }
                valid
            })
            .unwrap_or(defaults.base_url);

        SiteConfig {
            site_name: cli
                .site_name
                .clone()
                .or_else(|| self.site_name.clone())
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.site_name),
            default_image: self
                .default_image
                .clone()
                .unwrap_or_else(|| format!("{}/og-image.png", base_url.trim_end_matches('/'))),
            logo: self
                .logo
                .clone()
                .unwrap_or_else(|| format!("{}/logo.png", base_url.trim_end_matches('/'))),
            base_url,
            locale: self.locale.clone().unwrap_or(defaults.locale),
            twitter_handle: self.twitter_handle.clone().unwrap_or(defaults.twitter_handle),
            organization: self.organization.clone().unwrap_or(defaults.organization),
            software: self.software.clone().unwrap_or(defaults.software),
            primary_keywords: self
                .primary_keywords
                .clone()
                .unwrap_or(defaults.primary_keywords),
            secondary_keywords: self
                .secondary_keywords
                .clone()
                .unwrap_or(defaults.secondary_keywords),
            density: self.density.unwrap_or(defaults.density),
            max_title_length: self.max_title_length.unwrap_or(defaults.max_title_length),
            max_description_length: self
                .max_description_length
                .unwrap_or(defaults.max_description_length),
            max_keywords: self.max_keywords.unwrap_or(defaults.max_keywords),
            cache_capacity: if cli.no_cache {
                0
            } else {
                self.cache_capacity.unwrap_or(defaults.cache_capacity)
            },
            article_section: self
                .article_section
                .clone()
                .unwrap_or(defaults.article_section),
            article_tags: self.article_tags.clone().unwrap_or(defaults.article_tags),
            pages: self.pages.clone(),
            hubs: self.hubs.clone(),
            contextual_rules: self.contextual_rules.clone(),
            anchor_variations: self.anchor_variations.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::NamedTempFile;

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

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.json")),
            Some(ConfigFormat::Json)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.TOML")),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("config.yml")),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("config.txt")), None);
    }

    #[test]
    fn test_load_toml_config_with_density() {
        let toml_content = r#"
site_name = "Acme Eats"
base_url = "https://acme.example"
primary_keywords = ["food delivery"]

[density.primary]
min = 0.02
max = 0.04

[density.secondary]
min = 0.01
max = 0.02
        "#;

        let temp_file = NamedTempFile::new().unwrap();
        let temp_path = temp_file.path().with_extension("toml");
        fs::write(&temp_path, toml_content).unwrap();

        let config = Config::from_file(&temp_path).unwrap();
        assert_eq!(config.site_name.as_deref(), Some("Acme Eats"));
        assert_eq!(config.primary_keywords, Some(vec!["food delivery".to_string()]));
        let density = config.density.unwrap();
        assert_eq!(density.primary.min, 0.02);
        assert!(density.secondary.contains(0.015));

        fs::remove_file(temp_path).ok();
    }

    #[test]
    fn test_unsupported_format() {
        let temp_file = NamedTempFile::new().unwrap();
        let temp_path = temp_file.path().with_extension("txt");
        fs::write(&temp_path, "content").unwrap();

        assert!(Config::from_file(&temp_path).is_err());

        fs::remove_file(temp_path).ok();
    }

    #[test]
    fn test_merge_uses_defaults_for_missing_values() {
        let site = Config::default().merge_with_cli(&cli());
        assert_eq!(site, SiteConfig::default());
    }

    #[test]
    fn test_merge_cli_overrides_file() {
        let config = Config {
            site_name: Some("File Name".to_string()),
            base_url: Some("https://file.example".to_string()),
            cache_capacity: Some(5),
            ..Default::default()
        };
        let mut args = cli();
        args.site_name = Some("Cli Name".to_string());
        args.no_cache = true;

        let site = config.merge_with_cli(&args);
        assert_eq!(site.site_name, "Cli Name");
        assert_eq!(site.base_url, "https://file.example");
        assert_eq!(site.default_image, "https://file.example/og-image.png");
        assert_eq!(site.cache_capacity, 0);
    }

    #[test]
    fn test_merge_rejects_invalid_base_url() {
        let config = Config {
            base_url: Some("not a url".to_string()),
            ..Default::default()
        };
        let site = config.merge_with_cli(&cli());
        assert_eq!(site.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_base_str_has_no_trailing_slash() {
        let site = SiteConfig::default();
        assert_eq!(site.base_str(), "https://billbytekot.in");
    }

    #[test]
    #[serial]
    fn test_default_paths_with_xdg_config_home() {
        use std::env;

        unsafe {
            env::set_var("XDG_CONFIG_HOME", "/custom/config/path");
        }

        let paths = Config::default_paths();
        assert!(
            paths
                .iter()
                .any(|p| p.to_string_lossy().contains("/custom/config/path/metascout"))
        );
        assert!(
            paths
                .iter()
                .any(|p| p.to_string_lossy() == "metascout.json")
        );

        unsafe {
            env::remove_var("XDG_CONFIG_HOME");
        }
    }

    #[test]
    #[serial]
    fn test_from_default_paths_finds_current_dir_config() {
        use std::env;
        use tempfile::tempdir;

        let temp_dir = tempdir().unwrap();
        let original_dir = env::current_dir().unwrap();
        env::set_current_dir(&temp_dir).unwrap();

        fs::write(
            temp_dir.path().join("metascout.yaml"),
            "site_name: Yaml Site\nmax_keywords: 5\n",
        )
        .unwrap();

        let config = Config::from_default_paths().unwrap().unwrap();
        assert_eq!(config.site_name.as_deref(), Some("Yaml Site"));
        assert_eq!(config.max_keywords, Some(5));

        env::set_current_dir(original_dir).unwrap();
    }
}
