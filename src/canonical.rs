use once_cell::sync::Lazy;
use std::sync::Arc;
use url::Url;

use crate::config::{DEFAULT_BASE_URL, SiteConfig};
use crate::models::{IssueSeverity, IssueType, SeoIssue, ValidationReport};

pub static FALLBACK_URL: Lazy<Url> =
    Lazy::new(|| Url::parse(DEFAULT_BASE_URL).expect("default base URL should be valid"));

const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid"];
const TRACKING_PREFIX: &str = "utm_";
const MAX_URL_LENGTH: usize = 100;
const MAX_PATH_DEPTH: usize = 4;
const FILE_EXTENSIONS: &[&str] = &[".html", ".htm", ".php", ".asp", ".aspx", ".jsp"];

pub fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with(TRACKING_PREFIX) || TRACKING_PARAMS.contains(&key.as_str())
}

/// Percent-decoded key of a raw `key=value` query pair.
fn query_key(pair: &str) -> String {
    url::form_urlencoded::parse(pair.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_default()
}

/// Normalizes URLs into their canonical form and reports on URL hygiene.
pub struct UrlCanonicalizer {
    config: Arc<SiteConfig>,
}

impl UrlCanonicalizer {
    pub fn new(config: Arc<SiteConfig>) -> Self {
        Self { config }
    }

    /// Resolves `raw` to an absolute http(s) URL. Relative paths are joined onto the
    /// base URL; anything unparseable falls back to the base URL itself.
    pub fn resolve(&self, raw: &str) -> Url {
        let base = self.config.base();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return base;
        }

        match Url::parse(trimmed) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => url,
            Ok(url) => {
                tracing::warn!(url = %trimmed, scheme = url.scheme(), "Unsupported URL scheme, using base URL");
                base
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                base.join(trimmed).unwrap_or_else(|e| {
                    tracing::warn!(url = %trimmed, error = %e, "Failed to resolve relative URL");
                    base.clone()
                })
            }
            Err(e) => {
                tracing::warn!(url = %trimmed, error = %e, "Failed to parse URL, using base URL");
                base
            }
        }
    }

    /// Canonical form: tracking parameters removed, fragment dropped, path lowercased,
    /// trailing slash removed when nothing follows it. Idempotent.
    pub fn canonicalize(&self, raw: &str) -> String {
        let mut url = self.resolve(raw);
        url.set_fragment(None);

        let kept: Vec<String> = url
            .query()
            .map(|query| {
                query
                    .split('&')
                    .filter(|pair| !pair.is_empty() && !is_tracking_param(&query_key(pair)))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&kept.join("&")));
        }

        let mut path = url.path().to_lowercase();
        if url.query().is_none() && path.len() > 1 && path.ends_with('/') {
            path = path.trim_end_matches('/').to_string();
            if path.is_empty() {
                path.push('/');
            }
        }
        url.set_path(&path);

        url.to_string()
    }

    /// Advisory report on URL structure. Never fails.
    pub fn validate_url_structure(&self, raw: &str) -> ValidationReport {
        let mut findings = Vec::new();
        let trimmed = raw.trim();

        let url = match Url::parse(trimmed) {
            Ok(url) => url,
            Err(e) => {
                findings.push(SeoIssue {
                    severity: IssueSeverity::Error,
                    issue_type: IssueType::InvalidUrl,
                    message: format!("URL '{}' is not a valid absolute URL: {}", trimmed, e),
                });
                return ValidationReport::from_findings(findings);
            }
        };

        match url.scheme() {
            "https" => {}
            "http" => findings.push(SeoIssue {
                severity: IssueSeverity::Warning,
                issue_type: IssueType::InsecureScheme,
                message: "URL uses http; prefer https".to_string(),
            }),
            scheme => findings.push(SeoIssue {
                severity: IssueSeverity::Error,
                issue_type: IssueType::InvalidUrl,
                message: format!("Unsupported URL scheme '{}'", scheme),
            }),
        }

        if trimmed.chars().count() > MAX_URL_LENGTH {
            findings.push(SeoIssue {
                severity: IssueSeverity::Warning,
                issue_type: IssueType::UrlTooLong,
                message: format!(
                    "URL is {} chars long (recommended: under {})",
                    trimmed.chars().count(),
                    MAX_URL_LENGTH
                ),
            });
        }

        let path = url.path();
        if path.chars().any(|c| c.is_uppercase()) {
            findings.push(SeoIssue {
                severity: IssueSeverity::Warning,
                issue_type: IssueType::UppercaseInUrl,
                message: "URL path contains uppercase characters".to_string(),
            });
        }
        if path.contains('_') {
            findings.push(SeoIssue {
                severity: IssueSeverity::Info,
                issue_type: IssueType::UnderscoreInUrl,
                message: "URL path uses underscores; hyphens are preferred".to_string(),
            });
        }
        if path.contains("//") {
            findings.push(SeoIssue {
                severity: IssueSeverity::Warning,
                issue_type: IssueType::DoubleSlash,
                message: "URL path contains a double slash".to_string(),
            });
        }

        let depth = path.split('/').filter(|s| !s.is_empty()).count();
        if depth > MAX_PATH_DEPTH {
            findings.push(SeoIssue {
                severity: IssueSeverity::Info,
                issue_type: IssueType::DeepUrl,
                message: format!("URL is {} levels deep (recommended: {} or fewer)", depth, MAX_PATH_DEPTH),
            });
        }

        let lowered = path.to_lowercase();
        if FILE_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext)) {
            findings.push(SeoIssue {
                severity: IssueSeverity::Info,
                issue_type: IssueType::FileExtension,
                message: "URL exposes a file extension".to_string(),
            });
        }

        let tracking: Vec<String> = url
            .query_pairs()
            .map(|(key, _)| key.into_owned())
            .filter(|key| is_tracking_param(key))
            .collect();
        if !tracking.is_empty() {
            findings.push(SeoIssue {
                severity: IssueSeverity::Warning,
                issue_type: IssueType::TrackingParameter,
                message: format!("URL carries tracking parameters: {}", tracking.join(", ")),
            });
        }

        ValidationReport::from_findings(findings)
    }
}
