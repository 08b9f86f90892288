use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::sync::Arc;
use url::Url;

use crate::canonical::UrlCanonicalizer;
use crate::config::SiteConfig;
use crate::keyword_analyzer::KeywordDensityAnalyzer;
use crate::models::{
    ArticleTags, ContentType, IssueSeverity, IssueType, KeywordDensityReport, MetaTagSet,
    OpenGraphTags, PageContent, SeoIssue, TwitterCardTags, ValidationReport,
};
use crate::templates::TemplateEngine;

const MIN_TITLE_LENGTH: usize = 30;
const MIN_DESCRIPTION_LENGTH: usize = 120;

/// `index|noindex, follow|nofollow`, plus `noarchive` for hidden pages or
/// snippet/preview hints for indexable ones.
pub fn robots_directive(no_index: bool, no_follow: bool) -> String {
    let mut parts = vec![
        if no_index { "noindex" } else { "index" },
        if no_follow { "nofollow" } else { "follow" },
    ];
    if no_index {
        parts.push("noarchive");
    } else {
        parts.extend(["max-snippet:-1", "max-image-preview:large", "max-video-preview:-1"]);
    }
    parts.join(", ")
}

/// Converts a date or datetime string into RFC 3339 / ISO 8601.
pub fn to_iso8601(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.to_rfc3339());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.and_utc().to_rfc3339());
    }
    if let Some(datetime) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Some(datetime.and_utc().to_rfc3339());
    }

    tracing::warn!(date = %raw, "Ignoring unparseable date");
    None
}

fn og_type(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::BlogPost => "article",
        ContentType::ProductPage => "product",
        _ => "website",
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Assembles the complete, length-valid `MetaTagSet` for a page.
pub struct MetaTagComposer {
    config: Arc<SiteConfig>,
    analyzer: Arc<KeywordDensityAnalyzer>,
    templates: TemplateEngine,
    canonicalizer: UrlCanonicalizer,
}

impl MetaTagComposer {
    pub fn new(config: Arc<SiteConfig>, analyzer: Arc<KeywordDensityAnalyzer>) -> Self {
        Self {
            templates: TemplateEngine::new(config.clone()),
            canonicalizer: UrlCanonicalizer::new(config.clone()),
            config,
            analyzer,
        }
    }

    pub fn templates(&self) -> &TemplateEngine {
        &self.templates
    }

    pub fn canonicalizer(&self) -> &UrlCanonicalizer {
        &self.canonicalizer
    }

    pub fn generate_canonical_url(&self, raw: &str) -> String {
        self.canonicalizer.canonicalize(raw)
    }

    pub fn generate_meta_tags(&self, page: &PageContent) -> MetaTagSet {
        let analysis = self.analyzer.analyze_page(page);
        self.compose(page, &analysis)
    }

    /// Like `generate_meta_tags`, reusing an analysis already computed for the page.
    pub fn compose(&self, page: &PageContent, analysis: &KeywordDensityReport) -> MetaTagSet {
        let content_type = page.content_type;

        let title = self
            .templates
            .optimize_title(&page.title, content_type, Some(analysis));

        let description_source = if page.description.trim().is_empty() {
            self.templates
                .description_from_text(&page.raw_text)
                .unwrap_or_default()
        } else {
            page.description.clone()
        };
        let description =
            self.templates
                .optimize_description(&description_source, content_type, Some(analysis));

        let keywords = self.templates.optimize_keywords(&page.keywords, content_type);
        let canonical = self.canonicalizer.canonicalize(&page.url);

        let image = non_empty(page.image.as_ref())
            .map(|img| self.canonicalizer.resolve(img).to_string())
            .unwrap_or_else(|| self.config.default_image.clone());

        let open_graph = self.open_graph(page, &title, &description, &canonical, &image);
        let twitter_card = self.twitter_card(&title, &description, &image);

        MetaTagSet {
            title,
            description,
            keywords,
            canonical,
            open_graph,
            twitter_card,
            robots: robots_directive(page.no_index, page.no_follow),
        }
    }

    fn open_graph(
        &self,
        page: &PageContent,
        title: &str,
        description: &str,
        canonical: &str,
        image: &str,
    ) -> OpenGraphTags {
        let article = page.content_type.is_article().then(|| {
            let published_time = page.published_date.as_deref().and_then(to_iso8601);
            let modified_time = page
                .modified_date
                .as_deref()
                .and_then(to_iso8601)
                .or_else(|| published_time.clone());

            ArticleTags {
                author: non_empty(page.author.as_ref())
                    .unwrap_or(&self.config.site_name)
                    .to_string(),
                published_time,
                modified_time,
                section: self.config.article_section.clone(),
                tags: self.config.article_tags.clone(),
            }
        });

        OpenGraphTags {
            og_title: title.to_string(),
            og_description: description.to_string(),
            og_url: canonical.to_string(),
            og_image: image.to_string(),
            og_image_alt: title.to_string(),
            og_type: og_type(page.content_type).to_string(),
            og_site_name: self.config.site_name.clone(),
            og_locale: self.config.locale.clone(),
            article,
        }
    }

    fn twitter_card(&self, title: &str, description: &str, image: &str) -> TwitterCardTags {
        TwitterCardTags {
            card: "summary_large_image".to_string(),
            site: self.config.twitter_handle.clone(),
            creator: self.config.twitter_handle.clone(),
            title: title.to_string(),
            description: description.to_string(),
            image: image.to_string(),
            image_alt: title.to_string(),
        }
    }

    /// Advisory checks over a composed tag set.
    pub fn validate_meta_tags(&self, tags: &MetaTagSet) -> ValidationReport {
        let mut findings = Vec::new();
        let max_title = self.config.max_title_length;
        let max_description = self.config.max_description_length;

        let title_len = tags.title.chars().count();
        if tags.title.trim().is_empty() {
            findings.push(SeoIssue {
                severity: IssueSeverity::Error,
                issue_type: IssueType::MissingTitle,
                message: "Title is empty".to_string(),
            });
        } else if title_len < MIN_TITLE_LENGTH {
            findings.push(SeoIssue {
                severity: IssueSeverity::Warning,
                issue_type: IssueType::TitleTooShort,
                message: format!(
                    "Title is too short ({} chars, recommended: {}-{})",
                    title_len, MIN_TITLE_LENGTH, max_title
                ),
            });
        } else if title_len > max_title {
            findings.push(SeoIssue {
                severity: IssueSeverity::Error,
                issue_type: IssueType::TitleTooLong,
                message: format!("Title is too long ({} chars, max: {})", title_len, max_title),
            });
        }

        let description_len = tags.description.chars().count();
        if tags.description.trim().is_empty() {
            findings.push(SeoIssue {
                severity: IssueSeverity::Error,
                issue_type: IssueType::MissingMetaDescription,
                message: "Meta description is empty".to_string(),
            });
        } else if description_len < MIN_DESCRIPTION_LENGTH {
            findings.push(SeoIssue {
                severity: IssueSeverity::Warning,
                issue_type: IssueType::MetaDescriptionTooShort,
                message: format!(
                    "Meta description is too short ({} chars, recommended: {}-{})",
                    description_len, MIN_DESCRIPTION_LENGTH, max_description
                ),
            });
        } else if description_len > max_description {
            findings.push(SeoIssue {
                severity: IssueSeverity::Error,
                issue_type: IssueType::MetaDescriptionTooLong,
                message: format!(
                    "Meta description is too long ({} chars, max: {})",
                    description_len, max_description
                ),
            });
        }

        let keyword_count = tags
            .keywords
            .split(',')
            .filter(|k| !k.trim().is_empty())
            .count();
        if keyword_count == 0 {
            findings.push(SeoIssue {
                severity: IssueSeverity::Warning,
                issue_type: IssueType::MissingKeywords,
                message: "No meta keywords".to_string(),
            });
        } else if keyword_count > self.config.max_keywords {
            findings.push(SeoIssue {
                severity: IssueSeverity::Warning,
                issue_type: IssueType::TooManyKeywords,
                message: format!(
                    "{} meta keywords (max: {})",
                    keyword_count, self.config.max_keywords
                ),
            });
        }

        if Url::parse(&tags.canonical).is_err() {
            findings.push(SeoIssue {
                severity: IssueSeverity::Error,
                issue_type: IssueType::InvalidCanonical,
                message: format!("Canonical URL '{}' is not absolute", tags.canonical),
            });
        }

        if tags.open_graph.og_title.trim().is_empty() {
            findings.push(SeoIssue {
                severity: IssueSeverity::Warning,
                issue_type: IssueType::MissingOgTitle,
                message: "Page is missing og:title".to_string(),
            });
        }
        if tags.open_graph.og_description.trim().is_empty() {
            findings.push(SeoIssue {
                severity: IssueSeverity::Warning,
                issue_type: IssueType::MissingOgDescription,
                message: "Page is missing og:description".to_string(),
            });
        }
        if tags.open_graph.og_image.trim().is_empty() {
            findings.push(SeoIssue {
                severity: IssueSeverity::Warning,
                issue_type: IssueType::MissingOgImage,
                message: "Page is missing og:image".to_string(),
            });
        }

        if tags.robots.split(',').any(|d| d.trim() == "noindex") {
            findings.push(SeoIssue {
                severity: IssueSeverity::Info,
                issue_type: IssueType::NoIndex,
                message: "Page is excluded from search indexes (noindex)".to_string(),
            });
        }

        ValidationReport::from_findings(findings)
    }
}
