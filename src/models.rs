use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::text_metrics::{ReadabilityScore, normalize_term};

/// The kind of page being optimized. Drives template, keyword and schema defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Homepage,
    ProductPage,
    BlogPost,
    LandingPage,
    CategoryPage,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Homepage,
        ContentType::ProductPage,
        ContentType::BlogPost,
        ContentType::LandingPage,
        ContentType::CategoryPage,
    ];

    /// Parses a loose label such as `"blog-post"`, `"Product"` or `"landing_page"`.
    /// Unknown labels resolve to `Homepage` so metadata keeps its homepage defaults.
    pub fn from_label(label: &str) -> Self {
        let key: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "homepage" | "home" | "" => ContentType::Homepage,
            "productpage" | "product" | "feature" | "featurepage" => ContentType::ProductPage,
            "blogpost" | "blog" | "post" | "article" => ContentType::BlogPost,
            "landingpage" | "landing" => ContentType::LandingPage,
            "categorypage" | "category" => ContentType::CategoryPage,
            _ => {
                tracing::warn!(label = %label, "Unsupported content type, using homepage defaults");
                ContentType::Homepage
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Homepage => "homepage",
            ContentType::ProductPage => "product_page",
            ContentType::BlogPost => "blog_post",
            ContentType::LandingPage => "landing_page",
            ContentType::CategoryPage => "category_page",
        }
    }

    pub fn is_article(&self) -> bool {
        matches!(self, ContentType::BlogPost)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ContentType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(ContentType::from_label(&raw))
    }
}

/// A target keyword as supplied by callers: either a bare term or a research record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Keyword {
    Term(String),
    Record(KeywordRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRecord {
    pub term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_volume: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
}

impl Keyword {
    pub fn term(&self) -> &str {
        match self {
            Keyword::Term(term) => term,
            Keyword::Record(record) => &record.term,
        }
    }

    /// Lowercased, whitespace-collapsed term used for every comparison.
    pub fn normalized(&self) -> String {
        normalize_term(self.term())
    }
}

impl From<&str> for Keyword {
    fn from(term: &str) -> Self {
        Keyword::Term(term.to_string())
    }
}

impl From<String> for Keyword {
    fn from(term: String) -> Self {
        Keyword::Term(term)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub name: String,
    pub url: String,
}

/// Description of a page handed to the engine by the host renderer.
/// Every field is optional on the wire; empty strings count as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageContent {
    pub title: String,
    pub description: String,
    pub raw_text: String,
    pub keywords: Vec<Keyword>,
    pub url: String,
    pub content_type: ContentType,
    pub image: Option<String>,
    pub author: Option<String>,
    pub published_date: Option<String>,
    pub modified_date: Option<String>,
    pub no_index: bool,
    pub no_follow: bool,
    pub faqs: Vec<FaqItem>,
    pub breadcrumbs: Vec<Breadcrumb>,
}

impl PageContent {
    pub fn keyword_terms(&self) -> Vec<String> {
        self.keywords
            .iter()
            .map(Keyword::normalized)
            .filter(|term| !term.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DensityStatus {
    Unclassified,
    Below,
    Optimal,
    Above,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordStats {
    pub exact_matches: usize,
    pub partial_matches: usize,
    pub density: f64,
    pub partial_density: f64,
    pub is_target: bool,
    pub is_primary: bool,
    pub is_secondary: bool,
    pub status: DensityStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationKind {
    Increase,
    Decrease,
    UseExactPhrase,
    AddContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecommendationPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub keyword: Option<String>,
    pub kind: RecommendationKind,
    pub priority: RecommendationPriority,
    pub current_density: f64,
    pub target_min: f64,
    pub target_max: f64,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordDensityReport {
    pub total_words: usize,
    pub per_keyword: BTreeMap<String, KeywordStats>,
    pub recommendations: Vec<Recommendation>,
    pub score: u8,
    pub primary_keywords: Vec<String>,
    pub secondary_keywords: Vec<String>,
}

impl KeywordDensityReport {
    pub fn top_keyword(&self) -> Option<&str> {
        self.primary_keywords.first().map(String::as_str)
    }

    pub fn second_keyword(&self) -> Option<&str> {
        self.primary_keywords
            .get(1)
            .or_else(|| self.secondary_keywords.first())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenGraphTags {
    pub og_title: String,
    pub og_description: String,
    pub og_url: String,
    pub og_image: String,
    pub og_image_alt: String,
    pub og_type: String,
    pub og_site_name: String,
    pub og_locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<ArticleTags>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleTags {
    pub author: String,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub section: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwitterCardTags {
    pub card: String,
    pub site: String,
    pub creator: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub image_alt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaTagSet {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub canonical: String,
    pub open_graph: OpenGraphTags,
    pub twitter_card: TwitterCardTags,
    pub robots: String,
}

/// JSON-LD document: a single schema.org node or an `@graph` of nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDocument(pub serde_json::Value);

impl SchemaDocument {
    pub fn schema_type(&self) -> Option<&str> {
        self.0.get("@type").and_then(|t| t.as_str())
    }

    /// Nodes of an `@graph` document, or the document itself as a single node.
    pub fn nodes(&self) -> Vec<&serde_json::Value> {
        match self.0.get("@graph").and_then(|g| g.as_array()) {
            Some(graph) => graph.iter().collect(),
            None => vec![&self.0],
        }
    }

    pub fn node_types(&self) -> Vec<&str> {
        self.nodes()
            .into_iter()
            .filter_map(|node| node.get("@type").and_then(|t| t.as_str()))
            .collect()
    }

    pub fn to_json_ld(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkType {
    Contextual,
    KeywordBased,
    HubPillar,
    HubFeature,
    Breadcrumb,
    Navigation,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Contextual => "contextual",
            LinkType::KeywordBased => "keyword-based",
            LinkType::HubPillar => "hub-pillar",
            LinkType::HubFeature => "hub-feature",
            LinkType::Breadcrumb => "breadcrumb",
            LinkType::Navigation => "navigation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSuggestion {
    pub url: String,
    pub title: String,
    pub anchor_text: String,
    pub relevance_score: f64,
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub final_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoIssue {
    pub severity: IssueSeverity,
    pub issue_type: IssueType,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueSeverity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueType {
    MissingTitle,
    TitleTooShort,
    TitleTooLong,
    MissingMetaDescription,
    MetaDescriptionTooShort,
    MetaDescriptionTooLong,
    MissingKeywords,
    TooManyKeywords,
    InvalidCanonical,
    MissingOgTitle,
    MissingOgDescription,
    MissingOgImage,
    NoIndex,
    InvalidUrl,
    InsecureScheme,
    UrlTooLong,
    UppercaseInUrl,
    UnderscoreInUrl,
    TrackingParameter,
    DeepUrl,
    DoubleSlash,
    FileExtension,
    MalformedSchema,
    MissingSchemaContext,
    MissingSchemaType,
    UnknownSchemaType,
    MissingRequiredProperty,
    ShortPropertyValue,
}

/// Advisory result of `validate_*` checks. Never blocks generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<SeoIssue>,
    pub warnings: Vec<SeoIssue>,
    pub score: u8,
}

impl ValidationReport {
    /// Splits collected findings by severity and derives the score:
    /// 20 points per error, 5 per warning, 1 per info.
    pub fn from_findings(findings: Vec<SeoIssue>) -> Self {
        let (issues, warnings): (Vec<_>, Vec<_>) = findings
            .into_iter()
            .partition(|issue| issue.severity == IssueSeverity::Error);

        let penalty: u32 = issues.len() as u32 * 20
            + warnings
                .iter()
                .map(|w| match w.severity {
                    IssueSeverity::Info => 1,
                    _ => 5,
                })
                .sum::<u32>();

        Self {
            is_valid: issues.is_empty(),
            issues,
            warnings,
            score: 100u32.saturating_sub(penalty) as u8,
        }
    }
}

/// Everything the engine derives from one `PageContent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub keyword_report: KeywordDensityReport,
    pub readability: ReadabilityScore,
    pub meta_tags: MetaTagSet,
    pub meta_validation: ValidationReport,
    pub url_validation: ValidationReport,
    pub schema: Option<SchemaDocument>,
    pub schema_validation: Option<ValidationReport>,
    pub links: Vec<LinkSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageReport {
    pub url: String,
    pub content_type: ContentType,
    pub analysis: PageAnalysis,
    pub summary: ReportSummary,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub keyword_score: u8,
    pub meta_score: u8,
    pub schema_score: Option<u8>,
    pub link_count: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}
