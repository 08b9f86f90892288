//! Content-type keyed title/description templates and the length-bounded
//! fitting rules applied to titles, descriptions and keyword lists.

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::config::SiteConfig;
use crate::keyword_analyzer::content_type_keywords;
use crate::models::{ContentType, Keyword, KeywordDensityReport};
use crate::text_metrics::{collapse_whitespace, normalize_term, normalize_words, plain_text};

const ELLIPSIS: &str = "...";
const SEPARATOR_CHARS: &[char] = &[' ', '|', '-', ':', '\u{2013}', '\u{2014}', '\u{00b7}', ','];

static REPEATED_SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*[|\-\u{2013}\u{2014}:\u{00b7}]\s*(?:[|\-\u{2013}\u{2014}:\u{00b7}]\s*)+")
        .expect("separator regex should be valid")
});

/// Descriptions derived from body text shorter than this fall back to the type default.
const MIN_DERIVED_DESCRIPTION: usize = 50;

#[derive(Debug, Clone, Copy)]
pub struct TitleTemplate {
    pub pattern: &'static str,
    pub triggers: &'static [&'static str],
    pub priority: u8,
}

/// Ordered title templates; the priority-1 entry is the type default.
pub fn title_templates(content_type: ContentType) -> &'static [TitleTemplate] {
    match content_type {
        ContentType::Homepage => &[
            TitleTemplate {
                pattern: "{siteName} - Restaurant Billing Software & POS",
                triggers: &[],
                priority: 1,
            },
            TitleTemplate {
                pattern: "{primaryKeyword} for Restaurants | {siteName}",
                triggers: &["billing", "pos", "software"],
                priority: 2,
            },
            TitleTemplate {
                pattern: "{siteName} | KOT & {secondaryKeyword}",
                triggers: &["kot", "kitchen"],
                priority: 3,
            },
        ],
        ContentType::ProductPage => &[
            TitleTemplate {
                pattern: "Restaurant POS Features | {siteName}",
                triggers: &[],
                priority: 1,
            },
            TitleTemplate {
                pattern: "{primaryKeyword} Features | {siteName}",
                triggers: &["billing", "inventory", "kot", "table", "reports"],
                priority: 2,
            },
        ],
        ContentType::BlogPost => &[
            TitleTemplate {
                pattern: "Restaurant Management Tips & Guides - {siteName}",
                triggers: &[],
                priority: 1,
            },
            TitleTemplate {
                pattern: "{primaryKeyword} Guide - {siteName}",
                triggers: &["billing", "gst", "guide", "management", "tips"],
                priority: 2,
            },
        ],
        ContentType::LandingPage => &[
            TitleTemplate {
                pattern: "Free Restaurant Billing Software | {siteName}",
                triggers: &[],
                priority: 1,
            },
            TitleTemplate {
                pattern: "{primaryKeyword} - Start Free | {siteName}",
                triggers: &["free", "trial", "pos", "billing"],
                priority: 2,
            },
        ],
        ContentType::CategoryPage => &[
            TitleTemplate {
                pattern: "Restaurant Software Solutions | {siteName}",
                triggers: &[],
                priority: 1,
            },
            TitleTemplate {
                pattern: "{primaryKeyword} Solutions | {siteName}",
                triggers: &["software", "tools", "management"],
                priority: 2,
            },
        ],
    }
}

fn default_description_pattern(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Homepage => {
            "{siteName} is restaurant billing software with KOT management, inventory \
             tracking and GST-ready invoices. Start your free trial today."
        }
        ContentType::ProductPage => {
            "Explore {siteName} features: fast billing, kitchen order tickets, table \
             management and real-time reports built for busy restaurants."
        }
        ContentType::BlogPost => {
            "Practical guides on restaurant billing, operations and growth from the \
             {siteName} team."
        }
        ContentType::LandingPage => {
            "Run your restaurant on {siteName}. Free billing software with KOT, \
             inventory and GST invoicing. Set up in minutes."
        }
        ContentType::CategoryPage => {
            "Browse {siteName} tools for restaurants, cafes and cloud kitchens: billing, \
             inventory, tables and reporting."
        }
    }
}

pub fn title_separator(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::BlogPost => " - ",
        _ => " | ",
    }
}

const PHRASE_CUES: &[(&str, [&str; 5])] = &[
    (
        "billing",
        [
            "Billing System",
            "Billing Features",
            "Billing Guide",
            "Free Billing Software",
            "Billing Tools",
        ],
    ),
    (
        "pos",
        [
            "POS Software",
            "POS Features",
            "POS Guide",
            "Free POS",
            "POS Tools",
        ],
    ),
    (
        "kot",
        [
            "KOT Software",
            "KOT Management",
            "KOT Guide",
            "KOT System",
            "KOT Tools",
        ],
    ),
    (
        "inventory",
        [
            "Inventory Management",
            "Inventory Tracking",
            "Inventory Tips",
            "Inventory Software",
            "Inventory Tools",
        ],
    ),
    (
        "gst",
        [
            "GST Billing",
            "GST Invoicing",
            "GST Guide",
            "GST Ready Billing",
            "GST Tools",
        ],
    ),
];

/// Short contextual phrase for a keyword, e.g. "billing" becomes "Billing System"
/// on the homepage and "Billing Guide" on a blog post.
pub fn keyword_phrase(content_type: ContentType, keyword: &str) -> Option<&'static str> {
    let index = match content_type {
        ContentType::Homepage => 0,
        ContentType::ProductPage => 1,
        ContentType::BlogPost => 2,
        ContentType::LandingPage => 3,
        ContentType::CategoryPage => 4,
    };
    let words = normalize_words(keyword);
    PHRASE_CUES
        .iter()
        .find(|(cue, _)| words.iter().any(|w| w == cue))
        .map(|(_, phrases)| phrases[index])
}

fn title_case(term: &str) -> String {
    term.split_whitespace()
        .map(|word| match word {
            "pos" | "kot" | "gst" | "qr" | "upi" | "crm" => word.to_uppercase(),
            _ => {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn take_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

/// Cuts `text` to at most `budget` chars, preferring the last space when it falls
/// after 80% of the budget.
pub fn cut_at_word_boundary(text: &str, budget: usize) -> String {
    if char_len(text) <= budget {
        return text.to_string();
    }

    let prefix = take_chars(text, budget);
    let next_is_break = text
        .chars()
        .nth(budget)
        .is_some_and(|c| c.is_whitespace());

    let cut = if next_is_break {
        prefix.clone()
    } else {
        match prefix.rfind(' ') {
            Some(pos) if char_len(&prefix[..pos]) as f64 > budget as f64 * 0.8 => {
                prefix[..pos].to_string()
            }
            _ => prefix.clone(),
        }
    };

    let trimmed = cut.trim_end_matches(SEPARATOR_CHARS).to_string();
    if trimmed.is_empty() { prefix } else { trimmed }
}

/// Hard truncation to `max` chars ending in an ellipsis.
pub fn hard_truncate(text: &str, max: usize) -> String {
    if char_len(text) <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    format!("{}{}", take_chars(text, keep).trim_end(), ELLIPSIS)
}

/// Bounds a description to `max` chars and guarantees terminal punctuation.
pub fn fit_description(description: &str, max: usize) -> String {
    let mut text = collapse_whitespace(description);

    if char_len(&text) > max {
        let budget = max.saturating_sub(ELLIPSIS.len());
        let cut = cut_at_word_boundary(&text, budget);
        let cut = cut.trim_end_matches(|c: char| c == '.' || SEPARATOR_CHARS.contains(&c));
        text = format!("{}{}", cut, ELLIPSIS);
    }

    if !text.ends_with(['.', '!', '?']) {
        if char_len(&text) + 1 > max {
            text = cut_at_word_boundary(&text, max.saturating_sub(1));
        }
        text.push('.');
    }

    text
}

fn site_name_regex(site_name: &str) -> Option<Regex> {
    Regex::new(&format!("(?i){}", regex::escape(site_name))).ok()
}

/// Case-insensitive count of `site_name` inside `text`.
pub fn count_site_name(text: &str, site_name: &str) -> usize {
    if site_name.is_empty() {
        return 0;
    }
    site_name_regex(site_name)
        .map(|re| re.find_iter(text).count())
        .unwrap_or(0)
}

fn strip_site_name(text: &str, site_name: &str) -> String {
    if site_name.is_empty() {
        return text.to_string();
    }
    let Some(re) = site_name_regex(site_name) else {
        return text.to_string();
    };
    let without = re.replace_all(text, " ");
    let collapsed = REPEATED_SEPARATORS.replace_all(&without, " | ");
    collapse_whitespace(collapsed.trim_matches(SEPARATOR_CHARS))
}

/// Fills and fits title/description templates for each content type.
pub struct TemplateEngine {
    config: Arc<SiteConfig>,
}

impl TemplateEngine {
    pub fn new(config: Arc<SiteConfig>) -> Self {
        Self { config }
    }

    fn site_name(&self) -> &str {
        self.config.site_name.trim()
    }

    /// Title bounded by `max_title_length` that carries the site name once.
    pub fn optimize_title(
        &self,
        title: &str,
        content_type: ContentType,
        analysis: Option<&KeywordDensityReport>,
    ) -> String {
        let max = self.config.max_title_length;
        let site = self.site_name();
        let title = collapse_whitespace(title);

        if title.is_empty() {
            return self.template_title(content_type, analysis);
        }

        if count_site_name(&title, site) == 1 && char_len(&title) <= max {
            return title;
        }

        let user = strip_site_name(&title, site);
        if user.is_empty() {
            return self.template_title(content_type, analysis);
        }

        let sep = title_separator(content_type);
        let budget = max.saturating_sub(char_len(sep) + char_len(site));
        if budget == 0 {
            return hard_truncate(&format!("{}{}{}", user, sep, site), max);
        }

        let mut user = cut_at_word_boundary(&user, budget);

        if let Some(phrase) = self.enhancement_phrase(&user, content_type, analysis) {
            let composed_len = char_len(&user) + char_len(sep) + char_len(site);
            let joiner = if sep.trim() == "-" { ": " } else { " - " };
            let candidate = format!("{}{}{}", user, joiner, phrase);
            if (composed_len as f64) < max as f64 * 0.7 && char_len(&candidate) <= budget {
                user = candidate;
            }
        }

        hard_truncate(&format!("{}{}{}", user, sep, site), max)
    }

    fn enhancement_phrase(
        &self,
        user_title: &str,
        content_type: ContentType,
        analysis: Option<&KeywordDensityReport>,
    ) -> Option<&'static str> {
        let keyword = analysis?.top_keyword()?;
        let lowered = user_title.to_lowercase();
        if lowered.contains(keyword) {
            return None;
        }
        keyword_phrase(content_type, keyword).filter(|phrase| !lowered.contains(&phrase.to_lowercase()))
    }

    /// Title generated purely from the content type's templates.
    pub fn template_title(
        &self,
        content_type: ContentType,
        analysis: Option<&KeywordDensityReport>,
    ) -> String {
        let max = self.config.max_title_length;
        let site = self.site_name();
        let templates = title_templates(content_type);

        let selected = analysis.and_then(|report| {
            let keyword = report.top_keyword()?;
            let words = normalize_words(keyword);
            templates
                .iter()
                .filter(|t| t.priority > 1)
                .filter(|t| t.triggers.iter().any(|trigger| words.iter().any(|w| w == trigger)))
                .find_map(|t| {
                    self.fill_title(t, Some(keyword), report.second_keyword())
                        .filter(|filled| char_len(filled) <= max && count_site_name(filled, site) == 1)
                        .inspect(|_| tracing::debug!(template = t.pattern, "Selected title template"))
                })
        });

        selected.unwrap_or_else(|| {
            let default = templates
                .iter()
                .min_by_key(|t| t.priority)
                .map(|t| t.pattern)
                .unwrap_or("{siteName}");
            hard_truncate(&default.replace("{siteName}", self.site_name()), max)
        })
    }

    fn fill_title(
        &self,
        template: &TitleTemplate,
        primary: Option<&str>,
        secondary: Option<&str>,
    ) -> Option<String> {
        let mut filled = template.pattern.replace("{siteName}", self.site_name());
        if filled.contains("{primaryKeyword}") {
            filled = filled.replace("{primaryKeyword}", &title_case(primary?));
        }
        if filled.contains("{secondaryKeyword}") {
            filled = filled.replace("{secondaryKeyword}", &title_case(secondary?));
        }
        Some(filled)
    }

    pub fn default_description(&self, content_type: ContentType) -> String {
        default_description_pattern(content_type).replace("{siteName}", self.site_name())
    }

    /// Description bounded by `max_description_length`, ending in `.`, `!` or `?`.
    pub fn optimize_description(
        &self,
        description: &str,
        content_type: ContentType,
        _analysis: Option<&KeywordDensityReport>,
    ) -> String {
        let description = collapse_whitespace(description);
        let source = if description.is_empty() {
            self.default_description(content_type)
        } else {
            description
        };
        fit_description(&source, self.config.max_description_length)
    }

    /// Leading sentences of the body text that fit the description budget.
    pub fn description_from_text(&self, raw_text: &str) -> Option<String> {
        let text = collapse_whitespace(&plain_text(raw_text));
        let max = self.config.max_description_length;

        let mut description = String::new();
        for sentence in text.split_inclusive(['.', '!', '?']) {
            let sentence = sentence.trim();
            if sentence.is_empty() {
                continue;
            }
            let next_len = char_len(&description) + char_len(sentence) + 1;
            if !description.is_empty() && next_len > max {
                break;
            }
            if !description.is_empty() {
                description.push(' ');
            }
            description.push_str(sentence);
            if char_len(&description) >= max {
                break;
            }
        }

        (char_len(&description) >= MIN_DERIVED_DESCRIPTION).then_some(description)
    }

    /// Target keywords merged with type defaults, de-duplicated and capped.
    pub fn optimize_keywords(&self, targets: &[Keyword], content_type: ContentType) -> String {
        let mut terms: Vec<String> = Vec::new();
        let candidates = targets
            .iter()
            .map(Keyword::normalized)
            .chain(content_type_keywords(content_type).iter().map(|k| normalize_term(k)));

        for term in candidates {
            if !term.is_empty() && !terms.contains(&term) {
                terms.push(term);
            }
        }

        terms.truncate(self.config.max_keywords);
        terms.join(", ")
    }
}
