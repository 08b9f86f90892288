use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::cache::Cache;
use crate::config::{DensityRange, SiteConfig};
use crate::models::{
    ContentType, DensityStatus, Keyword, KeywordDensityReport, KeywordStats, PageContent,
    Recommendation, RecommendationKind, RecommendationPriority,
};
use crate::text_metrics::{
    is_significant, normalize_term, normalize_words, phrase_occurrences, plain_text,
};

/// Below this many words the page is flagged as thin.
const THIN_CONTENT_WORDS: usize = 300;

const TARGET_POINTS: f64 = 30.0;
const PRIMARY_POINTS: f64 = 20.0;
const SECONDARY_POINTS: f64 = 10.0;

/// Keywords every page of a given type is expected to mention.
pub fn content_type_keywords(content_type: ContentType) -> &'static [&'static str] {
    match content_type {
        ContentType::Homepage => &[
            "restaurant billing software",
            "restaurant pos",
            "kot software",
            "billing software",
        ],
        ContentType::ProductPage => &[
            "restaurant billing",
            "pos features",
            "kot management",
            "inventory management",
        ],
        ContentType::BlogPost => &[
            "restaurant management",
            "restaurant billing",
            "restaurant tips",
        ],
        ContentType::LandingPage => &[
            "free restaurant billing software",
            "restaurant pos",
            "billing app",
        ],
        ContentType::CategoryPage => &["restaurant software", "restaurant management tools"],
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct KeywordFlags {
    is_target: bool,
    is_primary: bool,
    is_secondary: bool,
}

/// Computes keyword density against target ranges and memoizes the reports.
pub struct KeywordDensityAnalyzer {
    config: Arc<SiteConfig>,
    cache: Cache<String, KeywordDensityReport>,
}

impl KeywordDensityAnalyzer {
    pub fn new(config: Arc<SiteConfig>) -> Self {
        let cache = Cache::new(config.cache_capacity);
        Self { config, cache }
    }

    pub fn with_cache(config: Arc<SiteConfig>, cache: Cache<String, KeywordDensityReport>) -> Self {
        Self { config, cache }
    }

    pub fn cache(&self) -> &Cache<String, KeywordDensityReport> {
        &self.cache
    }

    pub fn analyze_page(&self, page: &PageContent) -> KeywordDensityReport {
        self.analyze(&page.raw_text, &page.keywords, page.content_type)
    }

    /// Analyzes `content` for the target keywords. Empty content yields a zeroed report.
    pub fn analyze(
        &self,
        content: &str,
        target_keywords: &[Keyword],
        content_type: ContentType,
    ) -> KeywordDensityReport {
        let targets: Vec<String> = target_keywords
            .iter()
            .map(Keyword::normalized)
            .filter(|term| !term.is_empty())
            .collect();

        let key = cache_key(content, &targets, content_type);
        if let Some(report) = self.cache.get(&key) {
            tracing::debug!(content_type = %content_type, "Keyword analysis cache hit");
            return report;
        }

        let report = self.compute(content, &targets, content_type);
        self.cache.insert(key, report.clone());
        report
    }

    fn compute(
        &self,
        content: &str,
        targets: &[String],
        content_type: ContentType,
    ) -> KeywordDensityReport {
        let words = normalize_words(&plain_text(content));
        if words.is_empty() {
            return KeywordDensityReport::default();
        }

        let total_words = words.len();
        let mut token_counts: HashMap<&str, usize> = HashMap::new();
        for word in words.iter().filter(|w| is_significant(w)) {
            *token_counts.entry(word.as_str()).or_insert(0) += 1;
        }

        let universe = self.keyword_universe(targets, content_type);
        let density_targets = self.config.density;

        let mut per_keyword = BTreeMap::new();
        let mut recommendations = Vec::new();
        let mut points = 0.0;
        let mut classified = 0usize;

        for (term, flags) in universe {
            let phrase = normalize_words(&term);
            if phrase.is_empty() {
                continue;
            }

            let exact_matches = if phrase.len() == 1 {
                if is_significant(&phrase[0]) {
                    token_counts.get(phrase[0].as_str()).copied().unwrap_or(0)
                } else {
                    0
                }
            } else {
                phrase_occurrences(&words, &phrase)
            };

            let mut constituents: Vec<&str> = phrase
                .iter()
                .map(String::as_str)
                .filter(|w| is_significant(w))
                .collect();
            constituents.sort_unstable();
            constituents.dedup();
            let partial_matches: usize = constituents
                .iter()
                .map(|w| token_counts.get(w).copied().unwrap_or(0))
                .sum();

            let density = exact_matches as f64 / total_words as f64;
            let partial_density = partial_matches as f64 / total_words as f64;

            let range = if flags.is_target || flags.is_primary {
                Some(density_targets.primary)
            } else if flags.is_secondary {
                Some(density_targets.secondary)
            } else {
                None
            };

            let status = match range {
                None => DensityStatus::Unclassified,
                Some(r) if density < r.min => DensityStatus::Below,
                Some(r) if density > r.max => DensityStatus::Above,
                Some(_) => DensityStatus::Optimal,
            };

            if let Some(range) = range {
                classified += 1;
                if status == DensityStatus::Optimal {
                    points += if flags.is_target {
                        TARGET_POINTS
                    } else if flags.is_primary {
                        PRIMARY_POINTS
                    } else {
                        SECONDARY_POINTS
                    };
                }
                if let Some(rec) = recommend(
                    &term,
                    flags,
                    status,
                    range,
                    density,
                    phrase.len() > 1 && exact_matches == 0 && partial_matches > 0,
                ) {
                    recommendations.push(rec);
                }
            }

            per_keyword.insert(
                term,
                KeywordStats {
                    exact_matches,
                    partial_matches,
                    density,
                    partial_density,
                    is_target: flags.is_target,
                    is_primary: flags.is_primary,
                    is_secondary: flags.is_secondary,
                    status,
                },
            );
        }

        if total_words < THIN_CONTENT_WORDS {
            recommendations.push(Recommendation {
                keyword: None,
                kind: RecommendationKind::AddContent,
                priority: RecommendationPriority::Low,
                current_density: 0.0,
                target_min: 0.0,
                target_max: 0.0,
                message: format!(
                    "Content has {} words; aim for at least {} to rank reliably",
                    total_words, THIN_CONTENT_WORDS
                ),
            });
        }
        recommendations.sort_by_key(|rec| rec.priority);

        let denominator = (classified as f64 * 10.0).max(100.0);
        let score = (100.0 * points / denominator).min(100.0).round() as u8;

        let (primary_keywords, secondary_keywords) = rank_keywords(&per_keyword);

        KeywordDensityReport {
            total_words,
            per_keyword,
            recommendations,
            score,
            primary_keywords,
            secondary_keywords,
        }
    }

    fn keyword_universe(
        &self,
        targets: &[String],
        content_type: ContentType,
    ) -> BTreeMap<String, KeywordFlags> {
        let mut universe: BTreeMap<String, KeywordFlags> = BTreeMap::new();

        for term in targets {
            universe.entry(term.clone()).or_default().is_target = true;
        }
        for term in content_type_keywords(content_type) {
            universe.entry(term.to_string()).or_default();
        }
        for term in &self.config.primary_keywords {
            let term = normalize_term(term);
            if !term.is_empty() {
                universe.entry(term).or_default().is_primary = true;
            }
        }
        for term in &self.config.secondary_keywords {
            let term = normalize_term(term);
            if !term.is_empty() {
                universe.entry(term).or_default().is_secondary = true;
            }
        }

        universe
    }
}

fn recommend(
    term: &str,
    flags: KeywordFlags,
    status: DensityStatus,
    range: DensityRange,
    density: f64,
    only_partial: bool,
) -> Option<Recommendation> {
    let (kind, priority, message) = match status {
        DensityStatus::Above => (
            RecommendationKind::Decrease,
            if flags.is_target {
                RecommendationPriority::High
            } else {
                RecommendationPriority::Medium
            },
            format!(
                "Reduce \"{}\": density {:.2}% exceeds the {:.1}-{:.1}% range and may read as keyword stuffing",
                term,
                density * 100.0,
                range.min * 100.0,
                range.max * 100.0
            ),
        ),
        DensityStatus::Below if only_partial && (flags.is_target || flags.is_primary) => (
            RecommendationKind::UseExactPhrase,
            RecommendationPriority::Medium,
            format!(
                "The words of \"{}\" appear separately; use the exact phrase at least once",
                term
            ),
        ),
        DensityStatus::Below if flags.is_target || flags.is_primary => (
            RecommendationKind::Increase,
            if flags.is_target {
                RecommendationPriority::High
            } else {
                RecommendationPriority::Low
            },
            format!(
                "Use \"{}\" more often: density {:.2}% is below the {:.1}-{:.1}% range",
                term,
                density * 100.0,
                range.min * 100.0,
                range.max * 100.0
            ),
        ),
        _ => return None,
    };

    Some(Recommendation {
        keyword: Some(term.to_string()),
        kind,
        priority,
        current_density: density,
        target_min: range.min,
        target_max: range.max,
        message,
    })
}

/// Top 3 and next 5 keywords with nonzero density, ordered by tier then density.
fn rank_keywords(per_keyword: &BTreeMap<String, KeywordStats>) -> (Vec<String>, Vec<String>) {
    let mut present: Vec<(&String, &KeywordStats)> = per_keyword
        .iter()
        .filter(|(_, stats)| stats.density > 0.0)
        .collect();

    present.sort_by(|(term_a, a), (term_b, b)| {
        b.is_target
            .cmp(&a.is_target)
            .then(b.is_primary.cmp(&a.is_primary))
            .then(b.is_secondary.cmp(&a.is_secondary))
            .then(b.density.total_cmp(&a.density))
            .then(term_a.cmp(term_b))
    });

    let primary = present.iter().take(3).map(|(t, _)| (*t).clone()).collect();
    let secondary = present
        .iter()
        .skip(3)
        .take(5)
        .map(|(t, _)| (*t).clone())
        .collect();
    (primary, secondary)
}

fn cache_key(content: &str, targets: &[String], content_type: ContentType) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    targets.hash(&mut hasher);
    format!(
        "{}|{}|{:016x}",
        content_type,
        content.chars().count(),
        hasher.finish()
    )
}
