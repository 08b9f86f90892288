use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::models::{ContentType, LinkSuggestion, LinkType, PageContent};
use crate::text_metrics::{normalize_words, phrase_occurrences, plain_text};
use crate::topology::{ContentHub, SiteTopology};

pub const MAX_SUGGESTIONS: usize = 8;

const HUB_RELEVANCE_THRESHOLD: f64 = 0.3;
const SUPPORTING_PAGE_RELEVANCE: f64 = 0.5;
const HUB_FEATURE_FACTOR: f64 = 0.8;
const HOME_RELEVANCE: f64 = 0.3;
const ANCESTOR_RELEVANCE: f64 = 0.4;

/// Ranking weight applied to a candidate's relevance.
pub fn type_weight(link_type: LinkType) -> f64 {
    match link_type {
        LinkType::Contextual => 1.0,
        LinkType::KeywordBased => 0.9,
        LinkType::HubPillar => 0.8,
        LinkType::HubFeature => 0.75,
        LinkType::Navigation => 0.6,
        LinkType::Breadcrumb => 0.5,
    }
}

/// Pages every page of a type should point at, with their base relevance.
fn navigation_targets(content_type: ContentType) -> &'static [(&'static str, f64)] {
    match content_type {
        ContentType::Homepage => &[("/features", 0.6), ("/pricing", 0.5)],
        ContentType::ProductPage => &[("/pricing", 0.6), ("/getting-started", 0.5)],
        ContentType::BlogPost => &[("/blog", 0.5), ("/features", 0.4)],
        ContentType::LandingPage => &[("/pricing", 0.6), ("/download", 0.5)],
        ContentType::CategoryPage => &[("/features", 0.5), ("/blog", 0.4)],
    }
}

/// Shared words over the longer of the two word counts, in `[0, 1]`.
pub fn word_similarity(a: &str, b: &str) -> f64 {
    let a: BTreeSet<String> = normalize_words(a).into_iter().collect();
    let b: BTreeSet<String> = normalize_words(b).into_iter().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / longest as f64
}

/// Mean similarity over every (page keyword, hub keyword) pair.
pub fn hub_relevance(keywords: &[String], hub: &ContentHub) -> f64 {
    if keywords.is_empty() || hub.keywords.is_empty() {
        return 0.0;
    }
    let total: f64 = keywords
        .iter()
        .flat_map(|kw| hub.keywords.iter().map(move |hk| word_similarity(kw, hk)))
        .sum();
    total / (keywords.len() * hub.keywords.len()) as f64
}

#[derive(Debug, Clone)]
struct Candidate {
    path: String,
    /// Keyword whose anchor variations apply to this link.
    anchor_key: Option<String>,
    anchor_text: Option<String>,
    relevance: f64,
    link_type: LinkType,
}

/// Suggests internal links for a page from the site topology.
pub struct InternalLinkRecommender {
    topology: Arc<SiteTopology>,
}

impl InternalLinkRecommender {
    pub fn new(topology: Arc<SiteTopology>) -> Self {
        Self { topology }
    }

    pub fn topology(&self) -> &SiteTopology {
        &self.topology
    }

    /// At most eight suggestions with unique URLs, best first. Never links the
    /// page to itself.
    pub fn recommend(&self, page: &PageContent) -> Vec<LinkSuggestion> {
        let keywords = page.keyword_terms();
        let text = plain_text(&page.raw_text);
        if keywords.is_empty() && text.trim().is_empty() {
            return Vec::new();
        }

        let tokens = normalize_words(&text);
        let own_path = self.topology.path_of(&page.url);

        let mut pool = Vec::new();
        self.contextual_candidates(&tokens, &mut pool);
        self.keyword_candidates(&keywords, &mut pool);
        self.hub_candidates(&keywords, own_path.as_deref(), &mut pool);
        self.breadcrumb_candidates(own_path.as_deref(), &mut pool);
        self.navigation_candidates(page.content_type, &mut pool);

        let mut seen = HashSet::new();
        let mut ranked: Vec<(Candidate, f64)> = pool
            .into_iter()
            .filter(|c| own_path.as_deref() != Some(c.path.as_str()))
            .filter(|c| seen.insert(c.path.clone()))
            .map(|c| {
                let score = c.relevance * type_weight(c.link_type);
                (c, score)
            })
            .collect();

        ranked.sort_by(|(a, score_a), (b, score_b)| {
            score_b
                .total_cmp(score_a)
                .then_with(|| self.priority(&b.path).total_cmp(&self.priority(&a.path)))
                .then_with(|| a.path.cmp(&b.path))
        });
        ranked.truncate(MAX_SUGGESTIONS);

        tracing::debug!(url = %page.url, suggestions = ranked.len(), "Internal links ranked");

        self.assemble(ranked)
    }

    /// Anchor text for `keyword` that does not collide (case-insensitively) with
    /// `used`. Falls back to the first variation, then to `fallback`, when every
    /// alternative is taken.
    pub fn choose_anchor_text(&self, keyword: &str, fallback: &str, used: &HashSet<String>) -> String {
        let variations = self.topology.anchor_variations(keyword);
        let preferred = if variations.is_empty() || variations.iter().any(|v| v == fallback) {
            fallback
        } else {
            variations[0].as_str()
        };
        self.diversify(keyword, preferred, used)
    }

    /// Keeps `preferred` unless it is already used, in which case the next unused
    /// variation of `keyword` is taken.
    fn diversify(&self, keyword: &str, preferred: &str, used: &HashSet<String>) -> String {
        if !used.contains(&preferred.to_lowercase()) {
            return preferred.to_string();
        }

        self.topology
            .anchor_variations(keyword)
            .iter()
            .find(|v| !used.contains(&v.to_lowercase()))
            .cloned()
            .unwrap_or_else(|| preferred.to_string())
    }

    fn priority(&self, path: &str) -> f64 {
        self.topology.get(path).map(|p| p.priority).unwrap_or(0.0)
    }

    fn contextual_candidates(&self, tokens: &[String], pool: &mut Vec<Candidate>) {
        for rule in self.topology.contextual_rules() {
            let phrase = normalize_words(&rule.phrase);
            if phrase_occurrences(tokens, &phrase) == 0 {
                continue;
            }
            let Some(path) = self.topology.path_of(&rule.url) else {
                continue;
            };
            pool.push(Candidate {
                path,
                anchor_key: Some(rule.phrase.clone()),
                anchor_text: Some(rule.anchor.clone()),
                relevance: rule.relevance,
                link_type: LinkType::Contextual,
            });
        }
    }

    fn keyword_candidates(&self, keywords: &[String], pool: &mut Vec<Candidate>) {
        for keyword in keywords {
            for (path, page) in self.topology.pages() {
                let best = page
                    .keywords
                    .iter()
                    .map(|pk| (word_similarity(keyword, pk), pk))
                    .max_by(|(a, _), (b, _)| a.total_cmp(b));
                if let Some((similarity, matched)) = best
                    && similarity > 0.0
                {
                    pool.push(Candidate {
                        path: path.to_string(),
                        anchor_key: Some(matched.clone()),
                        anchor_text: None,
                        relevance: similarity,
                        link_type: LinkType::KeywordBased,
                    });
                }
            }
        }
    }

    fn hub_candidates(&self, keywords: &[String], own_path: Option<&str>, pool: &mut Vec<Candidate>) {
        for hub in self.topology.hubs() {
            let mut relevance = hub_relevance(keywords, hub);
            let supports_hub = own_path.is_some_and(|own| {
                hub.supporting_pages
                    .iter()
                    .any(|p| self.topology.path_of(p).as_deref() == Some(own))
            });
            if supports_hub {
                relevance = relevance.max(SUPPORTING_PAGE_RELEVANCE);
            }
            if relevance <= HUB_RELEVANCE_THRESHOLD {
                continue;
            }

            tracing::debug!(topic = %hub.topic, relevance, "Content hub matched");
            let anchor_key = hub.keywords.first().cloned();

            if let Some(path) = self.topology.path_of(&hub.pillar_page) {
                pool.push(Candidate {
                    path,
                    anchor_key: anchor_key.clone(),
                    anchor_text: None,
                    relevance,
                    link_type: LinkType::HubPillar,
                });
            }
            for feature in &hub.related_features {
                if let Some(path) = self.topology.path_of(feature) {
                    pool.push(Candidate {
                        path,
                        anchor_key: None,
                        anchor_text: None,
                        relevance: relevance * HUB_FEATURE_FACTOR,
                        link_type: LinkType::HubFeature,
                    });
                }
            }
        }
    }

    fn breadcrumb_candidates(&self, own_path: Option<&str>, pool: &mut Vec<Candidate>) {
        let Some(own) = own_path.filter(|p| *p != "/") else {
            return;
        };

        pool.push(Candidate {
            path: "/".to_string(),
            anchor_key: None,
            anchor_text: Some("Home".to_string()),
            relevance: HOME_RELEVANCE,
            link_type: LinkType::Breadcrumb,
        });

        let segments: Vec<&str> = own.split('/').filter(|s| !s.is_empty()).collect();
        for depth in 1..segments.len() {
            let prefix = format!("/{}", segments[..depth].join("/"));
            if self.topology.get(&prefix).is_some() {
                pool.push(Candidate {
                    path: prefix,
                    anchor_key: None,
                    anchor_text: None,
                    relevance: ANCESTOR_RELEVANCE,
                    link_type: LinkType::Breadcrumb,
                });
            }
        }
    }

    fn navigation_candidates(&self, content_type: ContentType, pool: &mut Vec<Candidate>) {
        for (path, relevance) in navigation_targets(content_type) {
            if self.topology.get(path).is_some() {
                pool.push(Candidate {
                    path: path.to_string(),
                    anchor_key: None,
                    anchor_text: None,
                    relevance: *relevance,
                    link_type: LinkType::Navigation,
                });
            }
        }
    }

    fn assemble(&self, ranked: Vec<(Candidate, f64)>) -> Vec<LinkSuggestion> {
        let mut used = HashSet::new();

        ranked
            .into_iter()
            .map(|(candidate, final_score)| {
                let page = self.topology.get(&candidate.path);
                let title = page
                    .map(|p| p.title.clone())
                    .or_else(|| candidate.anchor_text.clone())
                    .unwrap_or_else(|| candidate.path.clone());

                let anchor_key = candidate
                    .anchor_key
                    .clone()
                    .or_else(|| page.and_then(|p| p.keywords.first().cloned()))
                    .unwrap_or_default();
                let anchor_text = match candidate.anchor_text.as_deref() {
                    Some(explicit) => self.diversify(&anchor_key, explicit, &used),
                    None => self.choose_anchor_text(&anchor_key, &title, &used),
                };
                used.insert(anchor_text.to_lowercase());

                LinkSuggestion {
                    url: self.topology.absolute_url(&candidate.path),
                    title,
                    anchor_text,
                    relevance_score: candidate.relevance,
                    link_type: candidate.link_type,
                    final_score,
                }
            })
            .collect()
    }
}
