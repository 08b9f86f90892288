//! Static map of the site: pages, content hubs, contextual trigger phrases and
//! anchor-text variations. Built once from `SiteConfig` and shared read-only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

use crate::config::SiteConfig;
use crate::text_metrics::normalize_term;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyPage {
    /// Site-relative path or absolute URL on the site.
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// 0.0-1.0, used to break ranking ties.
    #[serde(default)]
    pub priority: f64,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentHub {
    pub topic: String,
    pub pillar_page: String,
    #[serde(default)]
    pub supporting_pages: Vec<String>,
    #[serde(default)]
    pub related_features: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A phrase that, when present in body text, suggests linking to `url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualRule {
    pub phrase: String,
    pub url: String,
    pub anchor: String,
    pub relevance: f64,
}

fn page(url: &str, title: &str, keywords: &[&str], priority: f64, category: &str) -> TopologyPage {
    TopologyPage {
        url: url.to_string(),
        title: title.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        priority,
        category: category.to_string(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_pages() -> Vec<TopologyPage> {
    vec![
        page(
            "/",
            "Home",
            &["restaurant billing software", "restaurant pos", "kot software"],
            1.0,
            "home",
        ),
        page(
            "/features",
            "Features",
            &["restaurant pos features", "billing software features"],
            0.9,
            "features",
        ),
        page(
            "/features/billing",
            "Restaurant Billing",
            &["restaurant billing", "billing software", "fast billing"],
            0.9,
            "features",
        ),
        page(
            "/features/kot",
            "KOT Management",
            &["kot software", "kitchen order ticket", "kot management"],
            0.85,
            "features",
        ),
        page(
            "/features/inventory",
            "Inventory Management",
            &["inventory management", "stock tracking", "restaurant inventory"],
            0.8,
            "features",
        ),
        page(
            "/features/table-management",
            "Table Management",
            &["table management", "table reservation", "floor plan"],
            0.75,
            "features",
        ),
        page(
            "/features/gst-billing",
            "GST Billing",
            &["gst billing", "gst invoice", "tax billing"],
            0.8,
            "features",
        ),
        page(
            "/features/reports",
            "Sales Reports",
            &["sales reports", "restaurant analytics", "daily sales"],
            0.7,
            "features",
        ),
        page(
            "/pricing",
            "Pricing",
            &["restaurant billing software price", "pos pricing", "free billing app"],
            0.85,
            "pricing",
        ),
        page(
            "/getting-started",
            "Getting Started",
            &["setup guide", "getting started", "free trial"],
            0.6,
            "support",
        ),
        page(
            "/download",
            "Download",
            &["billing app download", "pos app", "android billing app"],
            0.7,
            "download",
        ),
        page(
            "/blog",
            "Blog",
            &["restaurant management", "restaurant tips"],
            0.6,
            "blog",
        ),
        page(
            "/blog/restaurant-billing-guide",
            "Restaurant Billing Guide",
            &["restaurant billing", "billing guide", "restaurant billing software"],
            0.6,
            "blog",
        ),
        page(
            "/blog/restaurant-management-tips",
            "Restaurant Management Tips",
            &["restaurant management", "restaurant tips", "restaurant operations"],
            0.55,
            "blog",
        ),
        page(
            "/solutions/cafe",
            "Cafe Billing",
            &["cafe billing", "cafe pos", "coffee shop billing"],
            0.65,
            "solutions",
        ),
        page(
            "/solutions/cloud-kitchen",
            "Cloud Kitchen Software",
            &["cloud kitchen", "cloud kitchen software", "delivery kitchen"],
            0.65,
            "solutions",
        ),
        page("/contact", "Contact Us", &["contact", "support"], 0.4, "company"),
        page("/about", "About Us", &["about", "company"], 0.3, "company"),
    ]
}

fn default_hubs() -> Vec<ContentHub> {
    vec![
        ContentHub {
            topic: "Restaurant Billing".to_string(),
            pillar_page: "/features/billing".to_string(),
            supporting_pages: strings(&["/blog/restaurant-billing-guide", "/features/gst-billing"]),
            related_features: strings(&["/features/kot", "/pricing"]),
            keywords: strings(&[
                "restaurant billing",
                "billing software",
                "gst billing",
                "restaurant pos",
            ]),
        },
        ContentHub {
            topic: "Restaurant Management".to_string(),
            pillar_page: "/blog/restaurant-management-tips".to_string(),
            supporting_pages: strings(&["/features/reports"]),
            related_features: strings(&["/features/inventory", "/features/table-management"]),
            keywords: strings(&[
                "restaurant management",
                "inventory management",
                "table management",
            ]),
        },
        ContentHub {
            topic: "Kitchen Operations".to_string(),
            pillar_page: "/features/kot".to_string(),
            supporting_pages: strings(&["/solutions/cloud-kitchen"]),
            related_features: strings(&["/features/inventory"]),
            keywords: strings(&["kot software", "kitchen order ticket", "kitchen management"]),
        },
    ]
}

fn rule(phrase: &str, url: &str, anchor: &str, relevance: f64) -> ContextualRule {
    ContextualRule {
        phrase: phrase.to_string(),
        url: url.to_string(),
        anchor: anchor.to_string(),
        relevance,
    }
}

fn default_contextual_rules() -> Vec<ContextualRule> {
    vec![
        rule("restaurant billing", "/features/billing", "restaurant billing", 0.9),
        rule("kitchen order ticket", "/features/kot", "kitchen order tickets", 0.85),
        rule("kot", "/features/kot", "KOT software", 0.8),
        rule("gst billing", "/features/gst-billing", "GST billing", 0.8),
        rule("inventory management", "/features/inventory", "inventory management", 0.8),
        rule("table management", "/features/table-management", "table management", 0.75),
        rule("sales report", "/features/reports", "sales reports", 0.7),
        rule("free trial", "/getting-started", "start your free trial", 0.7),
        rule("cafe", "/solutions/cafe", "cafe billing", 0.6),
        rule("cloud kitchen", "/solutions/cloud-kitchen", "cloud kitchen software", 0.6),
        rule("pricing", "/pricing", "pricing", 0.6),
        rule("download", "/download", "download the app", 0.5),
    ]
}

fn default_anchor_variations() -> BTreeMap<String, Vec<String>> {
    [
        (
            "restaurant billing software",
            &[
                "restaurant billing software",
                "billing software for restaurants",
                "restaurant billing system",
            ][..],
        ),
        (
            "restaurant billing",
            &["restaurant billing", "fast restaurant billing", "billing features"][..],
        ),
        (
            "restaurant pos",
            &["restaurant POS", "POS system for restaurants", "point of sale"][..],
        ),
        (
            "kot software",
            &["KOT software", "kitchen order tickets", "KOT management"][..],
        ),
        (
            "inventory management",
            &["inventory management", "stock tracking", "restaurant inventory"][..],
        ),
        (
            "table management",
            &["table management", "manage tables", "floor plan management"][..],
        ),
        (
            "gst billing",
            &["GST billing", "GST-ready invoices", "GST billing features"][..],
        ),
        (
            "restaurant management",
            &["restaurant management", "running a restaurant", "restaurant management tips"][..],
        ),
        ("pricing", &["pricing", "plans and pricing", "see pricing"][..]),
    ]
    .into_iter()
    .map(|(keyword, variations)| (keyword.to_string(), strings(variations)))
    .collect()
}

/// Lowercased path of `raw` relative to `base`, with no trailing slash except for
/// the root. Returns `None` for URLs on another host.
pub fn normalize_path(base: &Url, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let url = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base.join(trimmed).ok()?,
        Err(_) => return None,
    };
    if url.host_str() != base.host_str() {
        return None;
    }

    let path = url.path().to_lowercase();
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        Some("/".to_string())
    } else {
        Some(path.to_string())
    }
}

/// Read-only page map used by the link recommender.
#[derive(Debug, Clone)]
pub struct SiteTopology {
    base: Url,
    pages: BTreeMap<String, TopologyPage>,
    hubs: Vec<ContentHub>,
    contextual_rules: Vec<ContextualRule>,
    anchor_variations: BTreeMap<String, Vec<String>>,
}

impl SiteTopology {
    /// Uses the configured overrides where present, built-in tables otherwise.
    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(
            config.base(),
            config.pages.clone().unwrap_or_else(default_pages),
            config.hubs.clone().unwrap_or_else(default_hubs),
            config
                .contextual_rules
                .clone()
                .unwrap_or_else(default_contextual_rules),
            config
                .anchor_variations
                .clone()
                .unwrap_or_else(default_anchor_variations),
        )
    }

    pub fn new(
        base: Url,
        pages: Vec<TopologyPage>,
        hubs: Vec<ContentHub>,
        contextual_rules: Vec<ContextualRule>,
        anchor_variations: BTreeMap<String, Vec<String>>,
    ) -> Self {
        let mut map = BTreeMap::new();
        for page in pages {
            match normalize_path(&base, &page.url) {
                Some(path) => {
                    map.insert(path, page);
                }
                None => {
                    tracing::warn!(url = %page.url, "Skipping topology page outside the site");
                }
            }
        }

        let anchor_variations = anchor_variations
            .into_iter()
            .map(|(keyword, variations)| (normalize_term(&keyword), variations))
            .filter(|(keyword, variations)| !keyword.is_empty() && !variations.is_empty())
            .collect();

        tracing::debug!(
            pages = map.len(),
            hubs = hubs.len(),
            rules = contextual_rules.len(),
            "Site topology loaded"
        );

        Self {
            base,
            pages: map,
            hubs,
            contextual_rules,
            anchor_variations,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn path_of(&self, raw: &str) -> Option<String> {
        normalize_path(&self.base, raw)
    }

    /// Absolute URL for a site path.
    pub fn absolute_url(&self, path: &str) -> String {
        self.base
            .join(path)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| self.base.to_string())
    }

    pub fn get(&self, raw: &str) -> Option<&TopologyPage> {
        self.path_of(raw).and_then(|path| self.pages.get(&path))
    }

    /// Pages keyed by normalized path.
    pub fn pages(&self) -> impl Iterator<Item = (&str, &TopologyPage)> {
        self.pages.iter().map(|(path, page)| (path.as_str(), page))
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn hubs(&self) -> &[ContentHub] {
        &self.hubs
    }

    pub fn contextual_rules(&self) -> &[ContextualRule] {
        &self.contextual_rules
    }

    pub fn anchor_variations(&self, keyword: &str) -> &[String] {
        self.anchor_variations
            .get(&normalize_term(keyword))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://billbytekot.in").unwrap()
    }

    #[test]
    fn test_normalize_path() {
        let base = base();
        assert_eq!(normalize_path(&base, "/Features/Billing/").as_deref(), Some("/features/billing"));
        assert_eq!(
            normalize_path(&base, "https://billbytekot.in/pricing?x=1").as_deref(),
            Some("/pricing")
        );
        assert_eq!(normalize_path(&base, "").as_deref(), Some("/"));
        assert_eq!(normalize_path(&base, "https://other.example/pricing"), None);
    }

    #[test]
    fn test_default_topology_is_consistent() {
        let topology = SiteTopology::from_config(&SiteConfig::default());
        assert!(topology.get("/").is_some());

        for hub in topology.hubs() {
            assert!(topology.get(&hub.pillar_page).is_some(), "{}", hub.pillar_page);
            for url in hub.supporting_pages.iter().chain(&hub.related_features) {
                assert!(topology.get(url).is_some(), "{}", url);
            }
        }
        for rule in topology.contextual_rules() {
            assert!(topology.get(&rule.url).is_some(), "{}", rule.url);
        }
    }

    #[test]
    fn test_anchor_variations_lookup_is_case_insensitive() {
        let topology = SiteTopology::from_config(&SiteConfig::default());
        assert_eq!(topology.anchor_variations("KOT Software")[0], "KOT software");
        assert!(topology.anchor_variations("unknown keyword").is_empty());
    }

    #[test]
    fn test_config_overrides_pages() {
        let config = SiteConfig {
            pages: Some(vec![page("/only", "Only", &["only page"], 0.5, "misc")]),
            ..Default::default()
        };
        let topology = SiteTopology::from_config(&config);
        assert_eq!(topology.len(), 1);
        assert_eq!(topology.absolute_url("/only"), "https://billbytekot.in/only");
    }
}
