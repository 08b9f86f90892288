use metascout::config::SiteConfig;
use metascout::link_recommender::{InternalLinkRecommender, MAX_SUGGESTIONS, hub_relevance};
use metascout::models::{ContentType, Keyword, LinkType, PageContent};
use metascout::topology::{ContentHub, ContextualRule, SiteTopology, TopologyPage};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use url::Url;

fn recommender() -> InternalLinkRecommender {
    InternalLinkRecommender::new(Arc::new(SiteTopology::from_config(&SiteConfig::default())))
}

fn rich_page() -> PageContent {
    PageContent {
        title: "Restaurant Billing Guide".to_string(),
        raw_text: "Restaurant billing is faster when every kot reaches the kitchen instantly. \
                   Pair GST billing with inventory management and table management, check \
                   the pricing, start a free trial, or download the app for your cafe or \
                   cloud kitchen. Sales report exports run nightly."
            .to_string(),
        keywords: vec![
            Keyword::from("restaurant billing"),
            Keyword::from("billing software"),
            Keyword::from("gst billing"),
        ],
        url: "/blog/restaurant-billing-guide".to_string(),
        content_type: ContentType::BlogPost,
        ..Default::default()
    }
}

#[test]
fn test_suggestions_are_capped_and_unique() {
    let links = recommender().recommend(&rich_page());

    assert!(!links.is_empty());
    assert!(links.len() <= MAX_SUGGESTIONS);

    let urls: HashSet<&str> = links.iter().map(|l| l.url.as_str()).collect();
    assert_eq!(urls.len(), links.len());
}

#[test]
fn test_suggestions_are_sorted_and_scored() {
    let links = recommender().recommend(&rich_page());

    for pair in links.windows(2) {
        assert!(pair[0].final_score >= pair[1].final_score);
    }
    for link in &links {
        assert!(link.final_score <= link.relevance_score + 1e-9);
        assert!(Url::parse(&link.url).is_ok());
    }
    assert_eq!(links[0].link_type, LinkType::Contextual);
    assert_eq!(links[0].url, "https://billbytekot.in/features/billing");
}

#[test]
fn test_page_never_links_to_itself() {
    let links = recommender().recommend(&rich_page());
    assert!(
        !links
            .iter()
            .any(|l| l.url == "https://billbytekot.in/blog/restaurant-billing-guide")
    );
}

#[test]
fn test_anchor_texts_are_not_duplicated() {
    let links = recommender().recommend(&rich_page());
    let anchors: HashSet<String> = links.iter().map(|l| l.anchor_text.to_lowercase()).collect();
    assert_eq!(anchors.len(), links.len());
}

#[test]
fn test_empty_page_yields_no_suggestions() {
    assert!(recommender().recommend(&PageContent::default()).is_empty());

    let blank = PageContent {
        raw_text: "   ".to_string(),
        url: "/features/kot".to_string(),
        ..Default::default()
    };
    assert!(recommender().recommend(&blank).is_empty());
}

#[test]
fn test_keyword_only_page_uses_topology() {
    let page = PageContent {
        keywords: vec![Keyword::from("inventory management")],
        url: "/blog/stock-control".to_string(),
        content_type: ContentType::BlogPost,
        ..Default::default()
    };

    let links = recommender().recommend(&page);
    assert!(links.iter().any(|l| {
        l.url == "https://billbytekot.in/features/inventory" && l.link_type == LinkType::KeywordBased
    }));
    assert!(links.iter().any(|l| {
        l.url == "https://billbytekot.in/" && l.link_type == LinkType::Breadcrumb
    }));
    assert!(links.iter().any(|l| l.url == "https://billbytekot.in/blog"));
}

#[test]
fn test_hub_relevance_threshold() {
    let hub = ContentHub {
        topic: "Billing".to_string(),
        pillar_page: "/features/billing".to_string(),
        supporting_pages: vec![],
        related_features: vec![],
        keywords: vec!["restaurant billing".to_string(), "gst billing".to_string()],
    };

    let relevance = hub_relevance(&["restaurant billing".to_string()], &hub);
    assert!((relevance - 0.75).abs() < 1e-9);
    assert_eq!(hub_relevance(&[], &hub), 0.0);
}

#[test]
fn test_hub_pillar_and_features_from_custom_topology() {
    let base = Url::parse("https://shop.example").unwrap();
    let page = |url: &str, title: &str, keywords: &[&str]| TopologyPage {
        url: url.to_string(),
        title: title.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        priority: 0.5,
        category: String::new(),
    };
    let topology = SiteTopology::new(
        base,
        vec![
            page("/", "Home", &["home"]),
            page("/guide", "Coffee Guide", &["espresso basics"]),
            page("/grinders", "Grinders", &["burr grinder"]),
        ],
        vec![ContentHub {
            topic: "Coffee".to_string(),
            pillar_page: "/guide".to_string(),
            supporting_pages: vec![],
            related_features: vec!["/grinders".to_string()],
            keywords: vec!["coffee brewing".to_string()],
        }],
        Vec::<ContextualRule>::new(),
        BTreeMap::new(),
    );
    let recommender = InternalLinkRecommender::new(Arc::new(topology));

    let links = recommender.recommend(&PageContent {
        keywords: vec![Keyword::from("coffee brewing")],
        url: "https://shop.example/".to_string(),
        ..Default::default()
    });

    let pillar = links
        .iter()
        .find(|l| l.url == "https://shop.example/guide")
        .expect("pillar page suggested");
    assert_eq!(pillar.link_type, LinkType::HubPillar);
    assert!((pillar.relevance_score - 1.0).abs() < 1e-9);

    let feature = links
        .iter()
        .find(|l| l.url == "https://shop.example/grinders")
        .expect("feature page suggested");
    assert_eq!(feature.link_type, LinkType::HubFeature);
    assert!((feature.relevance_score - 0.8).abs() < 1e-9);
}

#[test]
fn test_colliding_anchor_uses_next_variation() {
    let base = Url::parse("https://billbytekot.in").unwrap();
    let page = |url: &str, title: &str| TopologyPage {
        url: url.to_string(),
        title: title.to_string(),
        keywords: vec!["kot software".to_string()],
        priority: 0.5,
        category: String::new(),
    };
    let mut variations = BTreeMap::new();
    variations.insert(
        "kot software".to_string(),
        vec!["KOT software".to_string(), "kitchen order tickets".to_string()],
    );
    let topology = SiteTopology::new(
        base,
        vec![page("/kot-a", "KOT A"), page("/kot-b", "KOT B")],
        Vec::new(),
        Vec::new(),
        variations,
    );
    let recommender = InternalLinkRecommender::new(Arc::new(topology));

    let links = recommender.recommend(&PageContent {
        keywords: vec![Keyword::from("kot software")],
        url: "/elsewhere".to_string(),
        content_type: ContentType::CategoryPage,
        ..Default::default()
    });

    let anchors: Vec<&str> = links.iter().map(|l| l.anchor_text.as_str()).collect();
    assert_eq!(anchors, vec!["KOT software", "kitchen order tickets", "Home"]);
    assert_eq!(links[2].title, "Home");
    assert_eq!(links[2].link_type, LinkType::Breadcrumb);
}

#[test]
fn test_home_breadcrumb_keeps_its_label() {
    let page = PageContent {
        raw_text: "Fast counters every shift.".to_string(),
        url: "/features/billing".to_string(),
        content_type: ContentType::ProductPage,
        ..Default::default()
    };

    let links = recommender().recommend(&page);
    let home = links
        .iter()
        .find(|l| l.url == "https://billbytekot.in/")
        .expect("home breadcrumb suggested");
    assert_eq!(home.link_type, LinkType::Breadcrumb);
    assert_eq!(home.anchor_text, "Home");
}

#[test]
fn test_contextual_links_use_rule_anchor() {
    let links = recommender().recommend(&rich_page());
    let contextual: Vec<_> = links
        .iter()
        .filter(|l| l.link_type == LinkType::Contextual)
        .collect();
    assert!(!contextual.is_empty());

    let topology = SiteTopology::from_config(&SiteConfig::default());
    for link in contextual {
        let rule = topology
            .contextual_rules()
            .iter()
            .find(|r| topology.absolute_url(&r.url) == link.url)
            .expect("contextual link comes from a rule");
        let variations = topology.anchor_variations(&rule.phrase);
        assert!(link.anchor_text == rule.anchor || variations.contains(&link.anchor_text));
    }
}
