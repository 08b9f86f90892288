use metascout::canonical::UrlCanonicalizer;
use metascout::config::SiteConfig;
use metascout::models::IssueType;
use std::sync::Arc;
use url::Url;

fn canonicalizer() -> UrlCanonicalizer {
    UrlCanonicalizer::new(Arc::new(SiteConfig::default()))
}

#[test]
fn test_tracking_params_stripped_and_path_lowercased() {
    let canonical =
        canonicalizer().canonicalize("https://billbytekot.in/Features/?utm_source=google&x=1");
    assert_eq!(canonical, "https://billbytekot.in/features/?x=1");
}

#[test]
fn test_trailing_slash_removed_without_query() {
    let canon = canonicalizer();
    assert_eq!(
        canon.canonicalize("https://billbytekot.in/Pricing/"),
        "https://billbytekot.in/pricing"
    );
    assert_eq!(
        canon.canonicalize("https://billbytekot.in/pricing/?utm_medium=email#plans"),
        "https://billbytekot.in/pricing"
    );
    assert_eq!(canon.canonicalize("https://billbytekot.in"), "https://billbytekot.in/");
}

#[test]
fn test_relative_and_invalid_inputs_resolve_against_base() {
    let canon = canonicalizer();
    assert_eq!(canon.canonicalize("/blog/Tips"), "https://billbytekot.in/blog/tips");
    assert_eq!(canon.canonicalize(""), "https://billbytekot.in/");
    assert_eq!(canon.canonicalize("javascript:alert(1)"), "https://billbytekot.in/");
    assert_eq!(canon.canonicalize("http://[::1"), "https://billbytekot.in/");
}

#[test]
fn test_canonicalize_is_idempotent_and_absolute() {
    let canon = canonicalizer();
    let inputs = [
        "https://billbytekot.in/Features/?utm_source=google&x=1",
        "https://billbytekot.in/a//b/?fbclid=abc",
        "HTTPS://BillByteKOT.in/Blog/Post_1/?gclid=1&utm_campaign=x&page=2#top",
        "/features/kot/",
        "relative/path",
        "https://example.com/?q=a%20b&utm_term=x",
        "not a url at all",
        "",
        "?x=1",
    ];

    for input in inputs {
        let once = canon.canonicalize(input);
        let twice = canon.canonicalize(&once);
        assert_eq!(once, twice, "not idempotent for {:?}", input);
        assert!(Url::parse(&once).is_ok(), "not absolute: {}", once);
        for key in ["utm_source", "utm_campaign", "utm_term", "fbclid", "gclid"] {
            assert!(!once.contains(key), "{} kept in {}", key, once);
        }
    }
}

#[test]
fn test_validate_url_structure_clean_url() {
    let report = canonicalizer().validate_url_structure("https://billbytekot.in/features/kot");
    assert!(report.is_valid);
    assert_eq!(report.score, 100);
    assert!(report.warnings.is_empty());
}

#[test]
fn test_validate_url_structure_flags_problems() {
    let report = canonicalizer()
        .validate_url_structure("http://billbytekot.in/Blog/My_Post/a/b/c/page.html?utm_source=x");

    assert!(report.is_valid);
    let types: Vec<&IssueType> = report.warnings.iter().map(|w| &w.issue_type).collect();
    assert!(types.contains(&&IssueType::InsecureScheme));
    assert!(types.contains(&&IssueType::UppercaseInUrl));
    assert!(types.contains(&&IssueType::UnderscoreInUrl));
    assert!(types.contains(&&IssueType::DeepUrl));
    assert!(types.contains(&&IssueType::FileExtension));
    assert!(types.contains(&&IssueType::TrackingParameter));
    assert!(report.score < 100);
}

#[test]
fn test_validate_url_structure_rejects_garbage() {
    let report = canonicalizer().validate_url_structure("definitely not a url");
    assert!(!report.is_valid);
    assert_eq!(report.issues[0].issue_type, IssueType::InvalidUrl);
}

#[test]
fn test_percent_encoded_tracking_keys_are_stripped() {
    let canon = canonicalizer();
    let canonical = canon.canonicalize("https://billbytekot.in/a?utm%5Fsource=x&x=1&%66bclid=2");
    assert_eq!(canonical, "https://billbytekot.in/a?x=1");

    let url = Url::parse(&canonical).unwrap();
    assert!(url.query_pairs().all(|(key, _)| !key.starts_with("utm_") && key != "fbclid"));
    assert_eq!(canon.canonicalize(&canonical), canonical);
}
