//! URL → page-type classification.
//!
//! Ordered guard clauses over precompiled regexes; first match wins, and
//! the priority order is load-bearing; reordering changes results.
//! Classification is pure and never fails: malformed URLs fall back to
//! treating the whole input as a path.

use std::sync::LazyLock;

use regex::Regex;
use serpclash_model::UrlType;
use url::Url;

use crate::geo;

static INDEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/index\.(html?|php)$").unwrap());

static CONTACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(contact(-us)?|get-in-touch|request(-a-)?(quote|call|service)?|schedule|book(ing|-online|-now)?)(/|$)")
        .unwrap()
});

static ABOUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(about(-us)?|our-(team|story|company)|team|who-we-are|meet-the-team)(/|$)")
        .unwrap()
});

static GALLERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(galler(y|ies)|portfolio|projects|our-work|photos|before-and-after)(/|$)")
        .unwrap()
});

static TESTIMONIALS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(testimonials?|reviews?|customer-reviews|success-stories)(/|$)").unwrap()
});

static FAQ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(faqs?|help|support|common-questions)(/|$)").unwrap());

static BLOG_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(blog|news|articles?|resources?|insights|learn|posts?)(/|$)").unwrap()
});

/// `/YYYY/MM/` date segments used by WordPress-style permalinks.
static DATE_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(19|20)\d{2}/(0[1-9]|1[0-2])(/|$)").unwrap());

/// Editorial slug prefixes that mark a post even outside a /blog/ prefix.
static BLOG_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(how-to-|why-|what-is-|what-are-|when-to-|where-to-|guide-to-|top-\d+|best-|tips-for-|diy-)")
        .unwrap()
});

static LOCATION_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(locations?|areas?|service-areas?|cities|neighborhoods)(/|$)").unwrap()
});

/// Geo connectors inside a slug, e.g. `plumber-in-dallas`.
static LOCATION_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(in|near|for|serving)-").unwrap());

static SERVICE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(services?|what-we-do|solutions)(/|$)").unwrap());

/// Single-segment paths that are site plumbing, not service pages.
const UTILITY_SEGMENTS: &[&str] = &[
    "privacy",
    "privacy-policy",
    "terms",
    "terms-of-service",
    "terms-and-conditions",
    "sitemap",
    "careers",
    "jobs",
    "login",
    "sign-in",
    "signin",
    "register",
    "account",
    "cart",
    "checkout",
    "search",
    "wp-admin",
    "admin",
    "404",
    "not-found",
    "thank-you",
    "thanks",
    "feed",
    "rss",
];

/// Classify a URL into a page-type category.
///
/// Never panics. Matching is case-insensitive and trailing slashes are
/// stripped before any pattern check.
pub fn classify_url_type(url: &str) -> UrlType {
    let path = extract_path(url);

    if path.is_empty() || path == "/" {
        return UrlType::Homepage;
    }
    if INDEX_RE.is_match(&path) {
        return UrlType::Homepage;
    }
    if CONTACT_RE.is_match(&path) {
        return UrlType::Contact;
    }
    if ABOUT_RE.is_match(&path) {
        return UrlType::About;
    }
    if GALLERY_RE.is_match(&path) {
        return UrlType::Gallery;
    }
    if TESTIMONIALS_RE.is_match(&path) {
        return UrlType::Testimonials;
    }
    if FAQ_RE.is_match(&path) {
        return UrlType::Faq;
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let last = segments.last().copied().unwrap_or("");

    if BLOG_PREFIX_RE.is_match(&path)
        || DATE_SEGMENT_RE.is_match(&path)
        || BLOG_SLUG_RE.is_match(last)
    {
        return UrlType::Blog;
    }

    let trailing_state = last
        .rsplit('-')
        .next()
        .is_some_and(geo::is_state_code);
    if LOCATION_PREFIX_RE.is_match(&path) || LOCATION_SEGMENT_RE.is_match(last) || trailing_state
    {
        return UrlType::Location;
    }

    if SERVICE_PREFIX_RE.is_match(&path)
        || (segments.len() == 1 && !UTILITY_SEGMENTS.contains(&last))
    {
        return UrlType::Service;
    }

    UrlType::Other
}

/// Extract a normalized path from a URL string.
///
/// Full URLs go through `url::Url`; scheme-less input gets a second parse
/// attempt with an `https://` prefix; anything else is treated as a raw
/// path with query/fragment stripped.
fn extract_path(raw: &str) -> String {
    let raw = raw.trim();

    let path = match Url::parse(raw) {
        Ok(u) => u.path().to_string(),
        Err(_) => {
            let retried = if raw.starts_with('/') {
                None
            } else {
                Url::parse(&format!("https://{raw}")).ok()
            };
            match retried {
                Some(u) => u.path().to_string(),
                None => raw
                    .split(['?', '#'])
                    .next()
                    .unwrap_or("")
                    .to_string(),
            }
        }
    };

    let mut path = path.to_lowercase();
    while path.len() > 1 && path.ends_with('/') {
        path.pop();
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_homepage_variants() {
        assert_eq!(classify_url_type("https://acme.com/"), UrlType::Homepage);
        assert_eq!(classify_url_type("https://acme.com"), UrlType::Homepage);
        assert_eq!(classify_url_type("/"), UrlType::Homepage);
        assert_eq!(
            classify_url_type("https://acme.com/index.html"),
            UrlType::Homepage
        );
        assert_eq!(
            classify_url_type("https://acme.com/index.php"),
            UrlType::Homepage
        );
    }

    #[test]
    fn test_utility_page_patterns() {
        assert_eq!(
            classify_url_type("https://acme.com/contact-us/"),
            UrlType::Contact
        );
        assert_eq!(
            classify_url_type("https://acme.com/get-in-touch"),
            UrlType::Contact
        );
        assert_eq!(classify_url_type("https://acme.com/about"), UrlType::About);
        assert_eq!(
            classify_url_type("https://acme.com/our-team"),
            UrlType::About
        );
        assert_eq!(
            classify_url_type("https://acme.com/gallery/kitchens"),
            UrlType::Gallery
        );
        assert_eq!(
            classify_url_type("https://acme.com/reviews"),
            UrlType::Testimonials
        );
        assert_eq!(classify_url_type("https://acme.com/faq"), UrlType::Faq);
    }

    #[test]
    fn test_blog_patterns() {
        assert_eq!(
            classify_url_type("https://acme.com/blog/winter-prep"),
            UrlType::Blog
        );
        // WordPress date permalink, no /blog/ prefix
        assert_eq!(
            classify_url_type("https://acme.com/2023/05/pipe-freeze"),
            UrlType::Blog
        );
        // Editorial slug prefix
        assert_eq!(
            classify_url_type("https://acme.com/how-to-unclog-a-drain"),
            UrlType::Blog
        );
        assert_eq!(
            classify_url_type("https://acme.com/top-10-plumbing-mistakes"),
            UrlType::Blog
        );
    }

    #[test]
    fn test_location_patterns() {
        assert_eq!(
            classify_url_type("https://acme.com/locations/dallas"),
            UrlType::Location
        );
        assert_eq!(
            classify_url_type("https://acme.com/plumber-in-dallas"),
            UrlType::Location
        );
        // Trailing state code
        assert_eq!(
            classify_url_type("https://acme.com/plumber-dallas-tx"),
            UrlType::Location
        );
        // Canadian province code
        assert_eq!(
            classify_url_type("https://acme.com/movers-toronto-on"),
            UrlType::Location
        );
    }

    #[test]
    fn test_service_patterns() {
        assert_eq!(
            classify_url_type("https://acme.com/services/drain-cleaning"),
            UrlType::Service
        );
        // Single non-utility segment defaults to a service page
        assert_eq!(
            classify_url_type("https://acme.com/plumbing-repair"),
            UrlType::Service
        );
    }

    #[test]
    fn test_single_segment_utility_excluded() {
        assert_eq!(
            classify_url_type("https://acme.com/privacy"),
            UrlType::Other
        );
        assert_eq!(
            classify_url_type("https://acme.com/checkout"),
            UrlType::Other
        );
        assert_eq!(
            classify_url_type("https://acme.com/wp-admin"),
            UrlType::Other
        );
    }

    #[test]
    fn test_priority_order_contact_beats_blog_slug() {
        // "book-now" hits the contact pattern before any later rule
        assert_eq!(
            classify_url_type("https://acme.com/book-now"),
            UrlType::Contact
        );
    }

    #[test]
    fn test_malformed_url_falls_back_to_path() {
        assert_eq!(classify_url_type("/plumbing-repair"), UrlType::Service);
        assert_eq!(classify_url_type("acme.com/faq"), UrlType::Faq);
        assert_eq!(classify_url_type(""), UrlType::Homepage);
        // Garbage input degrades, never panics
        assert_eq!(classify_url_type("^^^/!!!/<<<"), UrlType::Other);
    }

    #[test]
    fn test_case_insensitive_and_trailing_slash() {
        assert_eq!(
            classify_url_type("https://acme.com/Plumber-Dallas-TX/"),
            UrlType::Location
        );
    }
}
