//! Keyword → search-intent classification.
//!
//! Priority-ordered checks; first match wins. Brand detection runs before
//! everything else so "acme plumbing reviews" stays branded rather than
//! commercial.

use serpclash_model::KeywordIntent;

/// Question openers that mark research queries.
const QUESTION_PREFIXES: &[&str] = &[
    "how to ",
    "how do ",
    "how does ",
    "what is ",
    "what are ",
    "why does ",
    "why is ",
    "why do ",
    "can i ",
    "can you ",
    "should i ",
    "when to ",
    "when should ",
    "where to ",
    "do i need ",
];

/// Mid-keyword markers of informational intent.
const INFO_MARKERS: &[&str] = &[
    "tips",
    "guide",
    "ideas",
    "diy",
    "vs",
    "versus",
    "benefits of",
    "difference between",
    "examples",
    "checklist",
];

/// Commercial-investigation terms: the searcher is evaluating providers.
const COMMERCIAL_TERMS: &[&str] = &[
    "cost",
    "price",
    "pricing",
    "best",
    "top rated",
    "compare",
    "comparison",
    "review",
    "reviews",
    "cheap",
    "cheapest",
    "affordable",
    "worth it",
    "quote",
    "quotes",
    "estimate",
];

const NEAR_ME_MARKERS: &[&str] = &["near me", "nearby", "in my area", "close to me"];

/// Transactional terms: the searcher wants to buy or hire now.
const TRANSACTIONAL_TERMS: &[&str] = &[
    "buy",
    "hire",
    "book",
    "schedule",
    "repair",
    "install",
    "installation",
    "replacement",
    "removal",
    "cleaning",
    "contractor",
    "company",
    "service",
    "services",
    "emergency",
];

/// Classify a keyword's intent for a given domain and tracked city list.
///
/// `tracked_locations` entries are `"City,State,Country"` strings; only the
/// city segment participates in matching.
pub fn classify_keyword_intent(
    keyword: &str,
    domain: &str,
    tracked_locations: &[String],
) -> KeywordIntent {
    let kw = keyword.to_lowercase();

    if let Some(brand) = brand_token(domain) {
        if kw.contains(&brand) {
            return KeywordIntent::Branded;
        }
    }

    if QUESTION_PREFIXES.iter().any(|p| kw.starts_with(p))
        || INFO_MARKERS.iter().any(|m| contains_term(&kw, m))
    {
        return KeywordIntent::Informational;
    }

    // Geographic signals outrank commercial-investigation terms:
    // "best plumber near me" is local-commercial, not commercial.
    if NEAR_ME_MARKERS.iter().any(|m| kw.contains(m)) {
        return KeywordIntent::LocalCommercial;
    }

    // A tracked-city mention alone is enough for local intent; any
    // transactional modifier present does not change the result.
    for location in tracked_locations {
        let city = location
            .split(',')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        if city.len() >= 3 && kw.contains(&city) {
            return KeywordIntent::LocalCommercial;
        }
    }

    if COMMERCIAL_TERMS.iter().any(|t| contains_term(&kw, t)) {
        return KeywordIntent::Commercial;
    }

    if TRANSACTIONAL_TERMS.iter().any(|t| contains_term(&kw, t)) {
        return KeywordIntent::Commercial;
    }

    if kw.split_whitespace().count() <= 3 {
        KeywordIntent::Commercial
    } else {
        KeywordIntent::Informational
    }
}

/// Whole-word match for single terms, substring match for phrases.
/// Keeps "cost" from matching inside "costume".
fn contains_term(keyword: &str, term: &str) -> bool {
    if term.contains(' ') {
        keyword.contains(term)
    } else {
        keyword.split_whitespace().any(|w| w == term)
    }
}

/// The domain's brand token: hostname minus TLD, only when longer than two
/// characters (short tokens match too much).
fn brand_token(domain: &str) -> Option<String> {
    let host = domain
        .trim()
        .to_lowercase()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .split('/')
        .next()
        .unwrap_or("")
        .to_string();

    let brand = host.split('.').next().unwrap_or("").to_string();
    (brand.len() > 2).then_some(brand)
}
