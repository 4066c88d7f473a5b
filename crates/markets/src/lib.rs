//! Geographic market discovery.
//!
//! Extracts candidate markets (city/state/country triples) from a site's
//! crawled location pages and, as a fallback, from page text via frequency
//! analysis. Everything here is best-effort heuristics: missing data yields
//! empty results or `None`, never an error.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serpclash_classify::{classify_url_type, geo};
use serpclash_model::{BusinessInfo, CrawledPage, DetectedCity, DiscoveredMarket, UrlType};

/// Route words that structure location URLs but are not city names.
const GENERIC_ROUTE_SEGMENTS: &[&str] = &[
    "locations",
    "location",
    "areas",
    "area",
    "service-areas",
    "service-area",
    "cities",
    "neighborhoods",
];

/// A city is only trusted from page text when mentioned more than this
/// many times across the crawl.
const CITY_CONFIDENCE_THRESHOLD: u32 = 3;

/// `City, ST` or `City, Full State Name` as it appears in titles and
/// descriptions. The second group is validated against the geo tables
/// after matching.
static CITY_MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b([A-Z][a-zA-Z]+(?: [A-Z][a-zA-Z]+){0,2}),\s*([A-Z]{2}\b|[A-Z][a-z]+(?: [A-Z][a-z]+){0,2})",
    )
    .unwrap()
});

/// Extract candidate markets from crawled location pages.
///
/// Each location-type page contributes at most one market: the last
/// non-generic path segment is parsed for a trailing state/province code or
/// full state name. When neither is present the detected business's region
/// is used, provided the record is available and the city token is at least
/// three characters. Results are deduplicated by lowercase city+state and
/// returned in crawl order.
pub fn discover_markets_from_crawl(
    pages: &[CrawledPage],
    business: Option<&BusinessInfo>,
) -> Vec<DiscoveredMarket> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut markets = Vec::new();

    for page in pages {
        if classify_url_type(&page.url) != UrlType::Location {
            continue;
        }
        let Some(slug) = city_slug(&page.url) else {
            continue;
        };

        let candidate = parse_city_state(&slug).or_else(|| {
            // No state in the URL: fall back to the business region
            let state = business?.state.as_deref()?;
            let city = title_case(&slug.replace('-', " "));
            (city.len() >= 3).then(|| (city, state.to_string()))
        });

        let Some((city, state)) = candidate else {
            continue;
        };

        let key = format!("{}|{}", city.to_lowercase(), state.to_lowercase());
        if !seen.insert(key) {
            continue;
        }

        let country = geo::country_for(&state)
            .or(business.and_then(|b| b.country.as_deref()))
            .unwrap_or("United States");
        markets.push(DiscoveredMarket {
            market: build_market_string(&city, &state, country),
            city,
        });
    }

    markets
}

/// Last path segment that is not a generic route word.
fn city_slug(url: &str) -> Option<String> {
    let after_scheme = url.split("://").nth(1).unwrap_or(url);
    let path = after_scheme
        .split_once('/')
        .map(|(_, p)| p)
        .unwrap_or("");
    path.split(['?', '#'])
        .next()
        .unwrap_or("")
        .split('/')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty() && !GENERIC_ROUTE_SEGMENTS.contains(&s.as_str()))
        .next_back()
}

/// Split a hyphenated slug into (city, state) when it ends in a state code
/// or full state name, e.g. `plumber-dallas-tx` or `albany-new-york`.
fn parse_city_state(slug: &str) -> Option<(String, String)> {
    let tokens: Vec<&str> = slug.split('-').filter(|t| !t.is_empty()).collect();
    if tokens.len() < 2 {
        return None;
    }

    // Try the longest state-name suffix first so "new-york" is not read as
    // the city "New" in the state "York".
    let max_suffix = tokens.len().saturating_sub(1).min(3);
    for n in (1..=max_suffix).rev() {
        let suffix = tokens[tokens.len() - n..].join(" ");
        let state = if n == 1 && geo::is_state_code(&suffix) {
            geo::state_name(&suffix)
        } else {
            geo::state_code(&suffix).and_then(geo::state_name)
        };
        if let Some(state) = state {
            let city = title_case(&tokens[..tokens.len() - n].join(" "));
            if city.is_empty() {
                return None;
            }
            return Some((city, state.to_string()));
        }
    }
    None
}

/// Scan page titles, descriptions, and H1s for `City, State` mentions and
/// return the most frequent city, but only when it clears the confidence
/// threshold. `None` means insufficient signal, not an error.
pub fn detect_city_from_content(pages: &[CrawledPage]) -> Option<DetectedCity> {
    struct Mentions {
        count: u32,
        city: String,
        state: String,
        sources: Vec<String>,
    }

    // BTreeMap keeps the tie-break deterministic
    let mut by_city: BTreeMap<String, Mentions> = BTreeMap::new();

    let mut scan = |text: &str, source: &str, by_city: &mut BTreeMap<String, Mentions>| {
        for caps in CITY_MENTION_RE.captures_iter(text) {
            let city = caps[1].to_string();
            let state_raw = &caps[2];
            let Some(state) = geo::canonical_state(state_raw) else {
                continue;
            };
            let entry = by_city
                .entry(format!("{}|{}", city.to_lowercase(), state.to_lowercase()))
                .or_insert_with(|| Mentions {
                    count: 0,
                    city: city.clone(),
                    state: state.to_string(),
                    sources: Vec::new(),
                });
            entry.count += 1;
            if !entry.sources.iter().any(|s| s == source) {
                entry.sources.push(source.to_string());
            }
        }
    };

    for page in pages {
        scan(&page.title, "title", &mut by_city);
        scan(&page.meta_description, "description", &mut by_city);
        for h1 in &page.h1 {
            scan(h1, "h1", &mut by_city);
        }
    }

    let best = by_city.into_values().max_by(|a, b| {
        a.count
            .cmp(&b.count)
            .then_with(|| b.city.cmp(&a.city)) // reversed: earlier name wins ties
    })?;

    if best.count <= CITY_CONFIDENCE_THRESHOLD {
        return None;
    }

    let country = geo::country_for(&best.state).unwrap_or("United States");
    Some(DetectedCity {
        location: build_market_string(&best.city, &best.state, country),
        city: best.city,
        confidence: best.count,
        sources: best.sources,
    })
}

/// Compose the canonical `"City,State,Country"` market key.
///
/// The state may arrive as a 2-letter code or a full name; both normalize
/// to the canonical full name. Unrecognized input is title-cased as-is;
/// best effort, never an error.
pub fn build_market_string(city: &str, state: &str, country: &str) -> String {
    let state = geo::canonical_state(state)
        .map(str::to_string)
        .unwrap_or_else(|| title_case(state));
    format!("{},{},{}", city, state, country)
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
