//! Tier 4: content-based overlap for pages without reliable SERP data.
//!
//! New or unranked pages cannot be caught by the SERP tiers, so this tier
//! works from on-page signals alone: titles and H1s are reduced to specific
//! two-word phrases, and pages sharing a phrase are clustered with a
//! union-find. A document-frequency filter removes site-wide boilerplate
//! phrases that would otherwise link every page together.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use regex::Regex;
use serpclash_conflicts::group_guidance;
use serpclash_model::{ContentOverlapGroup, CrawledPage, OverlapRisk, PageRef, UrlType};

use serpclash_classify::classify_url_type;

/// A phrase must appear on at least this many pages to link anything.
const MIN_PHRASE_PAGES: usize = 2;
/// Phrases on more than ceil(this fraction × page count) pages are treated
/// as site-wide boilerplate and ignored.
const MAX_PHRASE_PAGE_RATIO: f64 = 0.30;
/// Groups of this many pages or more are rated high risk.
const HIGH_RISK_GROUP_SIZE: usize = 3;

/// Words carrying no topical signal in titles and headings.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "your", "our", "you", "are", "can", "all", "any", "get",
    "has", "have", "how", "its", "more", "most", "new", "not", "now", "off", "one", "out",
    "top", "use", "was", "way", "what", "when", "where", "which", "who", "why", "will",
    "that", "this", "from", "they", "been", "best", "into", "over", "than", "then", "them",
    "there", "these", "about", "after", "before", "other", "some", "such", "only", "also",
];

/// Marketing bigrams common to nearly every local-business site.
const GENERIC_BIGRAMS: &[&str] = &[
    "near me",
    "contact us",
    "call today",
    "call now",
    "free estimate",
    "free estimates",
    "free quote",
    "get started",
    "learn more",
    "our services",
    "service area",
    "years experience",
    "locally owned",
    "family owned",
    "licensed insured",
    "highly recommend",
];

/// Array-backed disjoint set with path compression. Local to one detection
/// call; nothing is shared across invocations.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Deterministic: smaller index wins as root
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

/// Cluster pages that target the same topic based on title/H1 phrases.
///
/// Output is sorted by risk, then descending page count, then first URL.
pub fn detect_content_overlaps(
    pages: &[CrawledPage],
    domain: &str,
    tracked_locations: &[String],
) -> Vec<ContentOverlapGroup> {
    let noise = NoiseStripper::new(domain, tracked_locations);

    // Eligible pages with their target bigrams
    let mut eligible: Vec<(&CrawledPage, UrlType, BTreeSet<String>)> = Vec::new();
    for page in pages {
        if page.status_code >= 400 {
            continue;
        }
        let page_type = classify_url_type(&page.url);
        if !page_type.is_content_eligible() {
            continue;
        }
        let bigrams = target_bigrams(page, &noise);
        eligible.push((page, page_type, bigrams));
    }
    if eligible.len() < MIN_PHRASE_PAGES {
        return Vec::new();
    }

    // Document frequency per bigram across eligible pages
    let mut frequency: HashMap<&str, usize> = HashMap::new();
    for (_, _, bigrams) in &eligible {
        for gram in bigrams {
            *frequency.entry(gram.as_str()).or_insert(0) += 1;
        }
    }

    // Specificity filter: frequent enough to link pages, rare enough to
    // not be boilerplate.
    let max_pages = (eligible.len() as f64 * MAX_PHRASE_PAGE_RATIO).ceil() as usize;
    let specific: HashSet<&str> = frequency
        .iter()
        .filter(|(_, &df)| df >= MIN_PHRASE_PAGES && df <= max_pages)
        .map(|(gram, _)| *gram)
        .collect();

    // Union pages sharing any specific bigram
    let mut uf = UnionFind::new(eligible.len());
    let mut first_page_with: HashMap<&str, usize> = HashMap::new();
    for (idx, (_, _, bigrams)) in eligible.iter().enumerate() {
        for gram in bigrams {
            if !specific.contains(gram.as_str()) {
                continue;
            }
            match first_page_with.get(gram.as_str()) {
                Some(&first) => uf.union(first, idx),
                None => {
                    first_page_with.insert(gram.as_str(), idx);
                }
            }
        }
    }

    // Collect groups by root
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for idx in 0..eligible.len() {
        groups.entry(uf.find(idx)).or_default().push(idx);
    }

    let mut overlaps = Vec::new();
    for members in groups.into_values() {
        if members.len() < MIN_PHRASE_PAGES {
            continue;
        }

        let shared_phrases = shared_phrases(&members, &eligible, &specific);
        if shared_phrases.is_empty() {
            continue;
        }

        let types: Vec<UrlType> = members.iter().map(|&i| eligible[i].1).collect();
        let risk = if members.len() >= HIGH_RISK_GROUP_SIZE {
            OverlapRisk::High
        } else {
            OverlapRisk::Medium
        };

        overlaps.push(ContentOverlapGroup {
            pages: members
                .iter()
                .map(|&i| PageRef {
                    url: eligible[i].0.url.clone(),
                    page_type: eligible[i].1,
                })
                .collect(),
            shared_phrases,
            risk,
            guidance: group_guidance(&types),
        });
    }

    overlaps.sort_by(|a, b| {
        a.risk
            .cmp(&b.risk)
            .then(b.pages.len().cmp(&a.pages.len()))
            .then_with(|| a.pages[0].url.cmp(&b.pages[0].url))
    });

    tracing::debug!(count = overlaps.len(), "tier-4 content overlaps detected");
    overlaps
}

/// Specific bigrams common to every member of the group, falling back to
/// those shared by at least half of them.
fn shared_phrases(
    members: &[usize],
    eligible: &[(&CrawledPage, UrlType, BTreeSet<String>)],
    specific: &HashSet<&str>,
) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &idx in members {
        for gram in &eligible[idx].2 {
            if specific.contains(gram.as_str()) {
                *counts.entry(gram.as_str()).or_insert(0) += 1;
            }
        }
    }

    let all: Vec<String> = counts
        .iter()
        .filter(|(_, &c)| c == members.len())
        .map(|(g, _)| (*g).to_string())
        .collect();
    if !all.is_empty() {
        return all;
    }

    counts
        .iter()
        .filter(|(_, &c)| c * 2 >= members.len())
        .map(|(g, _)| (*g).to_string())
        .collect()
}

/// Strips the brand name and tracked city names out of heading text.
struct NoiseStripper {
    patterns: Vec<Regex>,
}

impl NoiseStripper {
    fn new(domain: &str, tracked_locations: &[String]) -> Self {
        let mut terms: Vec<String> = Vec::new();

        let brand = domain
            .trim()
            .to_lowercase()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_start_matches("www.")
            .split(['/', '.'])
            .next()
            .unwrap_or("")
            .to_string();
        if brand.len() > 2 {
            terms.push(brand);
        }

        for location in tracked_locations {
            let city = location.split(',').next().unwrap_or("").trim().to_lowercase();
            if city.len() >= 3 {
                terms.push(city);
            }
        }

        let patterns = terms
            .iter()
            .filter_map(|t| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(t))).ok())
            .collect();
        Self { patterns }
    }

    fn strip(&self, text: &str) -> String {
        let mut out = text.to_string();
        for pattern in &self.patterns {
            out = pattern.replace_all(&out, " ").into_owned();
        }
        out
    }
}

/// Consecutive-word bigrams from a page's target text: first H1 when
/// present, otherwise the title, with the brand suffix cut at the first
/// `|`/`–`/`—`/` - ` separator.
fn target_bigrams(page: &CrawledPage, noise: &NoiseStripper) -> BTreeSet<String> {
    let source = page
        .h1
        .iter()
        .find(|h| !h.trim().is_empty())
        .map(String::as_str)
        .unwrap_or(page.title.as_str());

    let trimmed = cut_brand_suffix(source);
    let cleaned = noise.strip(trimmed);

    let lowered: String = cleaned
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let words: Vec<&str> = lowered
        .split_whitespace()
        .filter(|w| w.len() > 2 && !STOP_WORDS.contains(w))
        .collect();

    words
        .windows(2)
        .map(|w| w.join(" "))
        .filter(|g| !GENERIC_BIGRAMS.contains(&g.as_str()))
        .collect()
}

/// Everything after the first separator is assumed to be a brand suffix.
/// A bare hyphen only counts when surrounded by spaces so hyphenated words
/// survive.
fn cut_brand_suffix(text: &str) -> &str {
    let mut cut = text.len();
    for sep in ["|", "–", "—", " - "] {
        if let Some(pos) = text.find(sep) {
            cut = cut.min(pos);
        }
    }
    &text[..cut]
}
