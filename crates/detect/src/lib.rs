//! Keyword cannibalization detection.
//!
//! Four heuristic tiers over per-market ranked-keyword data and crawled
//! pages:
//! 1. SERP-verified conflicts: two domain URLs in the same SERP
//! 2. Wrong page ranking: a page type mismatching the keyword's intent
//! 3. N-gram overlap: two pages targeting the same keyword phrases
//! 4. Content overlap: title/H1 clustering for pages without SERP data
//!
//! plus a page-centric ranking map. Every function here is a pure,
//! synchronous function of its arguments: no I/O, no shared state, and
//! deterministic output ordering for identical input.

mod content;
mod ngram;
mod pages;
mod serp;

use std::collections::{BTreeMap, HashSet};

pub use content::detect_content_overlaps;
pub use ngram::detect_ngram_overlaps;
pub use pages::build_ranking_page_map;
pub use serp::{detect_cannibalization_conflicts, detect_wrong_page_rankings};

use serpclash_model::{AuditReport, CrawledPage, MarketData};

/// Run all four tiers plus the ranking page map.
///
/// Tier-1 keywords feed tier 2's skip-set so the same keyword is never
/// reported by both tiers.
pub fn run_audit(
    markets: &BTreeMap<String, MarketData>,
    pages: &[CrawledPage],
    domain: &str,
    tracked_locations: &[String],
) -> AuditReport {
    tracing::debug!(
        markets = markets.len(),
        pages = pages.len(),
        domain,
        "running cannibalization audit"
    );

    let conflicts = detect_cannibalization_conflicts(markets, domain, tracked_locations);
    let skip: HashSet<String> = conflicts.iter().map(|c| c.keyword.clone()).collect();
    let wrong_page_rankings =
        detect_wrong_page_rankings(markets, domain, tracked_locations, &skip);
    let ngram_overlaps = detect_ngram_overlaps(markets);
    let content_overlaps = detect_content_overlaps(pages, domain, tracked_locations);
    let ranking_pages = build_ranking_page_map(markets);

    AuditReport {
        conflicts,
        wrong_page_rankings,
        ngram_overlaps,
        content_overlaps,
        ranking_pages,
    }
}
