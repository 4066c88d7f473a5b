//! Validation boundary for upstream provider data.
//!
//! The rank-tracking provider and the crawler both return loosely-typed
//! JSON with optional nested fields. Everything is validated and
//! normalized here, once, so the detectors can assume well-formed
//! `MarketData` and `CrawledPage` values. Derived flags the provider
//! omits (`is_cannibalized`, rank-bucket metrics) are computed during
//! parsing.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serpclash_model::{
    CrawledPage, KeywordRankingItem, MarketData, MarketMetrics, SerpMatch,
};
use thiserror::Error;

/// Errors from parsing upstream payloads.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("market snapshot at index {index} has no location")]
    MissingLocation { index: usize },
}

/// One market's payload as the provider ships it.
#[derive(Debug, Deserialize)]
struct RawSnapshot {
    location: Option<String>,
    #[serde(default)]
    items: Vec<RawItem>,
    #[serde(default)]
    new_keywords: u32,
    #[serde(default)]
    lost_keywords: u32,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    keyword: Option<String>,
    #[serde(default)]
    search_volume: Option<u64>,
    #[serde(default)]
    cpc: Option<f64>,
    /// Best same-domain SERP entry for the query
    serp: Option<RawSerpEntry>,
    /// Every same-domain SERP entry, when the provider includes them
    #[serde(default)]
    all_matches: Vec<RawSerpEntry>,
    #[serde(default)]
    maps_position: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSerpEntry {
    url: Option<String>,
    position: Option<u32>,
    #[serde(default)]
    etv: Option<f64>,
}

/// Parse a provider market-snapshot payload into detector-ready form.
///
/// Markets land in a `BTreeMap` so downstream iteration, and therefore
/// report ordering, is reproducible. Items missing a keyword or ranking
/// URL are skipped with a warning rather than failing the whole payload;
/// a snapshot without a location is a hard error because the market key
/// is unrecoverable.
pub fn parse_market_snapshots(json: &str) -> Result<BTreeMap<String, MarketData>, IngestError> {
    let snapshots: Vec<RawSnapshot> = serde_json::from_str(json)?;

    let mut markets = BTreeMap::new();
    for (index, snapshot) in snapshots.into_iter().enumerate() {
        let location = snapshot
            .location
            .filter(|l| !l.trim().is_empty())
            .ok_or(IngestError::MissingLocation { index })?;

        let mut items = Vec::new();
        for raw in snapshot.items {
            match normalize_item(raw) {
                Some(item) => items.push(item),
                None => {
                    tracing::warn!(market = %location, "skipping keyword record without keyword or URL");
                }
            }
        }

        let metrics = derive_metrics(&items, snapshot.new_keywords, snapshot.lost_keywords);
        let mut data = MarketData::new(location.clone(), items);
        data.metrics = metrics;
        markets.insert(location, data);
    }

    Ok(markets)
}

fn normalize_item(raw: RawItem) -> Option<KeywordRankingItem> {
    let keyword = raw.keyword.filter(|k| !k.trim().is_empty())?;

    let serp_matches: Vec<SerpMatch> = raw
        .all_matches
        .iter()
        .filter_map(|entry| {
            Some(SerpMatch {
                url: entry.url.clone().filter(|u| !u.is_empty())?,
                position: entry.position?,
                etv: entry.etv.unwrap_or(0.0),
            })
        })
        .collect();

    // Best entry: the explicit one, or the best-ranked of the matches
    let best = raw
        .serp
        .as_ref()
        .and_then(|e| {
            Some(SerpMatch {
                url: e.url.clone().filter(|u| !u.is_empty())?,
                position: e.position?,
                etv: e.etv.unwrap_or(0.0),
            })
        })
        .or_else(|| serp_matches.iter().min_by_key(|m| m.position).cloned())?;

    let distinct_urls: HashSet<&str> = serp_matches.iter().map(|m| m.url.as_str()).collect();

    Some(KeywordRankingItem {
        keyword,
        search_volume: raw.search_volume.unwrap_or(0),
        cpc: raw.cpc.unwrap_or(0.0),
        position: best.position,
        url: best.url,
        etv: best.etv,
        is_cannibalized: distinct_urls.len() >= 2,
        serp_matches,
        maps_position: raw.maps_position,
    })
}

fn derive_metrics(items: &[KeywordRankingItem], new_keywords: u32, lost_keywords: u32) -> MarketMetrics {
    let mut metrics = MarketMetrics {
        new_keywords,
        lost_keywords,
        ..Default::default()
    };
    for item in items {
        match item.position {
            1..=3 => {
                metrics.top3 += 1;
                metrics.top10 += 1;
                metrics.top100 += 1;
            }
            4..=10 => {
                metrics.top10 += 1;
                metrics.top100 += 1;
            }
            11..=100 => metrics.top100 += 1,
            _ => {}
        }
    }
    metrics
}

/// One crawled URL as the crawler ships it.
#[derive(Debug, Deserialize)]
struct RawPage {
    url: Option<String>,
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    h1: Vec<String>,
    #[serde(default)]
    meta_description: Option<String>,
    #[serde(default)]
    word_count: Option<u32>,
}

/// Parse a crawler payload. Entries without a URL are skipped with a
/// warning; everything else defaults to empty/zero.
pub fn parse_crawled_pages(json: &str) -> Result<Vec<CrawledPage>, IngestError> {
    let raw: Vec<RawPage> = serde_json::from_str(json)?;

    let mut pages = Vec::new();
    for entry in raw {
        let Some(url) = entry.url.filter(|u| !u.trim().is_empty()) else {
            tracing::warn!("skipping crawled page without URL");
            continue;
        };
        pages.push(CrawledPage {
            url,
            status_code: entry.status_code.unwrap_or(200),
            title: entry.title.unwrap_or_default(),
            h1: entry.h1,
            meta_description: entry.meta_description.unwrap_or_default(),
            word_count: entry.word_count.unwrap_or(0),
        });
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"[
        {
            "location": "Dallas,Texas,United States",
            "new_keywords": 2,
            "items": [
                {
                    "keyword": "emergency plumber dallas",
                    "search_volume": 300,
                    "cpc": 12.5,
                    "all_matches": [
                        {"url": "https://acme.com/", "position": 2, "etv": 120.0},
                        {"url": "https://acme.com/emergency-plumbing", "position": 6, "etv": 30.0}
                    ]
                },
                {
                    "keyword": "drain cleaning",
                    "search_volume": 90,
                    "serp": {"url": "https://acme.com/drains", "position": 12}
                },
                {
                    "keyword": "",
                    "serp": {"url": "https://acme.com/x", "position": 4}
                }
            ]
        }
    ]"#;

    #[test]
    fn test_parse_snapshot_derives_flags() {
        let markets = parse_market_snapshots(SNAPSHOT).unwrap();
        assert_eq!(markets.len(), 1);

        let data = &markets["Dallas,Texas,United States"];
        // The empty-keyword record is skipped, not fatal
        assert_eq!(data.items.len(), 2);

        let cannibal = &data.items[0];
        assert!(cannibal.is_cannibalized);
        assert_eq!(cannibal.position, 2);
        assert_eq!(cannibal.url, "https://acme.com/");
        assert_eq!(cannibal.serp_matches.len(), 2);

        let single = &data.items[1];
        assert!(!single.is_cannibalized);
        assert_eq!(single.position, 12);
        assert_eq!(single.etv, 0.0);
    }

    #[test]
    fn test_parse_snapshot_metrics() {
        let markets = parse_market_snapshots(SNAPSHOT).unwrap();
        let metrics = markets["Dallas,Texas,United States"].metrics;
        assert_eq!(metrics.top3, 1);
        assert_eq!(metrics.top10, 1);
        assert_eq!(metrics.top100, 2);
        assert_eq!(metrics.new_keywords, 2);
    }

    #[test]
    fn test_duplicate_url_matches_not_cannibalized() {
        // Two SERP entries for the same URL (e.g. sitelinks) are not
        // cannibalization
        let json = r#"[{
            "location": "Dallas,Texas,United States",
            "items": [{
                "keyword": "plumber",
                "all_matches": [
                    {"url": "https://acme.com/", "position": 2},
                    {"url": "https://acme.com/", "position": 3}
                ]
            }]
        }]"#;
        let markets = parse_market_snapshots(json).unwrap();
        assert!(!markets["Dallas,Texas,United States"].items[0].is_cannibalized);
    }

    #[test]
    fn test_missing_location_is_fatal() {
        let json = r#"[{"items": []}]"#;
        assert!(matches!(
            parse_market_snapshots(json),
            Err(IngestError::MissingLocation { index: 0 })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_market_snapshots("{not json"),
            Err(IngestError::Json(_))
        ));
    }

    #[test]
    fn test_parse_pages_defaults_and_skips() {
        let json = r#"[
            {"url": "https://acme.com/services/drains", "title": "Drain Cleaning", "h1": ["Drain Cleaning"], "word_count": 640},
            {"title": "orphaned record"},
            {"url": "https://acme.com/404-page", "status_code": 404}
        ]"#;
        let pages = parse_crawled_pages(json).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].status_code, 200);
        assert_eq!(pages[0].word_count, 640);
        assert_eq!(pages[1].status_code, 404);
    }
}
