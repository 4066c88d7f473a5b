//! Page-centric ranking view: everything each URL ranks for.

use std::collections::{BTreeMap, HashSet};

use serpclash_classify::classify_url_type;
use serpclash_model::{MarketData, RankingPage};

/// Flatten all markets into one `RankingPage` per distinct ranking URL.
///
/// Volume and ETV sum over every market appearance; the keyword list is
/// deduplicated. Sorted by total ETV descending, then URL, so identical
/// input yields identical ordering. Supporting evidence for the conflict
/// tiers, not a detector itself.
pub fn build_ranking_page_map(markets: &BTreeMap<String, MarketData>) -> Vec<RankingPage> {
    struct Acc {
        keywords: Vec<String>,
        seen: HashSet<String>,
        total_volume: u64,
        total_etv: f64,
        best_position: u32,
    }

    let mut by_url: BTreeMap<String, Acc> = BTreeMap::new();

    for data in markets.values() {
        for item in &data.items {
            if item.url.is_empty() {
                continue;
            }
            let acc = by_url.entry(item.url.clone()).or_insert_with(|| Acc {
                keywords: Vec::new(),
                seen: HashSet::new(),
                total_volume: 0,
                total_etv: 0.0,
                best_position: u32::MAX,
            });
            if acc.seen.insert(item.keyword.clone()) {
                acc.keywords.push(item.keyword.clone());
            }
            acc.total_volume += item.search_volume;
            acc.total_etv += item.etv;
            acc.best_position = acc.best_position.min(item.position);
        }
    }

    let mut pages: Vec<RankingPage> = by_url
        .into_iter()
        .map(|(url, acc)| RankingPage {
            page_type: classify_url_type(&url),
            url,
            keyword_count: acc.keywords.len(),
            keywords: acc.keywords,
            total_volume: acc.total_volume,
            total_etv: acc.total_etv,
            best_position: acc.best_position,
        })
        .collect();

    pages.sort_by(|a, b| {
        b.total_etv
            .partial_cmp(&a.total_etv)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.url.cmp(&b.url))
    });

    pages
}
