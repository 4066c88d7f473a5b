//! Tier 3: keyword n-gram overlap between ranking pages.
//!
//! Two pages can cannibalize each other without ever sharing a SERP: if
//! their ranked-keyword sets break down into largely the same 2- and 3-word
//! phrases, they are targeting the same topic. This tier builds one phrase
//! profile per ranking URL and compares every pair.

use std::collections::BTreeMap;

use serpclash_classify::classify_url_type;
use serpclash_model::{MarketData, NgramOverlapConflict, OverlapRisk, UrlType};

/// Only rankings this deep contribute to a profile.
const MAX_PROFILE_POSITION: u32 = 100;
/// A profile keeps its top phrases by volume, nothing more.
const MAX_PROFILE_NGRAMS: usize = 20;
/// Pairs must share at least this many phrases to be reported.
const MIN_SHARED_NGRAMS: usize = 2;
/// Sharing this many phrases is reported regardless of overlap percentage.
const STRONG_SHARED_NGRAMS: usize = 3;
/// Minimum overlap percentage when the shared count is below the strong cutoff.
const MIN_OVERLAP_PCT: f64 = 15.0;
/// Overlap percentage at which the pair is rated high risk.
const HIGH_RISK_PCT: f64 = 50.0;

struct PageProfile {
    url: String,
    page_type: UrlType,
    /// phrase → summed search volume of the keywords containing it
    ngrams: BTreeMap<String, u64>,
}

/// Detect keyword-targeting overlap between distinct ranking pages.
///
/// Output is sorted by risk, then descending shared volume, then URL pair,
/// so identical input yields identical ordering.
pub fn detect_ngram_overlaps(
    markets: &BTreeMap<String, MarketData>,
) -> Vec<NgramOverlapConflict> {
    let profiles = build_profiles(markets);

    let mut overlaps = Vec::new();
    for i in 0..profiles.len() {
        for j in (i + 1)..profiles.len() {
            let (a, b) = (&profiles[i], &profiles[j]);

            let shared: Vec<&String> = a
                .ngrams
                .keys()
                .filter(|g| b.ngrams.contains_key(*g))
                .collect();
            if shared.len() < MIN_SHARED_NGRAMS {
                continue;
            }

            let smaller = a.ngrams.len().min(b.ngrams.len()) as f64;
            let overlap_pct = shared.len() as f64 / smaller * 100.0;
            if overlap_pct < MIN_OVERLAP_PCT && shared.len() < STRONG_SHARED_NGRAMS {
                continue;
            }

            let shared_volume: u64 = shared
                .iter()
                .map(|g| a.ngrams[*g] + b.ngrams[*g])
                .sum();
            let risk = if overlap_pct >= HIGH_RISK_PCT {
                OverlapRisk::High
            } else {
                OverlapRisk::Medium
            };

            overlaps.push(NgramOverlapConflict {
                page_a: a.url.clone(),
                page_a_type: a.page_type,
                page_b: b.url.clone(),
                page_b_type: b.page_type,
                shared_ngrams: shared.into_iter().cloned().collect(),
                overlap_pct,
                shared_volume,
                risk,
            });
        }
    }

    overlaps.sort_by(|a, b| {
        a.risk
            .cmp(&b.risk)
            .then(b.shared_volume.cmp(&a.shared_volume))
            .then_with(|| a.page_a.cmp(&b.page_a))
            .then_with(|| a.page_b.cmp(&b.page_b))
    });

    tracing::debug!(count = overlaps.len(), "tier-3 n-gram overlaps detected");
    overlaps
}

/// One profile per distinct ranking URL, utility pages excluded, truncated
/// to the top 20 phrases by volume.
fn build_profiles(markets: &BTreeMap<String, MarketData>) -> Vec<PageProfile> {
    let mut by_url: BTreeMap<String, PageProfile> = BTreeMap::new();

    for data in markets.values() {
        for item in &data.items {
            if item.position == 0 || item.position > MAX_PROFILE_POSITION {
                continue;
            }
            let page_type = classify_url_type(&item.url);
            if page_type.is_utility() {
                continue;
            }

            let profile = by_url
                .entry(item.url.clone())
                .or_insert_with(|| PageProfile {
                    url: item.url.clone(),
                    page_type,
                    ngrams: BTreeMap::new(),
                });
            for gram in keyword_ngrams(&item.keyword) {
                *profile.ngrams.entry(gram).or_insert(0) += item.search_volume;
            }
        }
    }

    let mut profiles: Vec<PageProfile> = by_url.into_values().collect();
    for profile in &mut profiles {
        truncate_profile(&mut profile.ngrams);
    }
    profiles
}

/// Keep the top `MAX_PROFILE_NGRAMS` phrases by volume; ties broken by
/// phrase text so truncation is deterministic.
fn truncate_profile(ngrams: &mut BTreeMap<String, u64>) {
    if ngrams.len() <= MAX_PROFILE_NGRAMS {
        return;
    }
    let mut ranked: Vec<(String, u64)> = std::mem::take(ngrams).into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(MAX_PROFILE_NGRAMS);
    *ngrams = ranked.into_iter().collect();
}

/// 2- and 3-word phrases from a keyword: lowercased, punctuation stripped,
/// short words dropped.
fn keyword_ngrams(keyword: &str) -> Vec<String> {
    let cleaned: String = keyword
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let words: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| w.len() > 2)
        .collect();

    let mut grams = Vec::new();
    for window in words.windows(2) {
        grams.push(window.join(" "));
    }
    for window in words.windows(3) {
        grams.push(window.join(" "));
    }
    grams
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serpclash_model::KeywordRankingItem;

    fn markets_with(items: Vec<KeywordRankingItem>) -> BTreeMap<String, MarketData> {
        let mut markets = BTreeMap::new();
        markets.insert(
            "Dallas,Texas,United States".to_string(),
            MarketData::new("Dallas,Texas,United States", items),
        );
        markets
    }

    #[test]
    fn test_keyword_ngrams_shape() {
        let grams = keyword_ngrams("emergency water heater repair");
        assert_eq!(
            grams,
            vec![
                "emergency water".to_string(),
                "water heater".to_string(),
                "heater repair".to_string(),
                "emergency water heater".to_string(),
                "water heater repair".to_string(),
            ]
        );
    }

    #[test]
    fn test_keyword_ngrams_drops_short_words() {
        // "a" and "in" are dropped before windowing
        let grams = keyword_ngrams("plumber in a hurry");
        assert_eq!(grams, vec!["plumber hurry".to_string()]);
    }

    #[test]
    fn test_pair_below_shared_threshold_omitted() {
        // Each page ranks for one keyword; they share exactly one bigram
        // ("water heater"), below the ≥2 threshold.
        let markets = markets_with(vec![
            KeywordRankingItem::new("water heater repair", 100, 5, "https://acme.com/repair"),
            KeywordRankingItem::new(
                "water heater installation",
                100,
                7,
                "https://acme.com/install",
            ),
        ]);
        assert!(detect_ngram_overlaps(&markets).is_empty());
    }

    #[test]
    fn test_shared_phrases_reported() {
        let markets = markets_with(vec![
            KeywordRankingItem::new("emergency water heater repair", 100, 5, "https://acme.com/a"),
            KeywordRankingItem::new("emergency water heater repair", 80, 9, "https://acme.com/b"),
        ]);

        let overlaps = detect_ngram_overlaps(&markets);
        assert_eq!(overlaps.len(), 1);
        let o = &overlaps[0];
        // Identical keyword → identical profiles → 100% overlap
        assert_eq!(o.overlap_pct, 100.0);
        assert_eq!(o.risk, OverlapRisk::High);
        assert_eq!(o.shared_volume, 5 * 180);
    }

    /// Pad both pages' profiles to 20 phrases with disjoint keywords.
    fn pad_profiles(items: &mut Vec<KeywordRankingItem>) {
        for i in 0..9 {
            items.push(KeywordRankingItem::new(
                format!("alpha{i} bravo{i} charlie{i}"),
                10,
                5,
                "https://acme.com/a",
            ));
            items.push(KeywordRankingItem::new(
                format!("delta{i} echo{i} foxtrot{i}"),
                10,
                9,
                "https://acme.com/b",
            ));
        }
    }

    #[test]
    fn test_two_shared_below_pct_threshold_omitted() {
        // Two shared bigrams out of 20-phrase profiles: 10% overlap, below
        // both the 15% cutoff and the 3-shared strong cutoff → omitted.
        let mut items = vec![
            KeywordRankingItem::new("tankless heater", 50, 5, "https://acme.com/a"),
            KeywordRankingItem::new("tankless heater", 50, 9, "https://acme.com/b"),
            KeywordRankingItem::new("smart thermostat", 50, 6, "https://acme.com/a"),
            KeywordRankingItem::new("smart thermostat", 50, 11, "https://acme.com/b"),
        ];
        pad_profiles(&mut items);

        assert!(detect_ngram_overlaps(&markets_with(items)).is_empty());
    }

    #[test]
    fn test_three_shared_passes_despite_low_pct() {
        // Three shared phrases (two bigrams + one trigram from a shared
        // 3-word keyword) clear the strong-shared cutoff at 15% overlap.
        let mut items = vec![
            KeywordRankingItem::new("tankless heater options", 50, 5, "https://acme.com/a"),
            KeywordRankingItem::new("tankless heater options", 50, 9, "https://acme.com/b"),
        ];
        pad_profiles(&mut items);

        let overlaps = detect_ngram_overlaps(&markets_with(items));
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].shared_ngrams.len(), 3);
        assert_eq!(overlaps[0].risk, OverlapRisk::Medium);
    }

    #[test]
    fn test_utility_pages_excluded() {
        let markets = markets_with(vec![
            KeywordRankingItem::new(
                "emergency water heater repair",
                100,
                5,
                "https://acme.com/contact",
            ),
            KeywordRankingItem::new(
                "emergency water heater repair",
                80,
                9,
                "https://acme.com/faq",
            ),
        ]);
        assert!(detect_ngram_overlaps(&markets).is_empty());
    }

    #[test]
    fn test_deep_rankings_excluded() {
        let markets = markets_with(vec![
            KeywordRankingItem::new("emergency water heater repair", 100, 101, "https://acme.com/a"),
            KeywordRankingItem::new("emergency water heater repair", 80, 9, "https://acme.com/b"),
        ]);
        assert!(detect_ngram_overlaps(&markets).is_empty());
    }
}
