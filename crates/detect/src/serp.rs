//! SERP-based detection: tier 1 (verified cannibalization) and tier 2
//! (wrong page ranking).

use std::collections::{BTreeMap, HashSet};

use serpclash_classify::{classify_keyword_intent, classify_url_type};
use serpclash_conflicts::{classify_conflict_type, compute_severity, is_wrong_page_winning};
use serpclash_model::{
    CannibalizationConflict, ConflictPage, KeywordIntent, MarketData, Severity, UrlType,
    WrongPageRanking,
};

/// Tier-2 only looks at keywords ranking this deep.
const WRONG_PAGE_MAX_POSITION: u32 = 20;
/// Tier-2 ignores keywords below this volume.
const WRONG_PAGE_MIN_VOLUME: u64 = 10;
/// A homepage ranking worse than this for a local-commercial query suggests
/// a missing location page. Tuned heuristic, not a proven threshold.
const HOMEPAGE_LOCAL_POSITION_CUTOFF: u32 = 5;

/// Tier 1: conflicts verified by the SERP itself, with two or more domain URLs
/// ranking for the same query in the same market.
///
/// Output is sorted by severity, then descending volume, then keyword, so
/// identical input yields identical ordering.
pub fn detect_cannibalization_conflicts(
    markets: &BTreeMap<String, MarketData>,
    domain: &str,
    tracked_locations: &[String],
) -> Vec<CannibalizationConflict> {
    let mut conflicts = Vec::new();

    for (market, data) in markets {
        for item in &data.items {
            if !item.is_cannibalized || item.serp_matches.len() < 2 {
                continue;
            }

            let mut matches = item.serp_matches.clone();
            matches.sort_by(|a, b| a.position.cmp(&b.position).then(a.url.cmp(&b.url)));

            let pages: Vec<ConflictPage> = matches
                .iter()
                .map(|m| ConflictPage {
                    url: m.url.clone(),
                    page_type: classify_url_type(&m.url),
                    position: m.position,
                    etv: m.etv,
                })
                .collect();
            let primary = pages[0].clone();
            let competitors = pages[1..].to_vec();

            let intent = classify_keyword_intent(&item.keyword, domain, tracked_locations);
            let wrong_page_winning = competitors
                .iter()
                .any(|c| is_wrong_page_winning(primary.page_type, c.page_type, intent));
            let guidance =
                classify_conflict_type(primary.page_type, competitors[0].page_type, intent);
            let severity =
                compute_severity(item.search_volume, primary.position, wrong_page_winning);
            let worst = competitors.iter().map(|c| c.position).max().unwrap_or(0);
            let position_gap = worst.saturating_sub(primary.position);

            conflicts.push(CannibalizationConflict {
                keyword: item.keyword.clone(),
                market: market.clone(),
                search_volume: item.search_volume,
                intent,
                primary,
                competitors,
                severity,
                guidance,
                wrong_page_winning,
                position_gap,
            });
        }
    }

    conflicts.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then(b.search_volume.cmp(&a.search_volume))
            .then_with(|| a.keyword.cmp(&b.keyword))
            .then_with(|| a.market.cmp(&b.market))
    });

    tracing::debug!(count = conflicts.len(), "tier-1 conflicts detected");
    conflicts
}

/// Tier 2: a single page ranks for a keyword its page type cannot serve.
///
/// Keywords already reported by tier 1 are passed in as `skip` so the same
/// problem is not double-reported. Only positions 1–20 with volume ≥ 10 are
/// considered, deduplicated by (keyword, URL).
pub fn detect_wrong_page_rankings(
    markets: &BTreeMap<String, MarketData>,
    domain: &str,
    tracked_locations: &[String],
    skip: &HashSet<String>,
) -> Vec<WrongPageRanking> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut rankings = Vec::new();

    for (market, data) in markets {
        for item in &data.items {
            if skip.contains(&item.keyword) {
                continue;
            }
            if item.position == 0
                || item.position > WRONG_PAGE_MAX_POSITION
                || item.search_volume < WRONG_PAGE_MIN_VOLUME
            {
                continue;
            }
            if !seen.insert((item.keyword.clone(), item.url.clone())) {
                continue;
            }

            let page_type = classify_url_type(&item.url);
            let intent = classify_keyword_intent(&item.keyword, domain, tracked_locations);

            let Some(mismatch) = mismatch_for(page_type, intent, item.position) else {
                continue;
            };

            rankings.push(WrongPageRanking {
                keyword: item.keyword.clone(),
                market: market.clone(),
                url: item.url.clone(),
                page_type,
                intent,
                position: item.position,
                search_volume: item.search_volume,
                severity: mismatch.severity,
                reason: mismatch.reason.to_string(),
                ideal_page_type: mismatch.ideal,
            });
        }
    }

    rankings.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then(b.search_volume.cmp(&a.search_volume))
            .then_with(|| a.keyword.cmp(&b.keyword))
            .then_with(|| a.market.cmp(&b.market))
    });

    tracing::debug!(count = rankings.len(), "tier-2 wrong-page rankings detected");
    rankings
}

struct Mismatch {
    severity: Severity,
    reason: &'static str,
    ideal: UrlType,
}

/// The page-type/intent mismatch table.
fn mismatch_for(page_type: UrlType, intent: KeywordIntent, position: u32) -> Option<Mismatch> {
    use UrlType::*;

    if intent.is_commercial() {
        match page_type {
            Blog => {
                let severity = if position <= 10 {
                    Severity::High
                } else {
                    Severity::Medium
                };
                return Some(Mismatch {
                    severity,
                    reason: "A blog post is ranking for a buying-intent query. \
                             Blog readers rarely convert; a service page would \
                             capture this traffic.",
                    ideal: Service,
                });
            }
            About => {
                return Some(Mismatch {
                    severity: Severity::Medium,
                    reason: "Your about page is ranking for a buying-intent \
                             query instead of a page that sells the service.",
                    ideal: Service,
                });
            }
            Faq => {
                return Some(Mismatch {
                    severity: Severity::Medium,
                    reason: "An FAQ page is ranking for a buying-intent query. \
                             FAQ visitors get answers, not a path to purchase.",
                    ideal: Service,
                });
            }
            Gallery => {
                return Some(Mismatch {
                    severity: Severity::Medium,
                    reason: "A gallery page is ranking for a buying-intent \
                             query without the copy needed to convert it.",
                    ideal: Service,
                });
            }
            _ => {}
        }
    }

    if intent == KeywordIntent::LocalCommercial
        && page_type == Homepage
        && position > HOMEPAGE_LOCAL_POSITION_CUTOFF
    {
        return Some(Mismatch {
            severity: Severity::Medium,
            reason: "Your homepage ranks outside the top 5 for a local query. \
                     A dedicated location page would likely outperform it.",
            ideal: Location,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serpclash_model::{KeywordRankingItem, SerpMatch};

    fn market_of(items: Vec<KeywordRankingItem>) -> BTreeMap<String, MarketData> {
        let mut markets = BTreeMap::new();
        markets.insert(
            "Dallas,Texas,United States".to_string(),
            MarketData::new("Dallas,Texas,United States", items),
        );
        markets
    }

    fn cannibalized_item(
        keyword: &str,
        volume: u64,
        matches: Vec<(&str, u32)>,
    ) -> KeywordRankingItem {
        let best = matches.iter().map(|(_, p)| *p).min().unwrap_or(1);
        let url = matches
            .iter()
            .min_by_key(|(_, p)| *p)
            .map(|(u, _)| (*u).to_string())
            .unwrap_or_default();
        KeywordRankingItem::new(keyword, volume, best, url).with_serp_matches(
            matches
                .into_iter()
                .map(|(url, position)| SerpMatch {
                    url: url.to_string(),
                    position,
                    etv: 0.0,
                })
                .collect(),
        )
    }

    #[test]
    fn test_tier1_homepage_beating_service() {
        let markets = market_of(vec![cannibalized_item(
            "water heater replacement cost",
            150,
            vec![("https://acme.com/", 3), ("https://acme.com/water-heaters", 7)],
        )]);

        let conflicts = detect_cannibalization_conflicts(&markets, "acme.com", &[]);
        assert_eq!(conflicts.len(), 1);

        let c = &conflicts[0];
        assert_eq!(c.primary.page_type, UrlType::Homepage);
        assert_eq!(c.competitors.len(), 1);
        assert_eq!(c.competitors[0].page_type, UrlType::Service);
        assert!(c.wrong_page_winning);
        // wrong page + position ≤ 5 escalates to critical
        assert_eq!(c.severity, Severity::Critical);
        assert_eq!(c.position_gap, 4);
    }

    #[test]
    fn test_tier1_skips_non_cannibalized() {
        let single = KeywordRankingItem::new("plumber", 100, 3, "https://acme.com/")
            .with_serp_matches(vec![SerpMatch {
                url: "https://acme.com/".to_string(),
                position: 3,
                etv: 0.0,
            }]);
        let markets = market_of(vec![single]);
        assert!(detect_cannibalization_conflicts(&markets, "acme.com", &[]).is_empty());
    }

    #[test]
    fn test_tier1_sort_severity_then_volume() {
        let markets = market_of(vec![
            cannibalized_item(
                "drain cleaning",
                50,
                vec![
                    ("https://acme.com/services/drains", 12),
                    ("https://acme.com/blog/drain-tips", 18),
                ],
            ),
            cannibalized_item(
                "emergency plumber",
                600,
                vec![
                    ("https://acme.com/emergency-plumbing", 2),
                    ("https://acme.com/", 9),
                ],
            ),
        ]);

        let conflicts = detect_cannibalization_conflicts(&markets, "acme.com", &[]);
        assert_eq!(conflicts.len(), 2);
        // volume 600 is critical and sorts first
        assert_eq!(conflicts[0].keyword, "emergency plumber");
        assert_eq!(conflicts[0].severity, Severity::Critical);
    }

    #[test]
    fn test_tier1_deterministic() {
        let markets = market_of(vec![
            cannibalized_item(
                "emergency plumber",
                300,
                vec![("https://acme.com/", 2), ("https://acme.com/emergency", 6)],
            ),
            cannibalized_item(
                "water heater repair",
                300,
                vec![
                    ("https://acme.com/water-heaters", 4),
                    ("https://acme.com/blog/heater-faq", 11),
                ],
            ),
        ]);

        let a = detect_cannibalization_conflicts(&markets, "acme.com", &[]);
        let b = detect_cannibalization_conflicts(&markets, "acme.com", &[]);
        let ja = serde_json::to_string(&a).unwrap();
        let jb = serde_json::to_string(&b).unwrap();
        assert_eq!(ja, jb);
    }

    #[test]
    fn test_tier2_blog_on_commercial_query() {
        let markets = market_of(vec![KeywordRankingItem::new(
            "water heater replacement cost",
            50,
            4,
            "https://acme.com/blog/heater-guide",
        )]);

        let rankings =
            detect_wrong_page_rankings(&markets, "acme.com", &[], &HashSet::new());
        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0].page_type, UrlType::Blog);
        assert_eq!(rankings[0].severity, Severity::High); // position ≤ 10
        assert_eq!(rankings[0].ideal_page_type, UrlType::Service);
    }

    #[test]
    fn test_tier2_respects_skip_set() {
        let markets = market_of(vec![KeywordRankingItem::new(
            "water heater replacement cost",
            50,
            4,
            "https://acme.com/blog/heater-guide",
        )]);

        let skip: HashSet<String> =
            std::iter::once("water heater replacement cost".to_string()).collect();
        assert!(detect_wrong_page_rankings(&markets, "acme.com", &[], &skip).is_empty());
    }

    #[test]
    fn test_tier2_volume_and_position_gates() {
        let markets = market_of(vec![
            // below volume cutoff
            KeywordRankingItem::new("cheap drain snake", 5, 4, "https://acme.com/blog/snakes"),
            // below position cutoff
            KeywordRankingItem::new(
                "drain cleaning price",
                50,
                25,
                "https://acme.com/blog/drains",
            ),
        ]);
        assert!(
            detect_wrong_page_rankings(&markets, "acme.com", &[], &HashSet::new()).is_empty()
        );
    }

    #[test]
    fn test_tier2_homepage_local_cutoff() {
        let tracked = vec!["Dallas,Texas,United States".to_string()];
        let markets = market_of(vec![
            KeywordRankingItem::new("plumber dallas", 90, 8, "https://acme.com/"),
            // position 5 is inside the cutoff, no finding
            KeywordRankingItem::new("drain cleaning dallas", 90, 5, "https://acme.com/"),
        ]);

        let rankings =
            detect_wrong_page_rankings(&markets, "acme.com", &tracked, &HashSet::new());
        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0].keyword, "plumber dallas");
        assert_eq!(rankings[0].ideal_page_type, UrlType::Location);
        assert_eq!(rankings[0].severity, Severity::Medium);
    }

    #[test]
    fn test_tier2_dedup_keyword_url() {
        let item = KeywordRankingItem::new(
            "water heater replacement cost",
            50,
            4,
            "https://acme.com/blog/heater-guide",
        );
        let mut markets = market_of(vec![item.clone()]);
        markets.insert(
            "Plano,Texas,United States".to_string(),
            MarketData::new("Plano,Texas,United States", vec![item]),
        );

        let rankings =
            detect_wrong_page_rankings(&markets, "acme.com", &[], &HashSet::new());
        assert_eq!(rankings.len(), 1);
    }
}
