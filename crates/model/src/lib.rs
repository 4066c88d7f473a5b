//! Core domain model for SERP cannibalization analysis.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `KeywordRankingItem` / `MarketData`: per-market ranked-keyword input
//! - `CrawledPage`: on-page crawl input
//! - `UrlType` / `KeywordIntent`: derived classifications
//! - The four tier outputs plus the page-centric `RankingPage` view
//!
//! Everything here is a plain serializable record. Inputs are produced by
//! the upstream rank-tracking and crawl collectors and consumed read-only;
//! outputs are newly allocated by the detectors and suitable for JSON
//! transport to a dashboard or storage layer.

use serde::{Deserialize, Serialize};

/// Page-type category derived from a URL path.
///
/// Recomputed from the URL each time it is classified; never stored with
/// the input data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrlType {
    Homepage,
    Service,
    Location,
    Blog,
    About,
    Contact,
    Gallery,
    Testimonials,
    Faq,
    Other,
}

impl UrlType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Homepage => "homepage",
            Self::Service => "service",
            Self::Location => "location",
            Self::Blog => "blog",
            Self::About => "about",
            Self::Contact => "contact",
            Self::Gallery => "gallery",
            Self::Testimonials => "testimonials",
            Self::Faq => "faq",
            Self::Other => "other",
        }
    }

    /// Utility pages (contact, about, gallery, testimonials, faq) are
    /// excluded from keyword-overlap profiling.
    pub fn is_utility(&self) -> bool {
        matches!(
            self,
            Self::Contact | Self::About | Self::Gallery | Self::Testimonials | Self::Faq
        )
    }

    /// Page types eligible for content-overlap grouping.
    pub fn is_content_eligible(&self) -> bool {
        matches!(
            self,
            Self::Service | Self::Location | Self::Blog | Self::Homepage
        )
    }
}

impl std::fmt::Display for UrlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presumed purpose behind a search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeywordIntent {
    /// Commercial query with a geographic qualifier ("near me", city name)
    LocalCommercial,
    /// Transactional or commercial-investigation query
    Commercial,
    /// Research query (how-to, guides, comparisons)
    Informational,
    /// Contains the site's own brand token
    Branded,
    /// Looking for a specific known destination. The heuristic classifier
    /// never emits this; it exists for provider data that tags it.
    Navigational,
}

impl KeywordIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalCommercial => "local-commercial",
            Self::Commercial => "commercial",
            Self::Informational => "informational",
            Self::Branded => "branded",
            Self::Navigational => "navigational",
        }
    }

    /// True for intents where the searcher is ready to buy or hire.
    pub fn is_commercial(&self) -> bool {
        matches!(self, Self::Commercial | Self::LocalCommercial)
    }
}

impl std::fmt::Display for KeywordIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conflict severity. Variant order matters: the derived `Ord` puts
/// `Critical` first so an ascending sort yields critical → high → medium.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk rating for overlap findings (tiers 3 and 4). Ordered like
/// `Severity`: ascending sort puts `High` first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OverlapRisk {
    High,
    Medium,
}

impl OverlapRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

impl std::fmt::Display for OverlapRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One same-domain SERP entry for a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpMatch {
    pub url: String,
    pub position: u32,
    /// Estimated traffic value for this position
    #[serde(default)]
    pub etv: f64,
}

/// One keyword's ranking data within a single market.
///
/// Immutable once produced by the upstream collection step; the detectors
/// consume it read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRankingItem {
    pub keyword: String,

    /// Monthly search volume
    #[serde(default)]
    pub search_volume: u64,

    /// Cost per click, USD
    #[serde(default)]
    pub cpc: f64,

    /// Best rank position for the domain
    pub position: u32,

    /// URL ranking at `position`
    pub url: String,

    /// Estimated traffic value for the best position
    #[serde(default)]
    pub etv: f64,

    /// Every same-domain SERP entry for this query, including the best one.
    /// Two or more entries means the domain is cannibalizing itself.
    #[serde(default)]
    pub serp_matches: Vec<SerpMatch>,

    /// Set by ingestion when `serp_matches` holds ≥2 domain URLs
    #[serde(default)]
    pub is_cannibalized: bool,

    /// Google Maps pack position, when tracked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps_position: Option<u32>,
}

impl KeywordRankingItem {
    /// Create a minimal item for testing.
    pub fn new(
        keyword: impl Into<String>,
        search_volume: u64,
        position: u32,
        url: impl Into<String>,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            search_volume,
            cpc: 0.0,
            position,
            url: url.into(),
            etv: 0.0,
            serp_matches: Vec::new(),
            is_cannibalized: false,
            maps_position: None,
        }
    }

    pub fn with_serp_matches(mut self, matches: Vec<SerpMatch>) -> Self {
        self.is_cannibalized = matches.len() >= 2;
        self.serp_matches = matches;
        self
    }
}

/// Aggregate rank-bucket counts for a market.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MarketMetrics {
    #[serde(default)]
    pub top3: u32,
    #[serde(default)]
    pub top10: u32,
    #[serde(default)]
    pub top100: u32,
    #[serde(default)]
    pub new_keywords: u32,
    #[serde(default)]
    pub lost_keywords: u32,
}

/// All ranked-keyword data for one tracked market.
///
/// `location` is the `"City,State,Country"` string used as the market key
/// throughout the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketData {
    pub location: String,
    pub items: Vec<KeywordRankingItem>,
    #[serde(default)]
    pub metrics: MarketMetrics,
}

impl MarketData {
    pub fn new(location: impl Into<String>, items: Vec<KeywordRankingItem>) -> Self {
        Self {
            location: location.into(),
            items,
            metrics: MarketMetrics::default(),
        }
    }
}

/// One crawled URL with its on-page signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawledPage {
    pub url: String,

    #[serde(default = "default_status")]
    pub status_code: u16,

    #[serde(default)]
    pub title: String,

    /// All H1 headings found on the page, in document order
    #[serde(default)]
    pub h1: Vec<String>,

    #[serde(default)]
    pub meta_description: String,

    #[serde(default)]
    pub word_count: u32,
}

fn default_status() -> u16 {
    200
}

impl CrawledPage {
    /// Create a minimal page for testing.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status_code: 200,
            title: String::new(),
            h1: Vec::new(),
            meta_description: String::new(),
            word_count: 0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_h1(mut self, h1: impl Into<String>) -> Self {
        self.h1.push(h1.into());
        self
    }
}

/// Detected business record, used as a fallback when a location page's URL
/// carries a city but no state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Static remediation guidance for a conflict category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictGuidance {
    /// Short category label, e.g. "Homepage vs Service Page"
    pub label: String,
    pub icon: String,
    pub description: String,
    /// Recommended remediation
    pub fix: String,
}

/// One page participating in a tier-1 conflict, annotated with its
/// classified type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictPage {
    pub url: String,
    pub page_type: UrlType,
    pub position: u32,
    #[serde(default)]
    pub etv: f64,
}

/// Tier-1 output: a SERP-verified cannibalization conflict, meaning two or
/// more domain URLs ranking for the same query in the same market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CannibalizationConflict {
    pub keyword: String,
    pub market: String,
    pub search_volume: u64,
    pub intent: KeywordIntent,

    /// Best-ranked page for the query
    pub primary: ConflictPage,
    /// Remaining domain pages in the same SERP, by ascending position
    pub competitors: Vec<ConflictPage>,

    pub severity: Severity,
    pub guidance: ConflictGuidance,

    /// A low-intent-fit page type is outranking a better-fit one
    pub wrong_page_winning: bool,
    /// Worst competitor position minus primary position
    pub position_gap: u32,
}

/// Tier-2 output: a single page ranks for a keyword whose intent its page
/// type cannot satisfy. No competing URL required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrongPageRanking {
    pub keyword: String,
    pub market: String,
    pub url: String,
    pub page_type: UrlType,
    pub intent: KeywordIntent,
    pub position: u32,
    pub search_volume: u64,
    pub severity: Severity,
    /// Why this page type mismatches the intent
    pub reason: String,
    /// The page type that should rank instead
    pub ideal_page_type: UrlType,
}

/// Tier-3 output: two ranking pages whose keyword sets share a significant
/// fraction of word n-grams, without necessarily sharing a SERP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NgramOverlapConflict {
    pub page_a: String,
    pub page_a_type: UrlType,
    pub page_b: String,
    pub page_b_type: UrlType,
    /// N-grams present in both pages' keyword profiles
    pub shared_ngrams: Vec<String>,
    /// shared / min(|A|, |B|) × 100
    pub overlap_pct: f64,
    /// Summed search volume behind the shared n-grams
    pub shared_volume: u64,
    pub risk: OverlapRisk,
}

/// A page referenced by a content-overlap group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRef {
    pub url: String,
    pub page_type: UrlType,
}

/// Tier-4 output: a cluster of pages that target the same topic based on
/// on-page content alone. Used when SERP data is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentOverlapGroup {
    pub pages: Vec<PageRef>,
    /// Specific (non-boilerplate) title/H1 bigrams linking the group
    pub shared_phrases: Vec<String>,
    pub risk: OverlapRisk,
    pub guidance: ConflictGuidance,
}

/// Page-centric view: everything one URL ranks for across all markets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingPage {
    pub url: String,
    pub page_type: UrlType,
    pub keywords: Vec<String>,
    pub keyword_count: usize,
    pub total_volume: u64,
    pub total_etv: f64,
    /// Lowest (best) rank position seen in any market
    pub best_position: u32,
}

/// A market candidate extracted from crawled location pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredMarket {
    pub city: String,
    /// Canonical `"City,State,Country"` market key
    pub market: String,
}

/// Result of content-based city detection.
///
/// Returned only when the city is mentioned often enough to be trusted;
/// low-confidence detection yields `None`, not a zeroed record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedCity {
    /// Canonical `"City,State,Country"` market key
    pub location: String,
    pub city: String,
    /// Number of distinct mentions found
    pub confidence: u32,
    /// Which page fields the mentions came from
    pub sources: Vec<String>,
}

/// Combined output of a full four-tier audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    pub conflicts: Vec<CannibalizationConflict>,
    pub wrong_page_rankings: Vec<WrongPageRanking>,
    pub ngram_overlaps: Vec<NgramOverlapConflict>,
    pub content_overlaps: Vec<ContentOverlapGroup>,
    pub ranking_pages: Vec<RankingPage>,
}
