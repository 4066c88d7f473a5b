//! Conflict categorization and severity rules.
//!
//! Converts a pair of competing page types plus a keyword intent into a
//! human-readable conflict category with remediation guidance, suitable for
//! display in a dashboard. All text is static per category; nothing is
//! derived dynamically.

use serpclash_model::{ConflictGuidance, KeywordIntent, Severity, UrlType};

/// Volume at which any conflict is critical regardless of other signals.
const CRITICAL_VOLUME: u64 = 500;
/// Volume that escalates a wrong-page conflict to critical.
const WRONG_PAGE_CRITICAL_VOLUME: u64 = 200;

fn guidance(
    label: &str,
    icon: &str,
    description: &str,
    fix: &str,
) -> ConflictGuidance {
    ConflictGuidance {
        label: label.to_string(),
        icon: icon.to_string(),
        description: description.to_string(),
        fix: fix.to_string(),
    }
}

/// Categorize a conflict between two page types competing for one keyword.
///
/// The pair is unordered: homepage-vs-service and service-vs-homepage
/// return the same category.
pub fn classify_conflict_type(
    primary: UrlType,
    competitor: UrlType,
    intent: KeywordIntent,
) -> ConflictGuidance {
    use UrlType::*;

    let pair = ordered_pair(primary, competitor);
    match pair {
        (Homepage, Service) => guidance(
            "Homepage vs Service Page",
            "🏠",
            "Your homepage and a dedicated service page are competing for the \
             same query. Google cannot tell which one to rank, so both lose \
             authority.",
            "Consolidate the keyword targeting onto the service page and link \
             to it prominently from the homepage. Keep the homepage focused on \
             the brand and the full service range.",
        ),
        (Service, Blog) => guidance(
            "Blog Post vs Service Page",
            "📝",
            "A blog post is competing with the service page that should own \
             this query. Blog content rarely converts commercial searchers.",
            "Add a canonical link or prominent call-to-action from the post to \
             the service page, and shift the post toward informational angles \
             of the topic.",
        ),
        (Service, Location) => guidance(
            "Location Page vs Service Page",
            "📍",
            "A city landing page and a general service page are overlapping. \
             This usually means the service page also mentions the city, or \
             the location page duplicates the service copy.",
            "Differentiate them: keep the service page city-neutral and give \
             the location page locally unique content (team, projects, \
             service-area details).",
        ),
        (Location, Location) => guidance(
            "Location vs Location",
            "🗺️",
            "Two city landing pages are competing for the same query, which \
             usually means their content is near-duplicate with only the city \
             name swapped.",
            "Rewrite each location page around genuinely local signals — \
             local reviews, landmarks, staff — so each city query has exactly \
             one strong answer.",
        ),
        (Homepage, Location) => guidance(
            "Homepage vs Location Page",
            "🏠",
            "Your homepage is overlapping with a city landing page. For \
             local queries the location page is the better answer, but the \
             homepage's authority is splitting the signal.",
            "Point internal links for city-qualified queries at the location \
             page and tighten the homepage copy to the brand level.",
        ),
        (Blog, Blog) => guidance(
            "Blog vs Blog",
            "📚",
            "Two blog posts cover the same topic closely enough to compete \
             with each other.",
            "Merge them into one definitive post and 301-redirect the weaker \
             URL, or re-angle one post toward a clearly distinct subtopic.",
        ),
        (Homepage, Blog) => guidance(
            "Blog Post vs Homepage",
            "📝",
            "A blog post is competing with your homepage. If the query is \
             commercial this dilutes your strongest page.",
            "De-optimize the post for the head term (retitle, adjust \
             headings) and link it back to the homepage or the relevant \
             service page.",
        ),
        _ => guidance(
            "Keyword Overlap",
            "⚠️",
            &format!(
                "Two of your pages are competing for the same {intent} query, \
                 splitting clicks and authority between them."
            ),
            "Pick the page best suited to the searcher's intent, consolidate \
             the keyword targeting there, and differentiate or redirect the \
             other page.",
        ),
    }
}

/// Normalize an unordered page-type pair to a canonical order so both
/// orientations hit the same match arm.
fn ordered_pair(a: UrlType, b: UrlType) -> (UrlType, UrlType) {
    use UrlType::*;

    // Rank drives canonical ordering within a pair
    fn rank(t: UrlType) -> u8 {
        match t {
            Homepage => 0,
            Service => 1,
            Location => 2,
            Blog => 3,
            About => 4,
            Contact => 5,
            Gallery => 6,
            Testimonials => 7,
            Faq => 8,
            Other => 9,
        }
    }

    if rank(a) <= rank(b) {
        (a, b)
    } else {
        (b, a)
    }
}

/// True when a low-intent-fit page type is outranking a better-fit page
/// type for a commercial or local-commercial query.
pub fn is_wrong_page_winning(
    primary: UrlType,
    competitor: UrlType,
    intent: KeywordIntent,
) -> bool {
    use UrlType::*;

    if !intent.is_commercial() {
        return false;
    }

    match primary {
        Homepage => matches!(competitor, Service | Location),
        Blog => matches!(competitor, Service | Location | Homepage),
        _ => false,
    }
}

/// Severity of a tier-1 conflict.
///
/// Critical when the wrong page is winning with real volume or a top-5
/// position, or when volume alone is large; high for anything ranking in
/// the top 10 or with volume ≥ 100; medium otherwise.
pub fn compute_severity(volume: u64, position: u32, wrong_page_winning: bool) -> Severity {
    if (wrong_page_winning && (volume >= WRONG_PAGE_CRITICAL_VOLUME || position <= 5))
        || volume >= CRITICAL_VOLUME
        || (position <= 3 && wrong_page_winning)
    {
        Severity::Critical
    } else if volume >= 100 || position <= 10 {
        Severity::High
    } else {
        Severity::Medium
    }
}

/// Guidance for a tier-4 content-overlap group, selected by the mix of
/// page types in the group.
pub fn group_guidance(types: &[UrlType]) -> ConflictGuidance {
    use UrlType::*;

    let has = |t: UrlType| types.contains(&t);
    let all = |t: UrlType| !types.is_empty() && types.iter().all(|x| *x == t);

    if has(Blog) {
        guidance(
            "Blog Content Overlap",
            "📚",
            "Blog content shares its topic focus with other pages in this \
             group. New posts written against existing page titles compete \
             before they ever rank.",
            "Re-angle the blog content toward questions and research intent, \
             and let the commercial page own the head term.",
        )
    } else if all(Service) {
        guidance(
            "Duplicate Service Targeting",
            "🔧",
            "Multiple service pages target the same topic in their titles \
             and headings.",
            "Split the services into clearly distinct offerings or merge the \
             pages into one stronger service page.",
        )
    } else if all(Location) {
        guidance(
            "Duplicate Location Targeting",
            "🗺️",
            "Multiple location pages share the same title and heading focus, \
             which reads as doorway-page duplication.",
            "Give each location page unique local content, or prune cities \
             you do not genuinely serve.",
        )
    } else if has(Service) && has(Location) {
        guidance(
            "Service and Location Overlap",
            "📍",
            "Service and location pages in this group target the same topic \
             phrases.",
            "Keep service pages city-neutral and reserve city-qualified \
             phrases for the matching location page.",
        )
    } else {
        guidance(
            "Content Overlap",
            "⚠️",
            "These pages target the same topic phrases in their titles and \
             headings.",
            "Differentiate their on-page targeting so each page answers a \
             distinct query.",
        )
    }
}
