//! URL and keyword-intent classification.
//!
//! Pure, deterministic heuristics shared by every detection tier:
//! - `classify_url_type`: URL path → page-type category
//! - `classify_keyword_intent`: keyword + domain + tracked cities → intent
//! - `geo`: US/Canada state and province tables
//!
//! No I/O, no caching, no shared state. Classification is recomputed on
//! every call; memoization is left to callers that need it.

pub mod geo;
mod intent;
mod url;

pub use intent::classify_keyword_intent;
pub use url::classify_url_type;
