//! US state and Canadian province tables.
//!
//! Shared by the URL classifier (trailing state-code detection) and market
//! discovery (abbreviation → canonical name normalization). Built once at
//! first use, never mutated.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// 50 US states + DC.
const US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
];

/// 13 Canadian provinces and territories.
const CA_PROVINCES: &[(&str, &str)] = &[
    ("AB", "Alberta"),
    ("BC", "British Columbia"),
    ("MB", "Manitoba"),
    ("NB", "New Brunswick"),
    ("NL", "Newfoundland and Labrador"),
    ("NS", "Nova Scotia"),
    ("NT", "Northwest Territories"),
    ("NU", "Nunavut"),
    ("ON", "Ontario"),
    ("PE", "Prince Edward Island"),
    ("QC", "Quebec"),
    ("SK", "Saskatchewan"),
    ("YT", "Yukon"),
];

static CODE_TO_NAME: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    US_STATES.iter().chain(CA_PROVINCES).copied().collect()
});

static NAME_TO_CODE: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    US_STATES
        .iter()
        .chain(CA_PROVINCES)
        .map(|(code, name)| (name.to_lowercase(), *code))
        .collect()
});

static CA_CODES: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| CA_PROVINCES.iter().map(|(code, _)| *code).collect());

/// True when `token` is a known 2-letter state or province code.
pub fn is_state_code(token: &str) -> bool {
    token.len() == 2 && CODE_TO_NAME.contains_key(token.to_uppercase().as_str())
}

/// Canonical full name for a 2-letter code, case-insensitive.
pub fn state_name(code: &str) -> Option<&'static str> {
    CODE_TO_NAME.get(code.to_uppercase().as_str()).copied()
}

/// 2-letter code for a full state name. Hyphens are treated as spaces so
/// URL segments like `new-york` resolve.
pub fn state_code(name: &str) -> Option<&'static str> {
    let key = name.to_lowercase().replace('-', " ");
    NAME_TO_CODE.get(key.trim()).copied()
}

/// Normalize a code or full name to the canonical full name.
pub fn canonical_state(input: &str) -> Option<&'static str> {
    state_name(input).or_else(|| state_code(input).and_then(state_name))
}

/// Country for a state/province code or full name.
pub fn country_for(input: &str) -> Option<&'static str> {
    let code = if is_state_code(input) {
        state_name(input).and_then(state_code)
    } else {
        state_code(input)
    }?;
    if CA_CODES.contains(code) {
        Some("Canada")
    } else {
        Some("United States")
    }
}
