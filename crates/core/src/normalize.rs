//! Field-name and free-text value canonicalization.
//!
//! Handlers that accept free text (business search, profile forms) run user input through
//! these functions before building store filters, so that "new york", "NY" and "New York"
//! all reach the store as `NYC`.

use std::collections::BTreeMap;

/// Default minimum similarity (0..=100) for a variant to count as a match.
pub const DEFAULT_THRESHOLD: f64 = 80.0;

/// Alternate field names and the canonical field they stand for. Lookups are lower-case.
const KEY_ALIASES: &[(&str, &str)] = &[
    ("email", "email"),
    ("registered_email", "email"),
    ("user_name", "name"),
    ("username", "name"),
    ("company", "companyName"),
    ("company_name", "companyName"),
    ("industry", "industrySector"),
    ("industry_sector", "industrySector"),
    ("subsector", "subSector"),
    ("sub_sector", "subSector"),
    ("city", "location"),
    ("confirmation", "confirmation_number"),
    ("flight", "flight_number"),
    ("seat", "seat_number"),
];

/// Fields whose values may be fuzzy-matched, across every table the store exposes.
const FUZZY_FIELDS: &[&str] = &[
    "name",
    "email",
    "user_name",
    "registered_email",
    "confirmation_number",
    "seat_number",
    "flight_number",
    "origin",
    "destination",
    "companyName",
    "industrySector",
    "subSector",
    "location",
];

/// Free-text variants per canonical field, in match order.
const VALUE_ALIASES: &[(&str, &[(&str, &str)])] = &[
    (
        "location",
        &[
            ("new york", "NYC"),
            ("ny", "NYC"),
            ("los angeles", "LAX"),
            ("la", "LAX"),
            ("san francisco", "SFO"),
            ("sf", "SFO"),
        ],
    ),
    (
        "industrySector",
        &[
            ("fin tech", "Fintech"),
            ("finance", "Fintech"),
            ("technology", "Tech"),
            ("tech", "Tech"),
            ("aviation", "Aviation"),
            ("aerospace", "Aviation"),
        ],
    ),
];

pub fn canonical_key(raw_key: &str) -> String {
    let lowered = raw_key.to_lowercase();
    KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| raw_key.to_string())
}

pub fn canonical_value(field: &str, raw_value: &str) -> String {
    canonical_value_with_threshold(field, raw_value, DEFAULT_THRESHOLD)
}

/// Returns the canonical form of `raw_value` for `field`.
///
/// Variants are tried in table order and the first one scoring at or above `threshold`
/// wins, even if a later variant would score higher.
pub fn canonical_value_with_threshold(field: &str, raw_value: &str, threshold: f64) -> String {
    let field = canonical_key(field);
    if !FUZZY_FIELDS.contains(&field.as_str()) {
        return raw_value.to_string();
    }

    let Some((_, variants)) = VALUE_ALIASES.iter().find(|(name, _)| *name == field) else {
        return raw_value.to_string();
    };

    variants
        .iter()
        .find(|(variant, _)| similarity(raw_value, variant) >= threshold)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| raw_value.to_string())
}

/// Canonicalizes both keys and values of a free-text filter map.
pub fn normalize_filters(filters: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    filters
        .iter()
        .map(|(key, value)| {
            let key = canonical_key(key.trim());
            let value = canonical_value(&key, value.trim());
            (key, value)
        })
        .collect()
}

/// Case-insensitive similarity on a 0..=100 scale; 100 means identical.
pub fn similarity(left: &str, right: &str) -> f64 {
    strsim::normalized_levenshtein(&left.to_lowercase(), &right.to_lowercase()) * 100.0
}
