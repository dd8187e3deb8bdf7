//! Street suffix cleanup for `addr:street` values.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

/// Last "word" of a street address, trailing period included.
static STREET_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\S+\.?$").expect("Invalid street type regex"));

/// Full suffix words that need no correction.
pub const EXPECTED_STREET_TYPES: [&str; 12] = [
    "Street", "Avenue", "Boulevard", "Drive", "Court", "Place", "Square", "Lane", "Road",
    "Trail", "Parkway", "Commons",
];

/// Lower-cased abbreviation and its expansion. `rd` really does map to Avenue.
pub const STREET_ABBREVIATIONS: [(&str, &str); 9] = [
    ("st", "Street"),
    ("ave", "Avenue"),
    ("rd", "Avenue"),
    ("ln", "Lane"),
    ("ct", "Court"),
    ("cv", "Cove"),
    ("dr", "Drive"),
    ("pl", "Place"),
    ("trl", "Trail"),
];

fn expand_abbreviation(word: &str) -> Option<&'static str> {
    let word = word.strip_suffix('.').unwrap_or(word).to_lowercase();
    STREET_ABBREVIATIONS.iter()
        .find(|(abbreviation, _)| *abbreviation == word)
        .map(|(_, expansion)| *expansion)
}

/// Expands an abbreviated street suffix, e.g. `"Main St."` to `"Main Street"`.
///
/// The name is split on single spaces and scanned left to right. When several
/// tokens are abbreviations only the last one is expanded, so `"St Johns Ave"`
/// becomes `"St Johns Avenue"`. Names without an abbreviation come back as-is.
pub fn update_street_name(name: &str) -> String {
    let mut words: Vec<&str> = name.split(' ').collect();
    let last_match = words.iter()
        .enumerate()
        .filter_map(|(i, word)| expand_abbreviation(word).map(|expansion| (i, expansion)))
        .last();

    match last_match {
        Some((i, expansion)) => {
            words[i] = expansion;
            words.join(" ")
        },
        None => name.to_string(),
    }
}

/// Final token of a street name, e.g. `"St."` for `"Main St."`.
pub fn street_type(street_name: &str) -> Option<&str> {
    STREET_TYPE_RE.find(street_name).map(|m| m.as_str())
}

/// Files `street_name` under its final token unless that token is one of
/// [`EXPECTED_STREET_TYPES`].
pub fn audit_street_type(street_types: &mut BTreeMap<String, BTreeSet<String>>, street_name: &str) {
    if let Some(street_type) = street_type(street_name) {
        if !EXPECTED_STREET_TYPES.contains(&street_type) {
            street_types.entry(street_type.to_string())
                .or_default()
                .insert(street_name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expands_trailing_abbreviation() {
        assert_eq!(update_street_name("Main St."), "Main Street");
        assert_eq!(update_street_name("Main St"), "Main Street");
        assert_eq!(update_street_name("Congress ave"), "Congress Avenue");
        assert_eq!(update_street_name("Pecan Cv"), "Pecan Cove");
        assert_eq!(update_street_name("Old Bee Caves Rd"), "Old Bee Caves Avenue");
    }

    #[test]
    fn test_expands_token_in_the_middle() {
        assert_eq!(update_street_name("Lamar Blvd Ste 100"), "Lamar Blvd Ste 100");
        assert_eq!(update_street_name("Research Dr Suite 4"), "Research Drive Suite 4");
    }

    #[test]
    fn test_last_abbreviation_wins() {
        assert_eq!(update_street_name("St Johns Ave"), "St Johns Avenue");
        assert_eq!(update_street_name("Dr Martin Luther King Jr Ln"), "Dr Martin Luther King Jr Lane");
    }

    #[test]
    fn test_full_suffix_is_untouched() {
        for name in ["Main Street", "South Congress Avenue", "Burnet Road", "Loop 360"] {
            assert_eq!(update_street_name(name), name);
            assert_eq!(update_street_name(&update_street_name(name)), update_street_name(name));
        }
    }

    #[test]
    fn test_only_single_spaces_split() {
        assert_eq!(update_street_name("Main  St"), "Main  Street");
        assert_eq!(update_street_name("Main\tSt"), "Main\tSt");
    }

    #[test]
    fn test_street_type() {
        assert_eq!(street_type("Main St."), Some("St."));
        assert_eq!(street_type("North Lamar Boulevard"), Some("Boulevard"));
        assert_eq!(street_type("Main St "), None);
        assert_eq!(street_type(""), None);
    }

    #[test]
    fn test_audit_street_type_skips_expected() {
        let mut street_types = BTreeMap::new();
        audit_street_type(&mut street_types, "Main Street");
        audit_street_type(&mut street_types, "Main St.");
        audit_street_type(&mut street_types, "Elm St.");
        audit_street_type(&mut street_types, "Pecan Cv");

        assert_eq!(street_types.len(), 2);
        assert_eq!(street_types["St."].len(), 2);
        assert!(street_types["Cv"].contains("Pecan Cv"));
    }
}
