//! US-style phone number cleanup.
//!
//! Digits are ASCII `0-9` only; anything else counts as connector text.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

/// Country code, area code, prefix and line number with free connector text in
/// between. Used as a search, so the number may sit inside a longer string.
static PHONE_DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<country>[0-9]{1,2})?[^0-9]*\(?(?P<area>[0-9]{3})\)?[^0-9]*(?P<prefix>[0-9]{3})[^0-9]*(?P<line>[0-9]{4})",
    )
    .expect("Invalid phone number regex")
});

/// Same grouping, but capturing the connector text around each digit block.
static PHONE_CONNECTORS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?[0-9]?[0-9]?([^0-9]*)[0-9]{3}([^0-9]*)[0-9]{3}([^0-9]*)[0-9]{4}")
        .expect("Invalid phone connector regex")
});

/// Rewrites a phone number as `(AAA) PPP - LLLL`.
///
/// Country code and separators are dropped. A value without a recognizable
/// 3-3-4 digit grouping is returned unchanged.
pub fn update_phone_number(phone_number: &str) -> String {
    match PHONE_DIGITS_RE.captures(phone_number) {
        Some(caps) => format!("({}) {} - {}", &caps["area"], &caps["prefix"], &caps["line"]),
        None => phone_number.to_string(),
    }
}

/// Connector pattern of a phone number, e.g. `"[() -]"` for `(832) 588-8683`.
pub fn phone_format(phone_number: &str) -> Option<String> {
    let caps = PHONE_CONNECTORS_RE.captures(phone_number)?;
    let connectors: String = caps.iter()
        .skip(1)
        .flatten()
        .map(|m| m.as_str())
        .collect();
    Some(format!("[{}]", connectors))
}

/// Files `phone_number` under its connector pattern. Numbers without a 3-3-4
/// grouping are ignored.
pub fn audit_phone_format(phone_formats: &mut BTreeMap<String, BTreeSet<String>>, phone_number: &str) {
    if let Some(format) = phone_format(phone_number) {
        phone_formats.entry(format)
            .or_default()
            .insert(phone_number.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashed_number() {
        assert_eq!(update_phone_number("512-555-1234"), "(512) 555 - 1234");
    }

    #[test]
    fn test_country_code_is_dropped() {
        assert_eq!(update_phone_number("+1 (512) 555-1234"), "(512) 555 - 1234");
        assert_eq!(update_phone_number("1-512-555-1234"), "(512) 555 - 1234");
        assert_eq!(update_phone_number("15125551234"), "(512) 555 - 1234");
    }

    #[test]
    fn test_bare_digits() {
        assert_eq!(update_phone_number("5125551234"), "(512) 555 - 1234");
    }

    #[test]
    fn test_dotted_and_spaced() {
        assert_eq!(update_phone_number("512.555.1234"), "(512) 555 - 1234");
        assert_eq!(update_phone_number("(512) 555 1234"), "(512) 555 - 1234");
    }

    #[test]
    fn test_number_inside_text() {
        assert_eq!(update_phone_number("call 512-555-1234 today"), "(512) 555 - 1234");
    }

    #[test]
    fn test_unrecognized_value_passes_through() {
        assert_eq!(update_phone_number("555-1234"), "555-1234");
        assert_eq!(update_phone_number("+44 20 7946 0"), "+44 20 7946 0");
        assert_eq!(update_phone_number(""), "");
    }

    #[test]
    fn test_already_normalized_is_stable() {
        let once = update_phone_number("512 555 1234");
        assert_eq!(update_phone_number(&once), once);
    }

    #[test]
    fn test_phone_format_connectors() {
        assert_eq!(phone_format("(832) 588-8683").as_deref(), Some("[() -]"));
        assert_eq!(phone_format("+1-512-555-1234").as_deref(), Some("[---]"));
        assert_eq!(phone_format("5125551234").as_deref(), Some("[]"));
        assert_eq!(phone_format("no number"), None);
    }

    #[test]
    fn test_audit_phone_format_groups_numbers() {
        let mut formats = BTreeMap::new();
        audit_phone_format(&mut formats, "512-555-1234");
        audit_phone_format(&mut formats, "737-555-9876");
        audit_phone_format(&mut formats, "512.555.1234");
        audit_phone_format(&mut formats, "n/a");

        assert_eq!(formats.len(), 2);
        assert_eq!(formats["[--]"].len(), 2);
        assert!(formats["[..]"].contains("512.555.1234"));
    }
}
