//! # Preference Normalizer Module
//!
//! ## Purpose
//! Validates and coerces raw extracted fields into canonical typed
//! preferences. The extractor encodes "field not mentioned" as the literal
//! string `"null"`; that sentinel is translated into typed `None` here and
//! never propagates further.
//!
//! ## Input/Output Specification
//! - **Input**: `RawExtraction` (untrusted field map from the extractor)
//! - **Output**: `TripPreferences` with canonical types
//! - **Totality**: Malformed fields become unknown rather than failing the
//!   batch, with one exception: a present but unparseable date aborts the
//!   whole turn with `InvalidDateFormat`
//!
//! ## Field Rules
//! - price: native numbers or digit-only strings; negative values unknown
//! - dates: strict `DD/MM/YY`; `""`, `"not specified"`, `"unknown"` are
//!   sentinels for unknown
//! - baggage: native bool or `"True"`/`"False"`; explicit false forces the
//!   baggage count to 0
//! - tags: string array, `"null"` entries dropped, remainder trimmed
//! - locations: string passthrough with sentinel translation; destination
//!   countries are canonicalized from Polish names to catalog form

use crate::errors::{Result, TripSearchError};
use crate::extraction::RawExtraction;
use crate::TripPreferences;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashSet;

/// Date format of the extractor contract (e.g. "15/06/25" = 2025-06-15)
const DATE_FORMAT: &str = "%d/%m/%y";

/// Polish destination names mapped to the form used by the catalog
const KNOWN_DESTINATIONS: &[(&str, &str)] = &[
    ("hiszpania", "Spain"),
    ("francja", "France"),
    ("niemcy", "Germany"),
    ("włochy", "Italy"),
];

/// Normalize a raw extraction into a canonical preference set.
///
/// Total for every field except dates: a date that is present and not a
/// sentinel but fails to parse aborts the turn.
pub fn normalize(raw: &RawExtraction) -> Result<TripPreferences> {
    let baggage = normalize_bool(raw.get("baggage"));

    // An explicit baggage decline overrides whatever count the extractor
    // reported; the two fields are frequently inconsistent.
    let baggage_count = if baggage == Some(false) {
        Some(0)
    } else {
        normalize_count(raw.get("number_of_baggage"))
    };

    let (available_from, available_to) = normalize_available_time(raw.get("available_time"))?;

    Ok(TripPreferences {
        destination_country: normalize_string(raw.get("destination_country"))
            .map(canonicalize_country),
        destination_city: normalize_string(raw.get("destination_city")),
        departure_city: normalize_string(raw.get("departure_city")),
        price: normalize_price(raw.get("price")),
        baggage,
        baggage_count,
        tags: normalize_tags(raw.get("tags")),
        available_from,
        available_to,
    })
}

/// True for the `"null"` sentinel (any case)
fn is_null_sentinel(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("null")
}

/// String passthrough with sentinel translation; empty strings are unknown
fn normalize_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || is_null_sentinel(trimmed) {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

/// Map Polish destination names onto catalog form; unmapped names pass through
fn canonicalize_country(country: String) -> String {
    let lowered = country.to_lowercase();
    for (polish, canonical) in KNOWN_DESTINATIONS {
        if lowered == *polish {
            return (*canonical).to_string();
        }
    }
    country
}

/// Price coercion: native numbers, or strings of only digits after trimming.
/// Negative values are treated as unknown.
fn normalize_price(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64().filter(|p| *p >= 0.0),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
                trimmed.parse::<f64>().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Boolean coercion from native booleans or "True"/"False" strings
fn normalize_bool(value: Option<&Value>) -> Option<bool> {
    match value {
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Some(true)
            } else if trimmed.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Non-negative integer coercion for the baggage count
fn normalize_count(value: Option<&Value>) -> Option<u32> {
    match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|c| u32::try_from(c).ok()),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
                trimmed.parse::<u32>().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Tag cleanup: `"null"` entries are dropped, the rest trimmed and kept as a set
fn normalize_tags(value: Option<&Value>) -> HashSet<String> {
    let mut tags = HashSet::new();

    if let Some(Value::Array(entries)) = value {
        for entry in entries {
            if let Value::String(s) = entry {
                let trimmed = s.trim();
                if !trimmed.is_empty() && !is_null_sentinel(trimmed) {
                    tags.insert(trimmed.to_string());
                }
            }
        }
    }

    tags
}

/// Parse the nested `available_time{from,to}` object
fn normalize_available_time(
    value: Option<&Value>,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
    match value {
        Some(Value::Object(time)) => {
            let from = normalize_date(time.get("from"), "available_from")?;
            let to = normalize_date(time.get("to"), "available_to")?;
            Ok((from, to))
        }
        _ => Ok((None, None)),
    }
}

/// Strict date parsing against `DD/MM/YY`.
///
/// Sentinel strings and non-string values are unknown; any other string that
/// does not parse is a hard error for the turn.
fn normalize_date(value: Option<&Value>, field: &str) -> Result<Option<NaiveDate>> {
    let s = match value {
        Some(Value::String(s)) => s.trim(),
        _ => return Ok(None),
    };

    if s.is_empty() || is_date_sentinel(s) {
        return Ok(None);
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map(Some)
        .map_err(|_| TripSearchError::InvalidDateFormat {
            field: field.to_string(),
            value: s.to_string(),
        })
}

/// Sentinels the extractor uses for "no date given"
fn is_date_sentinel(s: &str) -> bool {
    is_null_sentinel(s)
        || s.eq_ignore_ascii_case("not specified")
        || s.eq_ignore_ascii_case("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawExtraction {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_null_sentinel_yields_unknown_everywhere() {
        let extraction = raw(json!({
            "destination_country": "NULL",
            "destination_city": "null",
            "departure_city": "Null",
            "price": "null",
            "baggage": "null",
            "number_of_baggage": "null",
            "tags": ["null"],
            "available_time": {"from": "null", "to": "null"}
        }));
        let prefs = normalize(&extraction).unwrap();
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_price_digit_string_parses() {
        let prefs = normalize(&raw(json!({"price": " 2000 "}))).unwrap();
        assert_eq!(prefs.price, Some(2000.0));
    }

    #[test]
    fn test_price_native_number_accepted() {
        let prefs = normalize(&raw(json!({"price": 1499.5}))).unwrap();
        assert_eq!(prefs.price, Some(1499.5));
    }

    #[test]
    fn test_price_rejects_text_and_negatives() {
        assert_eq!(normalize(&raw(json!({"price": "tanio"}))).unwrap().price, None);
        assert_eq!(normalize(&raw(json!({"price": "3000 zł"}))).unwrap().price, None);
        assert_eq!(normalize(&raw(json!({"price": -100}))).unwrap().price, None);
    }

    #[test]
    fn test_date_parses_day_month_two_digit_year() {
        let prefs =
            normalize(&raw(json!({"available_time": {"from": "15/06/25", "to": "null"}}))).unwrap();
        assert_eq!(
            prefs.available_from,
            Some(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
        );
        assert_eq!(prefs.available_to, None);
    }

    #[test]
    fn test_date_sentinels_are_unknown() {
        for sentinel in ["", "not specified", "UNKNOWN", "null"] {
            let prefs =
                normalize(&raw(json!({"available_time": {"from": sentinel, "to": "null"}})))
                    .unwrap();
            assert_eq!(prefs.available_from, None, "sentinel: {:?}", sentinel);
        }
    }

    #[test]
    fn test_impossible_date_is_hard_error() {
        let err = normalize(&raw(json!({"available_time": {"from": "32/13/25", "to": "null"}})))
            .unwrap_err();
        assert!(matches!(err, TripSearchError::InvalidDateFormat { .. }));
    }

    #[test]
    fn test_baggage_false_forces_count_to_zero() {
        let prefs =
            normalize(&raw(json!({"baggage": "False", "number_of_baggage": 3}))).unwrap();
        assert_eq!(prefs.baggage, Some(false));
        assert_eq!(prefs.baggage_count, Some(0));
    }

    #[test]
    fn test_baggage_true_keeps_reported_count() {
        let prefs =
            normalize(&raw(json!({"baggage": true, "number_of_baggage": "2"}))).unwrap();
        assert_eq!(prefs.baggage, Some(true));
        assert_eq!(prefs.baggage_count, Some(2));
    }

    #[test]
    fn test_tags_drop_nulls_and_trim() {
        let prefs =
            normalize(&raw(json!({"tags": [" mountains ", "null", "", "beach"]}))).unwrap();
        let expected: HashSet<String> =
            ["mountains", "beach"].iter().map(|s| s.to_string()).collect();
        assert_eq!(prefs.tags, expected);
    }

    #[test]
    fn test_known_destination_canonicalized() {
        let prefs = normalize(&raw(json!({"destination_country": "Hiszpania"}))).unwrap();
        assert_eq!(prefs.destination_country.as_deref(), Some("Spain"));

        // Names outside the map pass through unchanged.
        let prefs = normalize(&raw(json!({"destination_country": "Portugal"}))).unwrap();
        assert_eq!(prefs.destination_country.as_deref(), Some("Portugal"));
    }

    #[test]
    fn test_wrong_types_become_unknown() {
        let extraction = raw(json!({
            "destination_country": 42,
            "price": [2000],
            "baggage": "maybe",
            "tags": "mountains",
            "available_time": "10/05/25"
        }));
        let prefs = normalize(&extraction).unwrap();
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_missing_keys_are_unknown() {
        let prefs = normalize(&raw(json!({}))).unwrap();
        assert!(prefs.is_empty());
    }
}
