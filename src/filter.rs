//! # Trip Filter Engine Module
//!
//! ## Purpose
//! Evaluates the accumulated preference set against a catalog snapshot and
//! returns the matching subset. Pure and stateless: no I/O beyond reading the
//! snapshot passed in.
//!
//! ## Input/Output Specification
//! - **Input**: Catalog snapshot (`&[TripRecord]`), `TripPreferences`
//! - **Output**: Matching records in catalog order, no deduplication
//! - **Semantics**: Unknown preference fields are wildcards; a record matches
//!   only if every set constraint holds
//!
//! ## Match Conditions
//! - location fields: exact case-sensitive equality
//! - price: `record.price <= prefs.price`
//! - available_from: `record.departure_date >= prefs.available_from`
//! - available_to: `record.return_date <= prefs.available_to`
//! - tags: non-empty intersection when `prefs.tags` is non-empty
//!
//! An inverted availability window (`from > to`) can never be satisfied and
//! yields an empty result; an empty result is not an error.

use crate::{TripPreferences, TripRecord};

/// Filter a catalog snapshot against a preference set, preserving order.
pub fn filter(catalog: &[TripRecord], prefs: &TripPreferences) -> Vec<TripRecord> {
    catalog
        .iter()
        .filter(|record| matches(record, prefs))
        .cloned()
        .collect()
}

/// True when the record satisfies every constraint the preference set imposes.
pub fn matches(record: &TripRecord, prefs: &TripPreferences) -> bool {
    if let Some(country) = &prefs.destination_country {
        if record.destination_country != *country {
            return false;
        }
    }

    if let Some(city) = &prefs.destination_city {
        if record.destination_city != *city {
            return false;
        }
    }

    if let Some(departure) = &prefs.departure_city {
        if record.departure_city != *departure {
            return false;
        }
    }

    if let Some(max_price) = prefs.price {
        if record.price > max_price {
            return false;
        }
    }

    if let Some(from) = prefs.available_from {
        if record.departure_date < from {
            return false;
        }
    }

    if let Some(to) = prefs.available_to {
        if record.return_date > to {
            return false;
        }
    }

    if !prefs.tags.is_empty() && prefs.tags.is_disjoint(&record.tags) {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn tags(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn trip(id: &str, country: &str, price: f64) -> TripRecord {
        TripRecord {
            id: id.to_string(),
            title: format!("Trip {}", id),
            destination_country: country.to_string(),
            destination_city: "City".to_string(),
            departure_city: "Warszawa".to_string(),
            price,
            departure_date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            return_date: NaiveDate::from_ymd_opt(2025, 6, 20).unwrap(),
            tags: HashSet::new(),
            spots_left: 5,
        }
    }

    fn catalog() -> Vec<TripRecord> {
        vec![trip("A", "France", 1000.0), trip("B", "Spain", 3000.0)]
    }

    fn ids(records: &[TripRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_preferences_return_full_catalog_in_order() {
        let results = filter(&catalog(), &TripPreferences::default());
        assert_eq!(ids(&results), vec!["A", "B"]);
    }

    #[test]
    fn test_price_ceiling() {
        let prefs = TripPreferences {
            price: Some(1500.0),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&catalog(), &prefs)), vec!["A"]);
    }

    #[test]
    fn test_conjunction_of_constraints() {
        // Spain exists but not under 1500; conjunction leaves nothing.
        let prefs = TripPreferences {
            destination_country: Some("Spain".to_string()),
            price: Some(1500.0),
            ..Default::default()
        };
        assert!(filter(&catalog(), &prefs).is_empty());
    }

    #[test]
    fn test_country_match_is_case_sensitive() {
        let prefs = TripPreferences {
            destination_country: Some("spain".to_string()),
            ..Default::default()
        };
        assert!(filter(&catalog(), &prefs).is_empty());
    }

    #[test]
    fn test_tag_filter_requires_intersection() {
        let mut beach_trip = trip("A", "Spain", 2000.0);
        beach_trip.tags = tags(&["beach", "sightseeing"]);
        let mut mountain_trip = trip("B", "France", 2000.0);
        mountain_trip.tags = tags(&["mountains"]);
        let snapshot = vec![beach_trip, mountain_trip];

        let prefs = TripPreferences {
            tags: tags(&["mountains"]),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&snapshot, &prefs)), vec!["B"]);
    }

    #[test]
    fn test_record_without_tags_excluded_by_tag_constraint() {
        let prefs = TripPreferences {
            tags: tags(&["mountains"]),
            ..Default::default()
        };
        assert!(filter(&catalog(), &prefs).is_empty());
    }

    #[test]
    fn test_date_window() {
        let prefs = TripPreferences {
            available_from: NaiveDate::from_ymd_opt(2025, 6, 1),
            available_to: NaiveDate::from_ymd_opt(2025, 6, 30),
            ..Default::default()
        };
        assert_eq!(ids(&filter(&catalog(), &prefs)), vec!["A", "B"]);

        // Departure before the window start excludes.
        let prefs = TripPreferences {
            available_from: NaiveDate::from_ymd_opt(2025, 6, 15),
            ..Default::default()
        };
        assert!(filter(&catalog(), &prefs).is_empty());

        // Return after the window end excludes.
        let prefs = TripPreferences {
            available_to: NaiveDate::from_ymd_opt(2025, 6, 15),
            ..Default::default()
        };
        assert!(filter(&catalog(), &prefs).is_empty());
    }

    #[test]
    fn test_inverted_date_window_matches_nothing() {
        let prefs = TripPreferences {
            available_from: NaiveDate::from_ymd_opt(2025, 7, 1),
            available_to: NaiveDate::from_ymd_opt(2025, 6, 1),
            ..Default::default()
        };
        assert!(filter(&catalog(), &prefs).is_empty());
    }

    #[test]
    fn test_adding_a_constraint_never_grows_the_result() {
        let base = TripPreferences {
            price: Some(5000.0),
            ..Default::default()
        };
        let narrowed = TripPreferences {
            destination_country: Some("Spain".to_string()),
            ..base.clone()
        };

        let base_results = filter(&catalog(), &base);
        let narrowed_results = filter(&catalog(), &narrowed);
        assert!(narrowed_results.len() <= base_results.len());
        for record in &narrowed_results {
            assert!(base_results.contains(record));
        }
    }
}
