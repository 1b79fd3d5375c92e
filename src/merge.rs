//! # Preference Merge Engine Module
//!
//! ## Purpose
//! Combines a newly normalized extraction with the preferences accumulated
//! over earlier turns. Policy is keep-unless-overridden, per field
//! independently: a known incoming value replaces, an unknown incoming value
//! preserves.
//!
//! ## Input/Output Specification
//! - **Input**: Existing `TripPreferences`, normalized incoming `TripPreferences`
//! - **Output**: The merged `TripPreferences` (a fresh value; neither input
//!   is mutated)
//!
//! ## Policy Notes
//! - The extractor signals "no change" via the null sentinel, which the
//!   normalizer has already turned into `None`; absence and null are the same
//!   thing by the time they reach this module.
//! - An explicit clear (baggage declined) arrives as a known value
//!   (`Some(false)` / `Some(0)`) and overwrites like any other known value.
//! - Tags replace wholesale: a non-empty incoming tag set supersedes the old
//!   one, an empty incoming set preserves it.
//! - The first turn is the degenerate case with an empty `existing`.

use crate::TripPreferences;

/// Merge one turn's normalized extraction into the existing preference set.
pub fn merge(existing: &TripPreferences, incoming: &TripPreferences) -> TripPreferences {
    TripPreferences {
        destination_country: pick(&incoming.destination_country, &existing.destination_country),
        destination_city: pick(&incoming.destination_city, &existing.destination_city),
        departure_city: pick(&incoming.departure_city, &existing.departure_city),
        price: pick(&incoming.price, &existing.price),
        baggage: pick(&incoming.baggage, &existing.baggage),
        baggage_count: pick(&incoming.baggage_count, &existing.baggage_count),
        tags: if incoming.tags.is_empty() {
            existing.tags.clone()
        } else {
            incoming.tags.clone()
        },
        available_from: pick(&incoming.available_from, &existing.available_from),
        available_to: pick(&incoming.available_to, &existing.available_to),
    }
}

/// Known incoming value wins; unknown preserves the existing value.
fn pick<T: Clone>(incoming: &Option<T>, existing: &Option<T>) -> Option<T> {
    incoming.clone().or_else(|| existing.clone())
}
