//! # Turn Orchestration Module
//!
//! ## Purpose
//! Main engine tying the pipeline together: one user utterance goes through
//! extraction, normalization and merge, the merged preference set is stored
//! for the session, and a fresh catalog snapshot is filtered against it.
//!
//! ## Input/Output Specification
//! - **Input**: Session identifier, free-text utterance
//! - **Output**: `TurnOutcome` with the merged preferences, the matching
//!   trips, and an optional follow-up prompt for missing fields
//! - **Failure Modes**: Extraction and date errors abort the turn before the
//!   session is updated; catalog failures abort after the update
//!
//! ## Control Flow
//! text → extractor → normalizer → merge (with stored preferences) → store →
//! filter (fresh catalog snapshot) → matches

use crate::catalog::TripCatalog;
use crate::errors::Result;
use crate::extraction::FieldExtractor;
use crate::session::SessionStore;
use crate::{filter, merge, normalize, TripPreferences, TripRecord};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Main trip-search engine
pub struct TripSearchEngine {
    extractor: Arc<dyn FieldExtractor>,
    catalog: Arc<dyn TripCatalog>,
    sessions: SessionStore,
}

/// Result of one conversation turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// Preference set after merging this turn
    pub preferences: TripPreferences,
    /// Catalog records matching the merged preferences, in catalog order
    pub matches: Vec<TripRecord>,
    /// Follow-up question for the user when core fields are still unknown
    pub prompt: Option<String>,
}

impl TripSearchEngine {
    /// Create a new engine over an extractor and a catalog backend
    pub fn new(extractor: Arc<dyn FieldExtractor>, catalog: Arc<dyn TripCatalog>) -> Self {
        Self {
            extractor,
            catalog,
            sessions: SessionStore::new(),
        }
    }

    /// Start a new search: the session's accumulated preferences are
    /// discarded and the utterance is treated as the first turn.
    pub async fn start_search(&self, session_id: &str, text: &str) -> Result<TurnOutcome> {
        info!(session = session_id, "Starting new search");
        self.sessions.clear(session_id).await;
        self.run_turn(session_id, text).await
    }

    /// Refine the current search: the utterance is merged into the
    /// preferences stored from earlier turns.
    pub async fn refine_search(&self, session_id: &str, text: &str) -> Result<TurnOutcome> {
        info!(session = session_id, "Refining search");
        self.run_turn(session_id, text).await
    }

    /// Get a copy of the session's current preference set
    pub async fn current_preferences(&self, session_id: &str) -> TripPreferences {
        self.sessions.get(session_id).await
    }

    /// Execute one turn. The session slot stays locked for the whole
    /// extract-normalize-merge-store sequence so concurrent turns for the
    /// same session cannot interleave.
    async fn run_turn(&self, session_id: &str, text: &str) -> Result<TurnOutcome> {
        let slot = self.sessions.slot(session_id).await;
        let mut guard = slot.lock().await;

        let existing = guard.clone();
        let known = if existing.is_empty() {
            None
        } else {
            Some(&existing)
        };

        let raw = self.extractor.extract(text, known).await?;
        let incoming = normalize::normalize(&raw)?;
        debug!(session = session_id, "Normalized extraction: {:?}", incoming);

        let merged = merge::merge(&existing, &incoming);
        *guard = merged.clone();
        drop(guard);

        let snapshot = self.catalog.fetch_all().await?;
        let matches = filter::filter(&snapshot, &merged);
        info!(
            session = session_id,
            matched = matches.len(),
            total = snapshot.len(),
            "Turn completed"
        );

        Ok(TurnOutcome {
            prompt: missing_fields_prompt(&merged),
            preferences: merged,
            matches,
        })
    }

    /// Fetch the full catalog snapshot without any filtering
    pub async fn full_catalog(&self) -> Result<Vec<TripRecord>> {
        self.catalog.fetch_all().await
    }

    /// Health check: extractor is configured, catalog is reachable
    pub async fn health_check(&self) -> Result<()> {
        self.catalog.health_check().await
    }

    /// Name of the configured extractor (for health reporting)
    pub fn extractor_name(&self) -> &str {
        self.extractor.name()
    }

    /// Name of the configured catalog backend
    pub fn catalog_name(&self) -> &str {
        self.catalog.name()
    }
}

/// Build a Polish follow-up question listing the core fields the user has
/// not given yet. Returns `None` once destination, budget and dates are all
/// known.
pub fn missing_fields_prompt(prefs: &TripPreferences) -> Option<String> {
    let mut missing = Vec::new();

    if prefs.destination_country.is_none() && prefs.destination_city.is_none() {
        missing.push("dokąd chcesz pojechać");
    }
    if prefs.price.is_none() {
        missing.push("jaki jest Twój budżet");
    }
    if prefs.available_from.is_none() && prefs.available_to.is_none() {
        missing.push("w jakim terminie chcesz podróżować");
    }

    if missing.is_empty() {
        None
    } else {
        Some(format!("Podaj jeszcze: {}.", missing.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::errors::TripSearchError;
    use crate::extraction::RawExtraction;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::{HashSet, VecDeque};
    use tokio::sync::Mutex;

    /// Extractor returning a scripted sequence of responses
    struct ScriptedExtractor {
        responses: Mutex<VecDeque<Result<RawExtraction>>>,
    }

    impl ScriptedExtractor {
        fn new(responses: Vec<Result<RawExtraction>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait]
    impl FieldExtractor for ScriptedExtractor {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn extract(
            &self,
            _text: &str,
            _existing: Option<&TripPreferences>,
        ) -> Result<RawExtraction> {
            self.responses
                .lock()
                .await
                .pop_front()
                .expect("script exhausted")
        }
    }

    fn extraction(value: serde_json::Value) -> Result<RawExtraction> {
        Ok(value.as_object().unwrap().clone())
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

    fn engine(responses: Vec<Result<RawExtraction>>) -> TripSearchEngine {
        TripSearchEngine::new(
            Arc::new(ScriptedExtractor::new(responses)),
            Arc::new(StaticCatalog::new(vec![
                trip("A", "France", 1000.0),
                trip("B", "Spain", 3000.0),
                trip("C", "Italy", 2000.0),
            ])),
        )
    }

    #[tokio::test]
    async fn test_two_turn_merge_accumulates_preferences() {
        let engine = engine(vec![
            extraction(json!({"price": "2000"})),
            extraction(json!({"price": "null", "destination_country": "Italy"})),
        ]);

        let turn1 = engine.start_search("s1", "budżet 2000").await.unwrap();
        assert_eq!(turn1.preferences.price, Some(2000.0));
        // France (1000) and Italy (2000) fit the budget.
        assert_eq!(turn1.matches.len(), 2);

        let turn2 = engine.refine_search("s1", "do Włoch").await.unwrap();
        assert_eq!(turn2.preferences.price, Some(2000.0));
        assert_eq!(turn2.preferences.destination_country.as_deref(), Some("Italy"));
        assert_eq!(turn2.matches.len(), 1);
        assert_eq!(turn2.matches[0].id, "C");
    }

    #[tokio::test]
    async fn test_start_search_discards_previous_session_state() {
        let engine = engine(vec![
            extraction(json!({"destination_country": "Spain"})),
            extraction(json!({"price": "1500"})),
        ]);

        engine.start_search("s1", "do Hiszpanii").await.unwrap();
        let restarted = engine.start_search("s1", "budżet 1500").await.unwrap();

        // The Spain constraint from the first conversation is gone.
        assert_eq!(restarted.preferences.destination_country, None);
        assert_eq!(restarted.preferences.price, Some(1500.0));
    }

    #[tokio::test]
    async fn test_invalid_date_aborts_turn_and_preserves_state() {
        let engine = engine(vec![
            extraction(json!({"price": "2000"})),
            extraction(json!({"available_time": {"from": "32/13/25", "to": "null"}})),
        ]);

        engine.start_search("s1", "budżet 2000").await.unwrap();
        let err = engine.refine_search("s1", "od 32 zlotego").await.unwrap_err();
        assert!(matches!(err, TripSearchError::InvalidDateFormat { .. }));

        // The failed turn must not have touched the stored preferences.
        let prefs = engine.current_preferences("s1").await;
        assert_eq!(prefs.price, Some(2000.0));
        assert_eq!(prefs.available_from, None);
    }

    #[tokio::test]
    async fn test_extraction_failure_propagates() {
        let engine = engine(vec![Err(TripSearchError::ExtractionFormat {
            details: "prose".to_string(),
        })]);

        let err = engine.start_search("s1", "???").await.unwrap_err();
        assert!(matches!(err, TripSearchError::ExtractionFormat { .. }));
        assert!(engine.current_preferences("s1").await.is_empty());
    }

    #[tokio::test]
    async fn test_no_matches_is_not_an_error() {
        let engine = engine(vec![extraction(
            json!({"destination_country": "Spain", "price": "1500"}),
        )]);

        let outcome = engine.start_search("s1", "Hiszpania do 1500").await.unwrap();
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_missing_fields_prompt_lists_unknown_core_fields() {
        let prompt = missing_fields_prompt(&TripPreferences::default()).unwrap();
        assert!(prompt.contains("dokąd"));
        assert!(prompt.contains("budżet"));
        assert!(prompt.contains("terminie"));
    }

    #[test]
    fn test_missing_fields_prompt_none_when_core_fields_known() {
        let prefs = TripPreferences {
            destination_country: Some("Spain".to_string()),
            price: Some(3000.0),
            available_from: NaiveDate::from_ymd_opt(2025, 5, 10),
            ..Default::default()
        };
        assert_eq!(missing_fields_prompt(&prefs), None);
    }
}
