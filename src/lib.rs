//! # Conversational Trip-Search Backend
//!
//! ## Overview
//! This library implements the backend of a conversational trip-search service:
//! free-text (Polish) user utterances are turned into structured trip
//! preferences by an external language-model extractor, accumulated across
//! turns per session, and matched against a catalog of trip records.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `extraction`: External field-extractor boundary and raw-output recovery
//! - `normalize`: Coercion of raw extracted fields into canonical types
//! - `merge`: Keep-unless-overridden merge of preferences across turns
//! - `filter`: Conjunctive matching of the trip catalog against preferences
//! - `catalog`: Trip catalog boundary (HTTP and in-memory implementations)
//! - `session`: Session-keyed preference store
//! - `engine`: Turn orchestration (start, refine, missing-field prompts)
//! - `api`: REST API endpoints
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Free-text utterances (Polish), trip catalog records (JSON)
//! - **Output**: Matching trip records plus the accumulated preference set
//! - **Guarantee**: Deterministic merge and filter behavior given extracted
//!   fields; no guarantee about the extractor's natural-language understanding
//!
//! ## Usage
//! ```rust,no_run
//! use trip_search::engine::TripSearchEngine;
//!
//! # async fn run(engine: TripSearchEngine) -> trip_search::Result<()> {
//! let outcome = engine.start_search("sesja-1", "Chcę lecieć do Hiszpanii, budżet 3000").await?;
//! println!("Found {} trips", outcome.matches.len());
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod errors;
pub mod extraction;
pub mod normalize;
pub mod merge;
pub mod filter;
pub mod catalog;
pub mod session;
pub mod engine;
pub mod api;

// Re-exports for convenience
pub use config::Config;
pub use errors::{Result, TripSearchError};
pub use extraction::RawExtraction;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Accumulated trip-search criteria for one conversation session.
///
/// Every field is independently optional: `None` means "not yet mentioned"
/// and imposes no filter constraint. Unknown is distinct from explicitly
/// cleared (an explicit clear is stored as a known value, e.g.
/// `baggage = Some(false)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripPreferences {
    /// Destination country (catalog form, e.g. "Spain")
    pub destination_country: Option<String>,
    /// Destination city
    pub destination_city: Option<String>,
    /// Departure city
    pub departure_city: Option<String>,
    /// Maximum budget
    pub price: Option<f64>,
    /// Whether checked baggage is requested
    pub baggage: Option<bool>,
    /// Number of checked bags; forced to 0 when baggage is explicitly declined
    pub baggage_count: Option<u32>,
    /// Trip tags to match (non-empty intersection); empty set imposes no filter
    #[serde(default)]
    pub tags: HashSet<String>,
    /// Earliest acceptable departure date
    pub available_from: Option<NaiveDate>,
    /// Latest acceptable return date
    pub available_to: Option<NaiveDate>,
}

impl TripPreferences {
    /// True when no field has been set yet (the state at session start).
    pub fn is_empty(&self) -> bool {
        self.destination_country.is_none()
            && self.destination_city.is_none()
            && self.departure_city.is_none()
            && self.price.is_none()
            && self.baggage.is_none()
            && self.baggage_count.is_none()
            && self.tags.is_empty()
            && self.available_from.is_none()
            && self.available_to.is_none()
    }
}

/// One trip offer from the catalog. Read-only snapshot; records are fetched
/// fresh from the catalog on every filter call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    /// Catalog identifier (unique within one snapshot)
    pub id: String,
    /// Human-readable trip title
    pub title: String,
    /// Destination country
    pub destination_country: String,
    /// Destination city
    pub destination_city: String,
    /// Departure city
    pub departure_city: String,
    /// Total price
    pub price: f64,
    /// Departure date
    pub departure_date: NaiveDate,
    /// Return date
    pub return_date: NaiveDate,
    /// Descriptive tags (e.g. "mountains", "beach")
    #[serde(default)]
    pub tags: HashSet<String>,
    /// Remaining spots; descriptive only, not filtered on
    pub spots_left: u32,
}

/// Application state shared across API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub engine: Arc<engine::TripSearchEngine>,
}
