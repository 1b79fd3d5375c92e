//! # Trip Catalog Module
//!
//! ## Purpose
//! Defines the read-only boundary to the trip catalog and provides two
//! implementations: an HTTP catalog that fetches the full collection from a
//! backing service, and an in-memory catalog for demos and tests.
//!
//! ## Input/Output Specification
//! - **Input**: Catalog service URL (HTTP) or a fixed record list (static)
//! - **Output**: A fresh `Vec<TripRecord>` snapshot per call; no caching
//! - **Failure Modes**: Transport or decode failures surface as
//!   `FilterBackend` with operator-level detail, never as an empty result
//!
//! ## Architecture
//! - `TripCatalog` trait: common interface for catalog backends
//! - `HttpCatalog`: full-collection fetch over reqwest
//! - `StaticCatalog`: in-memory snapshot

use crate::config::CatalogConfig;
use crate::errors::{Result, TripSearchError};
use crate::TripRecord;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Trait for trip catalog backends
#[async_trait]
pub trait TripCatalog: Send + Sync {
    /// Get the name of this catalog backend (for errors and health reporting)
    fn name(&self) -> &str;

    /// Fetch the full trip collection as a fresh snapshot.
    ///
    /// Records are presumed unique by id within one snapshot. Backend
    /// failures are reported, never silently swallowed into an empty list.
    async fn fetch_all(&self) -> Result<Vec<TripRecord>>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> Result<()> {
        self.fetch_all().await.map(|_| ())
    }
}

/// HTTP catalog backend fetching the full collection from a service URL
pub struct HttpCatalog {
    config: CatalogConfig,
    client: Client,
}

impl HttpCatalog {
    /// Create a new HTTP catalog from configuration
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| TripSearchError::Config {
                message: format!("Failed to build catalog HTTP client: {}", e),
            })?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl TripCatalog for HttpCatalog {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_all(&self) -> Result<Vec<TripRecord>> {
        let response = self
            .client
            .get(&self.config.api_url)
            .send()
            .await
            .map_err(|e| TripSearchError::FilterBackend {
                source_name: "http".to_string(),
                details: format!("request to {} failed: {}", self.config.api_url, e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TripSearchError::FilterBackend {
                source_name: "http".to_string(),
                details: format!("catalog at {} returned HTTP {}", self.config.api_url, status),
            });
        }

        let trips: Vec<TripRecord> =
            response
                .json()
                .await
                .map_err(|e| TripSearchError::FilterBackend {
                    source_name: "http".to_string(),
                    details: format!("catalog response could not be decoded: {}", e),
                })?;

        debug!("Fetched {} trips from catalog", trips.len());
        Ok(trips)
    }
}

/// In-memory catalog backend for demos and tests
pub struct StaticCatalog {
    trips: Vec<TripRecord>,
}

impl StaticCatalog {
    /// Create a catalog over a fixed record list
    pub fn new(trips: Vec<TripRecord>) -> Self {
        Self { trips }
    }
}

#[async_trait]
impl TripCatalog for StaticCatalog {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_all(&self) -> Result<Vec<TripRecord>> {
        Ok(self.trips.clone())
    }
}
