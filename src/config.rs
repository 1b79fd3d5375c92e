//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the trip-search backend, supporting TOML
//! files and environment-variable overrides with validation and type-safe
//! access to all settings.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Type checking, range validation
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration files
//! 3. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use trip_search::config::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! println!("Server port: {}", config.server.port);
//! ```

use crate::errors::{Result, TripSearchError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server and API configuration
    pub server: ServerConfig,
    /// External field-extractor settings
    pub extractor: ExtractorConfig,
    /// Trip catalog settings
    pub catalog: CatalogConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server and API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable CORS for the web front end
    pub enable_cors: bool,
}

/// External field-extractor (LLM) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Chat-completions endpoint URL
    pub api_url: String,
    /// API key; usually supplied via TRIP_SEARCH_OPENAI_API_KEY
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Trip catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog service URL returning the full trip collection as JSON
    pub api_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| TripSearchError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| TripSearchError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("TRIP_SEARCH_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("TRIP_SEARCH_PORT") {
            self.server.port = port.parse().map_err(|_| TripSearchError::Config {
                message: "Invalid port number in TRIP_SEARCH_PORT".to_string(),
            })?;
        }
        if let Ok(api_key) = std::env::var("TRIP_SEARCH_OPENAI_API_KEY") {
            self.extractor.api_key = Some(api_key);
        }
        if let Ok(url) = std::env::var("TRIP_SEARCH_CATALOG_URL") {
            self.catalog.api_url = url;
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(TripSearchError::ValidationFailed {
                field: "server.port".to_string(),
                reason: "Port cannot be zero".to_string(),
            });
        }

        if self.extractor.api_url.is_empty() {
            return Err(TripSearchError::ValidationFailed {
                field: "extractor.api_url".to_string(),
                reason: "Extractor URL cannot be empty".to_string(),
            });
        }

        if self.extractor.timeout_seconds == 0 {
            return Err(TripSearchError::ValidationFailed {
                field: "extractor.timeout_seconds".to_string(),
                reason: "Timeout must be greater than zero".to_string(),
            });
        }

        if self.catalog.api_url.is_empty() {
            return Err(TripSearchError::ValidationFailed {
                field: "catalog.api_url".to_string(),
                reason: "Catalog URL cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get configuration as TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| TripSearchError::Config {
            message: format!("Failed to serialize config to TOML: {}", e),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                enable_cors: true,
            },
            extractor: ExtractorConfig {
                api_url: "https://api.openai.com/v1/chat/completions".to_string(),
                api_key: None,
                model: "gpt-4o-mini".to_string(),
                timeout_seconds: 30,
            },
            catalog: CatalogConfig {
                api_url: "http://127.0.0.1:9090/trips".to_string(),
                timeout_seconds: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(
            config.validate(),
            Err(TripSearchError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let toml_str = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.extractor.model, config.extractor.model);
    }
}
