//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the trip-search backend, providing the
//! error taxonomy shared by all components and conversion utilities.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from extraction, normalization and catalog access
//! - **Output**: Structured error types with context
//! - **Error Categories**: Extraction, Normalization, Catalog, Configuration, API
//!
//! ## Key Features
//! - Explicit variants for every expected failure mode
//! - User-facing vs. operator-facing error separation
//! - Automatic conversion from transport and serialization errors
//! - Structured logging integration via `category()`

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, TripSearchError>;

/// Error taxonomy for the trip-search backend
#[derive(Debug, Error)]
pub enum TripSearchError {
    /// Extractor output is not parseable JSON after delimiter stripping
    #[error("Extractor response does not contain valid JSON: {details}")]
    ExtractionFormat { details: String },

    /// The extractor endpoint could not be reached or answered abnormally
    #[error("Extractor unavailable: {details}")]
    ExtractorUnavailable { details: String },

    /// A date field was present but not in DD/MM/YY form
    #[error("Invalid date format for '{field}': {value}")]
    InvalidDateFormat { field: String, value: String },

    /// Underlying catalog query failure; carries operator-level detail
    #[error("Catalog backend '{source_name}' failed: {details}")]
    FilterBackend { source_name: String, details: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TripSearchError {
    /// True for errors caused by the user's input (or the extractor's reading
    /// of it) rather than by the system; these map to 4xx responses and a
    /// message the user can act on.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            TripSearchError::ExtractionFormat { .. } | TripSearchError::InvalidDateFormat { .. }
        )
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            TripSearchError::ExtractionFormat { .. }
            | TripSearchError::ExtractorUnavailable { .. } => "extraction",
            TripSearchError::InvalidDateFormat { .. } => "normalization",
            TripSearchError::FilterBackend { .. } => "catalog",
            TripSearchError::Config { .. } => "configuration",
            TripSearchError::ValidationFailed { .. } => "validation",
            TripSearchError::Internal { .. } => "generic",
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for TripSearchError {
    fn from(err: std::io::Error) -> Self {
        TripSearchError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<serde_json::Error> for TripSearchError {
    fn from(err: serde_json::Error) -> Self {
        TripSearchError::Internal {
            message: format!("JSON serialization error: {}", err),
        }
    }
}

impl From<reqwest::Error> for TripSearchError {
    fn from(err: reqwest::Error) -> Self {
        TripSearchError::ExtractorUnavailable {
            details: err.to_string(),
        }
    }
}

/// Helper macro for internal errors
#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::errors::TripSearchError::Internal {
            message: $msg.to_string(),
        }
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::errors::TripSearchError::Internal {
            message: format!($fmt, $($arg)*),
        }
    };
}
