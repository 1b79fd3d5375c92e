//! # Field Extraction Module
//!
//! ## Purpose
//! Defines the boundary to the external language-model field extractor and
//! the recovery of structured JSON from its free-form output. The extractor
//! is an opaque collaborator: it may omit keys, use wrong types, wrap the
//! JSON in delimiter text, or return prose instead of JSON.
//!
//! ## Input/Output Specification
//! - **Input**: Free text (Polish) plus, on refinement turns, the current
//!   preference set
//! - **Output**: A `RawExtraction` — an untrusted map of field names to JSON
//!   values using the string sentinel `"null"` for unmentioned fields
//! - **Contract**: The canonical key schema is `destination_country,
//!   destination_city, price, departure_city, baggage, number_of_baggage,
//!   tags, available_time{from,to}`; dates are `DD/MM/YY`
//!
//! ## Architecture
//! - `FieldExtractor` trait: common interface for extractor implementations
//! - `openai.rs`: OpenAI chat-completions implementation
//! - `clean_response`: strips delimiter text around the JSON payload

pub mod openai;

pub use openai::OpenAiExtractor;

use crate::errors::{Result, TripSearchError};
use crate::TripPreferences;
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

/// Untrusted field mapping as produced by the external extractor.
///
/// Values may be strings, numbers, arrays or nested objects; the string
/// sentinel `"null"` means "field not mentioned". The sentinel must never
/// propagate past the normalizer.
pub type RawExtraction = serde_json::Map<String, serde_json::Value>;

/// Trait for field-extractor implementations
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    /// Get the name of this extractor (for health reporting and logs)
    fn name(&self) -> &str;

    /// Extract trip-preference fields from free text.
    ///
    /// On refinement turns `existing` carries the current preference set so
    /// the extractor can signal "no change" via the `"null"` sentinel.
    /// Failures are terminal for the turn; there are no automatic retries.
    async fn extract(
        &self,
        text: &str,
        existing: Option<&TripPreferences>,
    ) -> Result<RawExtraction>;
}

fn json_block_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Dot matches newlines: the model often pretty-prints across lines.
    PATTERN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"))
}

/// Extract the JSON object from a raw extractor response.
///
/// Models frequently wrap the payload in markdown fences or explanatory
/// prose; everything outside the outermost `{...}` block is discarded.
pub fn clean_response(response: &str) -> Result<&str> {
    json_block_pattern()
        .find(response)
        .map(|m| m.as_str())
        .ok_or_else(|| TripSearchError::ExtractionFormat {
            details: "response does not contain a JSON object".to_string(),
        })
}

/// Parse a cleaned extractor response into a `RawExtraction`.
pub fn parse_extraction(response: &str) -> Result<RawExtraction> {
    let cleaned = clean_response(response)?;

    let value: serde_json::Value =
        serde_json::from_str(cleaned).map_err(|e| TripSearchError::ExtractionFormat {
            details: format!("response is not valid JSON: {}", e),
        })?;

    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(TripSearchError::ExtractionFormat {
            details: format!("expected a JSON object, got {}", json_type_name(&other)),
        }),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_response_strips_markdown_fences() {
        let raw = "Sure! Here is the extraction:\n```json\n{\"price\": \"2000\"}\n```\nLet me know.";
        assert_eq!(clean_response(raw).unwrap(), "{\"price\": \"2000\"}");
    }

    #[test]
    fn test_clean_response_passes_bare_json() {
        let raw = r#"{"destination_country": "Spain"}"#;
        assert_eq!(clean_response(raw).unwrap(), raw);
    }

    #[test]
    fn test_prose_response_is_format_error() {
        let raw = "Niestety nie rozumiem tego zapytania.";
        assert!(matches!(
            clean_response(raw),
            Err(TripSearchError::ExtractionFormat { .. })
        ));
    }

    #[test]
    fn test_parse_extraction_nested_dates() {
        let raw = r#"{"price": "null", "available_time": {"from": "10/05/25", "to": "20/05/25"}}"#;
        let extraction = parse_extraction(raw).unwrap();
        let time = extraction["available_time"].as_object().unwrap();
        assert_eq!(time["from"], "10/05/25");
    }

    #[test]
    fn test_parse_extraction_rejects_truncated_json() {
        // The braces are balanced-looking but the body is not valid JSON.
        let raw = "{\"price\": 2000,}";
        assert!(matches!(
            parse_extraction(raw),
            Err(TripSearchError::ExtractionFormat { .. })
        ));
    }
}
