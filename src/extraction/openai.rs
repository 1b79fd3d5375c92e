//! # OpenAI Field Extractor
//!
//! ## Purpose
//! Implements the `FieldExtractor` boundary against an OpenAI-compatible
//! chat-completions endpoint. Builds the extraction prompt (including the
//! current preference set on refinement turns), performs the blocking HTTP
//! call, and recovers the structured JSON from the model's reply.
//!
//! ## Input/Output Specification
//! - **Input**: Free text (Polish), optional current preferences
//! - **Output**: `RawExtraction` with the canonical field schema
//! - **Failure Modes**: Transport errors (`ExtractorUnavailable`), non-JSON
//!   replies (`ExtractionFormat`); neither is retried

use super::{parse_extraction, FieldExtractor, RawExtraction};
use crate::config::ExtractorConfig;
use crate::errors::{Result, TripSearchError};
use crate::TripPreferences;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// OpenAI chat-completions extractor
pub struct OpenAiExtractor {
    config: ExtractorConfig,
    client: Client,
}

/// Chat-completions request payload
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

/// One chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat-completions response payload
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl OpenAiExtractor {
    /// Create a new extractor from configuration
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| TripSearchError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { config, client })
    }

    /// Build the extraction prompt for one turn.
    ///
    /// The schema and the `"null"` sentinel convention are the versioned
    /// contract with the model: every key must always be present, and a field
    /// the user did not mention (or did not change) must be the string
    /// `"null"`.
    fn build_prompt(&self, text: &str, existing: Option<&TripPreferences>) -> String {
        let mut prompt = String::from(
            "You are a travel agency consultant. The user writes in Polish. \
             Extract trip-search fields from their message.\n\
             Rules:\n\
             - price: just a number, no words or currency.\n\
             - baggage: True or False.\n\
             - number_of_baggage: just a number.\n\
             - tags: short English keywords describing the trip style (e.g. mountains, beach, sightseeing).\n\
             - dates: format DD/MM/YY.\n\
             - For any field the user does not mention, write \"null\".\n\
             Return ONLY a JSON object in exactly this shape:\n\
             {\n\
                 \"destination_country\": \"<country>\",\n\
                 \"destination_city\": \"<city>\",\n\
                 \"departure_city\": \"<city>\",\n\
                 \"price\": \"<price>\",\n\
                 \"baggage\": \"<True/False>\",\n\
                 \"number_of_baggage\": \"<count>\",\n\
                 \"tags\": [\"<tag>\"],\n\
                 \"available_time\": {\n\
                     \"from\": \"<start_date>\",\n\
                     \"to\": \"<end_date>\"\n\
                 }\n\
             }\n",
        );

        if let Some(prefs) = existing {
            // Refinement turn: the model sees what is already known and must
            // answer "null" for anything the new message leaves unchanged.
            let current = serde_json::to_string(prefs).unwrap_or_else(|_| "{}".to_string());
            prompt.push_str(&format!(
                "The user is refining an earlier search. Current preferences:\n{}\n\
                 Only report fields the new message changes; everything else must be \"null\".\n",
                current
            ));
        }

        prompt.push_str(&format!("HERE IS TEXT FROM USER:\n{}", text));
        prompt
    }
}

#[async_trait]
impl FieldExtractor for OpenAiExtractor {
    fn name(&self) -> &str {
        "openai"
    }

    async fn extract(
        &self,
        text: &str,
        existing: Option<&TripPreferences>,
    ) -> Result<RawExtraction> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: self.build_prompt(text, existing),
            }],
            temperature: 0.0,
        };

        let mut builder = self.client.post(&self.config.api_url).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TripSearchError::ExtractorUnavailable {
                details: format!("extractor returned HTTP {}: {}", status, body),
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| TripSearchError::ExtractorUnavailable {
                details: format!("malformed chat-completions envelope: {}", e),
            })?;

        let raw = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| TripSearchError::ExtractionFormat {
                details: "extractor returned no choices".to_string(),
            })?;

        debug!("Raw extractor response: {}", raw);

        let extraction = parse_extraction(raw)?;
        debug!("Cleaned extraction: {:?}", extraction);

        Ok(extraction)
    }
}
