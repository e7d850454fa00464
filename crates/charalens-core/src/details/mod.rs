//! Character detail lookup through a text-generation API.
//!
//! The provider is asked for a JSON object describing the predicted
//! character. The reply is unwrapped from any Markdown fence and parsed into
//! [`CharacterDetails`]. A reply that is valid JSON but carries an `"error"`
//! field is a soft failure: the caller keeps the prediction and skips the
//! rest of the enrichment.

pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod provider;

pub use provider::{resolve_env_var, LlmProvider, LlmProviderFactory, LlmRequest, LlmResponse};

use crate::config::Config;
use crate::error::{RecognizeError, RecognizeResult};
use crate::types::CharacterDetails;
use std::time::Duration;

/// Outcome of a detail lookup that reached the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    /// The provider described the character.
    Found(CharacterDetails),
    /// The provider declined (unknown character, empty name).
    SoftError(String),
}

/// Looks up structured details for a predicted character.
pub struct DetailService {
    provider: Box<dyn LlmProvider>,
}

impl DetailService {
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Build the service from config, using the configured provider and timeout.
    pub fn from_config(config: &Config) -> RecognizeResult<Self> {
        let timeout = Duration::from_millis(config.limits.details_timeout_ms);
        let provider = LlmProviderFactory::create(&config.details, timeout)?;
        Ok(Self::new(provider))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Ask the provider about `character_name`.
    ///
    /// Transport failures, non-2xx statuses and unparseable replies are
    /// returned as [`RecognizeError::Upstream`].
    pub async fn lookup(&self, character_name: &str) -> RecognizeResult<DetailOutcome> {
        let name = character_name.trim();
        if name.is_empty() {
            return Ok(DetailOutcome::SoftError(
                "Character name is empty".to_string(),
            ));
        }

        let request = LlmRequest::character_details(name);
        let response = self.provider.generate(&request).await?;

        tracing::debug!(
            provider = self.provider.name(),
            model = %response.model,
            tokens = ?response.tokens_used,
            latency_ms = response.latency_ms,
            "Detail lookup for {name} completed"
        );

        parse_details(self.provider.name(), &response.text, name)
    }
}

/// Remove a surrounding Markdown code fence (```` ```json ... ``` ````).
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches("json"),
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parse a provider reply into a [`DetailOutcome`].
///
/// An empty `name` in the reply falls back to the predicted name.
pub fn parse_details(
    service: &str,
    text: &str,
    predicted_name: &str,
) -> RecognizeResult<DetailOutcome> {
    let body = strip_code_fences(text);

    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        RecognizeError::upstream(service, format!("Failed to parse JSON response: {e}"))
    })?;

    if let Some(reason) = value.get("error") {
        let reason = match reason {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Ok(DetailOutcome::SoftError(reason));
    }

    let mut details: CharacterDetails = serde_json::from_value(value).map_err(|e| {
        RecognizeError::upstream(service, format!("Unexpected response shape: {e}"))
    })?;

    if details.name.trim().is_empty() {
        details.name = predicted_name.to_string();
    }
    // Image URLs come from the image lookup, never from the text model.
    details.image_url = None;

    Ok(DetailOutcome::Found(details))
}
