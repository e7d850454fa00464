//! Text-generation provider trait and request/response types.
//!
//! Defines the interface every detail provider implements, plus the
//! factory that creates the configured provider.

use crate::config::DetailsConfig;
use crate::error::{RecognizeError, RecognizeResult};
use async_trait::async_trait;
use std::time::Duration;

/// A request for generated text.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Text prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl LlmRequest {
    /// Build the structured-details prompt for a character.
    ///
    /// The model is asked for a single JSON object; a worked example pins the
    /// shape down.
    pub fn character_details(character_name: &str) -> Self {
        let prompt = format!(
            r#"Please provide details for the anime character named "{character_name}".
I need the response in a specific JSON format. The JSON object should have the following keys:
- "name": The character's full, corrected name.
- "about": A 2-3 sentence summary about the character.
- "tags": A JSON array of 5-7 descriptive tags about the character's physical appearance and style (e.g., "long pink hair", "blue eyes", "wears glasses", "school uniform").
- "anime_name": The full name of the primary anime the character is in.
- "streaming_platforms": A JSON array of well-known, legal websites where the anime can be watched (e.g., "Crunchyroll", "Netflix", "Hulu"). If none, provide an empty array.
If you do not know this character, respond with {{"error": "<short reason>"}} instead.

Here is an example for "Anya Forger":
{{
    "name": "Anya Forger",
    "about": "Anya Forger is a young girl with telepathic abilities who was adopted by the spy Loid Forger for his mission. She is curious, cheerful, and often misinterprets situations, leading to comedic outcomes.",
    "tags": ["short pink hair", "green eyes", "child", "school uniform", "black hair accessories"],
    "anime_name": "Spy x Family",
    "streaming_platforms": ["Crunchyroll", "Hulu", "Netflix"]
}}

Now, generate the JSON for "{character_name}":"#
        );

        Self {
            prompt,
            max_tokens: 2048,
            temperature: 0.2,
        }
    }
}

/// The response from a generation call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all detail providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging and error reports (e.g., "gemini").
    fn name(&self) -> &str;

    /// Generate text for the given request.
    async fn generate(&self, request: &LlmRequest) -> RecognizeResult<LlmResponse>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Map a transport error to an upstream error, keeping any HTTP status.
pub(crate) fn transport_error(service: &str, err: reqwest::Error) -> RecognizeError {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        format!("request failed: {err}")
    };
    RecognizeError::Upstream {
        service: service.to_string(),
        message,
        status_code: err.status().map(|s| s.as_u16()),
    }
}

/// Turn a non-2xx response into an upstream error carrying its status.
pub(crate) async fn status_error(service: &str, resp: reqwest::Response) -> RecognizeError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    RecognizeError::Upstream {
        service: service.to_string(),
        message: format!("HTTP {status}: {text}"),
        status_code: Some(status.as_u16()),
    }
}

/// Factory that creates the configured provider.
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Create the provider named by `config.provider`.
    ///
    /// # Arguments
    /// * `config` - The details config section
    /// * `timeout` - Per-request timeout applied to every call
    pub fn create(config: &DetailsConfig, timeout: Duration) -> RecognizeResult<Box<dyn LlmProvider>> {
        match config.provider.as_str() {
            "gemini" => {
                let cfg = config.gemini.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    RecognizeError::upstream(
                        "gemini",
                        "Gemini API key not set. Set GOOGLE_API_KEY env var.",
                    )
                })?;
                Ok(Box::new(super::gemini::GeminiProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    &cfg.model,
                    timeout,
                )))
            }
            "openai" => {
                let cfg = config.openai.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    RecognizeError::upstream(
                        "openai",
                        "OpenAI API key not set. Set OPENAI_API_KEY env var.",
                    )
                })?;
                Ok(Box::new(super::openai::OpenAiProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    &cfg.model,
                    timeout,
                )))
            }
            "ollama" => {
                let cfg = config.ollama.clone().unwrap_or_default();
                Ok(Box::new(super::ollama::OllamaProvider::new(
                    &cfg.endpoint,
                    &cfg.model,
                    timeout,
                )))
            }
            other => Err(RecognizeError::upstream(
                other,
                format!("Unknown detail provider: {other}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenAiConfig;

    #[test]
    fn test_character_details_prompt() {
        let request = LlmRequest::character_details("Lelouch Lamperouge");
        assert!(request.prompt.contains("\"Lelouch Lamperouge\""));
        assert!(request.prompt.contains("\"streaming_platforms\""));
        assert!(request.prompt.contains("{\"error\""));
    }

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }

    #[test]
    fn test_factory_requires_api_key() {
        let config = DetailsConfig {
            provider: "openai".to_string(),
            openai: Some(OpenAiConfig {
                api_key: "${DEFINITELY_NOT_SET_XYZ_123}".to_string(),
                ..OpenAiConfig::default()
            }),
            ..DetailsConfig::default()
        };
        let err = LlmProviderFactory::create(&config, Duration::from_secs(5))
            .err()
            .unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_factory_builds_ollama_without_key() {
        let config = DetailsConfig {
            provider: "ollama".to_string(),
            ..DetailsConfig::default()
        };
        let provider = LlmProviderFactory::create(&config, Duration::from_secs(5)).unwrap();
        assert_eq!(provider.name(), "ollama");
        assert_eq!(provider.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_factory_rejects_unknown_provider() {
        let config = DetailsConfig {
            provider: "hyperbolic".to_string(),
            ..DetailsConfig::default()
        };
        assert!(LlmProviderFactory::create(&config, Duration::from_secs(5)).is_err());
    }
}
