//! Ollama provider for local text generation.
//!
//! Talks to a local Ollama instance via its HTTP API. No authentication.

use super::provider::{status_error, transport_error, LlmProvider, LlmRequest, LlmResponse};
use crate::error::{RecognizeError, RecognizeResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Ollama provider.
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl OllamaProvider {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

/// Ollama /api/generate request body.
#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    format: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama /api/generate response.
#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, request: &LlmRequest) -> RecognizeResult<LlmResponse> {
        let url = format!("{}/api/generate", self.endpoint);
        let start = Instant::now();

        let body = OllamaRequest {
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            format: "json".to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error("ollama", e))?;

        if !resp.status().is_success() {
            return Err(status_error("ollama", resp).await);
        }

        let ollama_resp: OllamaResponse = resp.json().await.map_err(|e| {
            RecognizeError::upstream("ollama", format!("Failed to parse Ollama response: {e}"))
        })?;

        let text = ollama_resp.response.trim().to_string();
        if text.is_empty() {
            return Err(RecognizeError::upstream(
                "ollama",
                "Ollama returned empty response",
            ));
        }

        let tokens_used = match (ollama_resp.prompt_eval_count, ollama_resp.eval_count) {
            (Some(p), Some(e)) => Some(p + e),
            (p, e) => p.or(e),
        };

        Ok(LlmResponse {
            text,
            model: self.model.clone(),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama3.2", Duration::from_secs(1));
        assert_eq!(provider.endpoint, "http://localhost:11434");
    }

    #[test]
    fn test_request_asks_for_json() {
        let body = OllamaRequest {
            model: "llama3.2".to_string(),
            prompt: "p".to_string(),
            format: "json".to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: 0.2,
                num_predict: 32,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["format"], "json");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 32);
    }
}
