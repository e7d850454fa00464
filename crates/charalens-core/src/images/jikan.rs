//! Jikan v4 character search (unofficial MyAnimeList mirror, no key).

use super::ImageLookup;
use crate::details::provider::{status_error, transport_error};
use crate::error::{RecognizeError, RecognizeResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub struct JikanLookup {
    endpoint: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl JikanLookup {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<JikanCharacter>,
}

#[derive(Deserialize)]
struct JikanCharacter {
    images: Option<JikanImages>,
}

#[derive(Deserialize)]
struct JikanImages {
    jpg: Option<JikanJpg>,
}

#[derive(Deserialize)]
struct JikanJpg {
    image_url: Option<String>,
}

impl SearchResponse {
    fn first_image_url(self) -> Option<String> {
        self.data
            .into_iter()
            .next()?
            .images?
            .jpg?
            .image_url
            .filter(|url| !url.is_empty())
    }
}

#[async_trait]
impl ImageLookup for JikanLookup {
    fn name(&self) -> &str {
        "jikan"
    }

    async fn image_url(&self, character_name: &str) -> RecognizeResult<Option<String>> {
        let name = character_name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let resp = self
            .client
            .get(format!("{}/characters", self.endpoint))
            .query(&[("q", name), ("limit", "1")])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error("jikan", e))?;

        if !resp.status().is_success() {
            return Err(status_error("jikan", resp).await);
        }

        let search: SearchResponse = resp.json().await.map_err(|e| {
            RecognizeError::upstream("jikan", format!("Failed to parse Jikan response: {e}"))
        })?;

        Ok(search.first_image_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_image_url() {
        let raw = r#"{"data": [{"mal_id": 136359, "images": {"jpg": {"image_url": "https://cdn.myanimelist.net/images/characters/4/457933.jpg"}, "webp": {}}}]}"#;
        let resp: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            resp.first_image_url().as_deref(),
            Some("https://cdn.myanimelist.net/images/characters/4/457933.jpg")
        );
    }

    #[test]
    fn test_no_results() {
        let resp: SearchResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(resp.first_image_url().is_none());

        let resp: SearchResponse = serde_json::from_str(r#"{"data": [{"images": {}}]}"#).unwrap();
        assert!(resp.first_image_url().is_none());
    }

    #[tokio::test]
    async fn test_empty_name_skips_request() {
        // Unroutable endpoint: any request would fail.
        let lookup = JikanLookup::new("http://127.0.0.1:9", Duration::from_millis(50));
        assert_eq!(lookup.image_url("  ").await.unwrap(), None);
    }
}
