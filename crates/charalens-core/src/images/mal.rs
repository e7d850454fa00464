//! Official MyAnimeList v2 character search.
//!
//! Public data only needs the client ID, sent as `X-MAL-CLIENT-ID`.

use super::ImageLookup;
use crate::details::provider::{status_error, transport_error};
use crate::error::{RecognizeError, RecognizeResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub struct MalLookup {
    endpoint: String,
    client_id: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl MalLookup {
    pub fn new(endpoint: &str, client_id: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<MalEntry>,
}

#[derive(Deserialize)]
struct MalEntry {
    node: Option<MalNode>,
}

#[derive(Deserialize)]
struct MalNode {
    main_picture: Option<MalPicture>,
}

#[derive(Deserialize)]
struct MalPicture {
    large: Option<String>,
    medium: Option<String>,
}

impl SearchResponse {
    /// `large` when present, else `medium`.
    fn first_image_url(self) -> Option<String> {
        let picture = self.data.into_iter().next()?.node?.main_picture?;
        picture
            .large
            .filter(|url| !url.is_empty())
            .or(picture.medium.filter(|url| !url.is_empty()))
    }
}

#[async_trait]
impl ImageLookup for MalLookup {
    fn name(&self) -> &str {
        "mal"
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
            .header("X-MAL-CLIENT-ID", &self.client_id)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error("mal", e))?;

        if !resp.status().is_success() {
            return Err(status_error("mal", resp).await);
        }

        let search: SearchResponse = resp.json().await.map_err(|e| {
            RecognizeError::upstream("mal", format!("Failed to parse MyAnimeList response: {e}"))
        })?;

        Ok(search.first_image_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_large_picture() {
        let raw = r#"{"data": [{"node": {"id": 1, "main_picture": {"medium": "m.jpg", "large": "l.jpg"}}}]}"#;
        let resp: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.first_image_url().as_deref(), Some("l.jpg"));
    }

    #[test]
    fn test_falls_back_to_medium() {
        let raw = r#"{"data": [{"node": {"main_picture": {"medium": "m.jpg"}}}]}"#;
        let resp: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.first_image_url().as_deref(), Some("m.jpg"));
    }

    #[test]
    fn test_missing_picture() {
        let resp: SearchResponse =
            serde_json::from_str(r#"{"data": [{"node": {"id": 7}}]}"#).unwrap();
        assert!(resp.first_image_url().is_none());
        let resp: SearchResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(resp.first_image_url().is_none());
    }
}
