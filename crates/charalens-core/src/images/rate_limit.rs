//! Pacing wrapper for image lookups.
//!
//! Public anime APIs ask for roughly one request per second. [`PacedLookup`]
//! serializes calls through an async mutex and waits until `min_interval`
//! has passed since the previous call started.

use super::ImageLookup;
use crate::error::RecognizeResult;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub struct PacedLookup {
    inner: Box<dyn ImageLookup>,
    min_interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl PacedLookup {
    pub fn new(inner: Box<dyn ImageLookup>, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            last_start: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Like [`ImageLookup::image_url`], but a failure is logged and becomes `None`.
    pub async fn image_url_or_none(&self, character_name: &str) -> Option<String> {
        match self.image_url(character_name).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Image lookup for {character_name:?} failed: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl ImageLookup for PacedLookup {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn image_url(&self, character_name: &str) -> RecognizeResult<Option<String>> {
        if character_name.trim().is_empty() {
            return Ok(None);
        }

        // Held across the call so lookups never overlap.
        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            let ready_at = previous + self.min_interval;
            if Instant::now() < ready_at {
                tracing::trace!("Pacing {} lookup", self.inner.name());
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last_start = Some(Instant::now());

        self.inner.image_url(character_name).await
    }
}
