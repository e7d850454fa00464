//! Character thumbnail lookup.
//!
//! Each backend searches a public anime database by name and returns the
//! first hit's picture URL. Lookups are best-effort: callers go through
//! [`PacedLookup`], which spaces requests out and can turn failures into
//! a missing image.

pub mod jikan;
pub mod mal;
pub mod rate_limit;

pub use jikan::JikanLookup;
pub use mal::MalLookup;
pub use rate_limit::PacedLookup;

use crate::config::Config;
use crate::details::resolve_env_var;
use crate::error::{RecognizeError, RecognizeResult};
use async_trait::async_trait;
use std::time::Duration;

/// A source of character thumbnails.
#[async_trait]
pub trait ImageLookup: Send + Sync {
    /// Backend name for logs (e.g., "jikan").
    fn name(&self) -> &str;

    /// Picture URL of the best match for `character_name`.
    ///
    /// `Ok(None)` means the search ran but found nothing, or the name was empty.
    async fn image_url(&self, character_name: &str) -> RecognizeResult<Option<String>>;
}

/// Create the configured backend wrapped in a [`PacedLookup`].
pub fn create_lookup(config: &Config) -> RecognizeResult<PacedLookup> {
    let images = &config.images;
    let timeout = Duration::from_millis(config.limits.image_lookup_timeout_ms);
    let client_id = resolve_env_var(&images.mal.client_id);

    let inner: Box<dyn ImageLookup> = match (images.provider.as_str(), client_id) {
        ("mal", Some(id)) | ("auto", Some(id)) => {
            Box::new(MalLookup::new(&images.mal.endpoint, &id, timeout))
        }
        ("mal", None) => {
            return Err(RecognizeError::upstream(
                "mal",
                "MyAnimeList client ID not set. Set MAL_CLIENT_ID env var.",
            ))
        }
        ("jikan", _) | ("auto", None) => Box::new(JikanLookup::new(&images.jikan.endpoint, timeout)),
        (other, _) => {
            return Err(RecognizeError::upstream(
                other,
                format!("Unknown image provider: {other}"),
            ))
        }
    };

    tracing::debug!(
        "Image lookups via {} every {}ms",
        inner.name(),
        images.min_interval_ms
    );

    Ok(PacedLookup::new(
        inner,
        Duration::from_millis(images.min_interval_ms),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_without_client_id_uses_jikan() {
        let mut config = Config::default();
        config.images.mal.client_id = "${DEFINITELY_NOT_SET_XYZ_123}".to_string();
        let lookup = create_lookup(&config).unwrap();
        assert_eq!(lookup.name(), "jikan");
        assert_eq!(lookup.min_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_auto_with_client_id_uses_mal() {
        let mut config = Config::default();
        config.images.mal.client_id = "literal-client-id".to_string();
        assert_eq!(create_lookup(&config).unwrap().name(), "mal");
    }

    #[test]
    fn test_mal_requires_client_id() {
        let mut config = Config::default();
        config.images.provider = "mal".to_string();
        config.images.mal.client_id = String::new();
        assert!(create_lookup(&config).is_err());
    }

    #[test]
    fn test_explicit_jikan_ignores_client_id() {
        let mut config = Config::default();
        config.images.provider = "jikan".to_string();
        config.images.mal.client_id = "literal-client-id".to_string();
        assert_eq!(create_lookup(&config).unwrap().name(), "jikan");
    }
}
