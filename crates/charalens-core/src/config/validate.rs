//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

const DETAIL_PROVIDERS: &[&str] = &["gemini", "openai", "ollama"];
const IMAGE_PROVIDERS: &[&str] = &["auto", "jikan", "mal"];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        let timeouts = [
            ("decode_timeout_ms", self.limits.decode_timeout_ms),
            ("classify_timeout_ms", self.limits.classify_timeout_ms),
            ("details_timeout_ms", self.limits.details_timeout_ms),
            ("image_lookup_timeout_ms", self.limits.image_lookup_timeout_ms),
        ];
        for (name, value) in timeouts {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "limits.{name} must be > 0"
                )));
            }
        }
        if self.classifier.image_size == 0 {
            return Err(ConfigError::ValidationError(
                "classifier.image_size must be > 0".into(),
            ));
        }
        if self.classifier.resize_size < self.classifier.image_size {
            return Err(ConfigError::ValidationError(
                "classifier.resize_size must be >= classifier.image_size".into(),
            ));
        }
        let threshold = self.classifier.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::ValidationError(
                "classifier.confidence_threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.catalog.top_n == 0 {
            return Err(ConfigError::ValidationError(
                "catalog.top_n must be > 0".into(),
            ));
        }
        if !DETAIL_PROVIDERS.contains(&self.details.provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "details.provider must be one of {DETAIL_PROVIDERS:?}, got {:?}",
                self.details.provider
            )));
        }
        if !IMAGE_PROVIDERS.contains(&self.images.provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "images.provider must be one of {IMAGE_PROVIDERS:?}, got {:?}",
                self.images.provider
            )));
        }
        Ok(())
    }
}
