//! Configuration management for charalens.
//!
//! Configuration is loaded from the platform config directory
//! (`~/.config/charalens/config.toml` on Linux) with sensible defaults.
//! Secrets are never stored directly: provider keys use `${ENV_VAR}` references
//! that are resolved when the providers are built.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for charalens.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Resource limits and stage timeouts
    pub limits: LimitsConfig,

    /// Image classifier settings
    pub classifier: ClassifierConfig,

    /// Similarity catalog settings
    pub catalog: CatalogConfig,

    /// Character detail (generative text) provider settings
    pub details: DetailsConfig,

    /// Character image lookup settings
    pub images: ImagesConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.charalens.charalens/config.toml
    /// - Linux: ~/.config/charalens/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\charalens\config\config.toml
    ///
    /// Falls back to ~/.charalens/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "charalens", "charalens")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".charalens").join("config.toml")
            })
    }

    /// Get the resolved data directory path (with ~ expansion).
    pub fn data_dir(&self) -> PathBuf {
        let path_str = self.general.data_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Resolve a configured file against the data directory.
    ///
    /// Absolute paths and `~` paths are used as-is (after expansion); bare
    /// file names land inside `data_dir`.
    pub fn resolve_data_file(&self, file: &Path) -> PathBuf {
        let expanded = PathBuf::from(shellexpand::tilde(&file.to_string_lossy()).into_owned());
        if expanded.is_absolute() {
            expanded
        } else {
            self.data_dir().join(expanded)
        }
    }

    /// Path to the ONNX classifier weights.
    pub fn model_path(&self) -> PathBuf {
        self.resolve_data_file(&self.classifier.model_file)
    }

    /// Path to the class-index → character-name mapping.
    pub fn labels_path(&self) -> PathBuf {
        self.resolve_data_file(&self.classifier.labels_file)
    }

    /// Path to the similarity catalog.
    pub fn catalog_path(&self) -> PathBuf {
        self.resolve_data_file(&self.catalog.file)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.catalog.top_n, 3);
        assert!((config.classifier.confidence_threshold - 0.20).abs() < f32::EPSILON);
        assert_eq!(config.images.min_interval_ms, 1000);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[classifier]"));
        assert!(toml.contains("[details]"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9100\n\n[catalog]\ntop_n = 5\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.catalog.top_n, 5);
        assert_eq!(config.details.provider, "gemini");
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[classifier]\nconfidence_threshold = 1.5\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));
    }

    #[test]
    fn test_resolve_data_file() {
        let mut config = Config::default();
        config.general.data_dir = PathBuf::from("/srv/charalens");

        assert_eq!(
            config.catalog_path(),
            PathBuf::from("/srv/charalens/character_catalog.json")
        );

        config.catalog.file = PathBuf::from("/etc/catalog.json");
        assert_eq!(config.catalog_path(), PathBuf::from("/etc/catalog.json"));
    }
}
