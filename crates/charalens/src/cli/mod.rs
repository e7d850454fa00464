//! Command handlers for the charalens CLI.

pub mod config;
pub mod labels;
pub mod recognize;
pub mod serve;
pub mod similar;

use std::path::Path;

use charalens_core::Config;

/// Load configuration from `--config`, or from the platform default.
///
/// An explicit path must load. A broken default config falls back to
/// defaults with a warning so `charalens config init --force` stays usable.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        return Config::load_from(Path::new(&expanded))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", expanded));
    }

    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `charalens config path`."
            );
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn test_explicit_config_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 9100\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.catalog.top_n, 3);
    }
}
