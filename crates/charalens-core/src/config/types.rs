//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the model, label map and catalog
    pub data_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("~/.charalens"),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Origins allowed by CORS. `"*"` allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

/// Resource limits to protect against problematic inputs and slow collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,

    /// Classifier inference timeout in milliseconds
    pub classify_timeout_ms: u64,

    /// Detail provider request timeout in milliseconds
    pub details_timeout_ms: u64,

    /// Image lookup request timeout in milliseconds
    pub image_lookup_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 10,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
            classify_timeout_ms: 10000,
            details_timeout_ms: 60000,
            image_lookup_timeout_ms: 10000,
        }
    }
}

/// Image classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// ONNX export of the fine-tuned classifier (relative to `data_dir`)
    pub model_file: PathBuf,

    /// JSON mapping of class index to character name (relative to `data_dir`)
    pub labels_file: PathBuf,

    /// Shorter side is resized to this before center cropping
    pub resize_size: u32,

    /// Model input size (square crop)
    pub image_size: u32,

    /// Minimum softmax probability to accept a prediction
    pub confidence_threshold: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_file: PathBuf::from("anime_character_model.onnx"),
            labels_file: PathBuf::from("class_names.json"),
            resize_size: 256,
            image_size: 224,
            confidence_threshold: 0.20,
        }
    }
}

/// Similarity catalog settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog JSON file (relative to `data_dir`)
    pub file: PathBuf,

    /// Number of similar characters returned per recognition
    pub top_n: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("character_catalog.json"),
            top_n: 3,
        }
    }
}

/// Detail provider configurations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailsConfig {
    /// Active provider: "gemini", "openai" or "ollama"
    pub provider: String,

    /// Google Gemini configuration
    pub gemini: Option<GeminiConfig>,

    /// OpenAI configuration
    pub openai: Option<OpenAiConfig>,

    /// Ollama (local) configuration
    pub ollama: Option<OllamaConfig>,
}

impl Default for DetailsConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            gemini: None,
            openai: None,
            ollama: None,
        }
    }
}

/// Google Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: "${GOOGLE_API_KEY}".to_string(),
            model: "gemini-2.5-flash".to_string(),
        }
    }
}

/// OpenAI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Chat Completions endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Model name
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama API endpoint
    pub endpoint: String,

    /// Model name
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
        }
    }
}

/// Character image lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Active provider: "auto", "jikan" or "mal".
    /// `auto` uses MyAnimeList when a client ID resolves, Jikan otherwise.
    pub provider: String,

    /// Minimum delay between the start of two lookups, in milliseconds
    pub min_interval_ms: u64,

    /// Jikan (unofficial MyAnimeList mirror) configuration
    pub jikan: JikanConfig,

    /// Official MyAnimeList API configuration
    pub mal: MalConfig,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            provider: "auto".to_string(),
            min_interval_ms: 1000,
            jikan: JikanConfig::default(),
            mal: MalConfig::default(),
        }
    }
}

/// Jikan configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JikanConfig {
    /// API base URL
    pub endpoint: String,
}

impl Default for JikanConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.jikan.moe/v4".to_string(),
        }
    }
}

/// MyAnimeList configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MalConfig {
    /// API base URL
    pub endpoint: String,

    /// Client ID (supports ${ENV_VAR} syntax)
    pub client_id: String,
}

impl Default for MalConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.myanimelist.net/v2".to_string(),
            client_id: "${MAL_CLIENT_ID}".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
