//! Charalens Core - anime character recognition library.
//!
//! Charalens takes an uploaded image and returns who is in it: the
//! classifier's prediction, a short profile from a text-generation API, and
//! the catalog characters that look most alike.
//!
//! # Architecture
//!
//! ```text
//! Upload → Validate → Decode → Classify (ONNX) → Details (LLM) → Rank (Jaccard) → Images → JSON
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use charalens_core::{Config, Recognizer};
//!
//! #[tokio::main]
//! async fn main() -> charalens_core::Result<()> {
//!     let config = Config::load()?;
//!     let recognizer = Recognizer::from_config(&config)?;
//!
//!     let bytes = std::fs::read("./anya.jpg")?;
//!     let result = recognizer.recognize(bytes, Some("image/jpeg")).await?;
//!     println!("{}", result.prediction_result.character_name);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod details;
pub mod error;
pub mod images;
pub mod math;
pub mod pipeline;
pub mod recognizer;
pub mod types;

// Re-exports for convenient access
pub use catalog::Catalog;
pub use classifier::{CharacterClassifier, LabelMap, OnnxClassifier};
pub use config::Config;
pub use details::{DetailOutcome, DetailService, LlmProvider};
pub use error::{CharaError, ConfigError, ErrorKind, RecognizeError, RecognizeResult, Result};
pub use images::{ImageLookup, PacedLookup};
pub use recognizer::Recognizer;
pub use types::{
    CharacterDetails, CharacterRecord, Prediction, RecognitionResult, SimilarCharacter,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
