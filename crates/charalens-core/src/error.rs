//! Error types for the charalens recognition pipeline.
//!
//! Errors are organized by stage so the HTTP layer can map each one to a
//! status code without inspecting messages.

use thiserror::Error;

/// Top-level error type for charalens operations.
#[derive(Error, Debug)]
pub enum CharaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Recognition pipeline errors
    #[error("Recognition error: {0}")]
    Recognize(#[from] RecognizeError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Coarse classification of a [`RecognizeError`], used for status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The client sent something we cannot process.
    Validation,
    /// The image was processed but no character was identified.
    NotFound,
    /// An external service failed.
    Upstream,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Recognition errors, organized by stage.
#[derive(Error, Debug)]
pub enum RecognizeError {
    /// Upload rejected before decoding (wrong content type, empty body, bad magic bytes)
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// Upload exceeds size limit
    #[error("File too large: {size_mb}MB > {max_mb}MB")]
    FileTooLarge { size_mb: u64, max_mb: u64 },

    /// Image dimensions exceed limit
    #[error("Image too large: {width}x{height} > {max_dim}")]
    ImageTooLarge { width: u32, height: u32, max_dim: u32 },

    /// Image decoding failed
    #[error("Decode error: {0}")]
    Decode(String),

    /// Model loading or inference failed
    #[error("Classification failed: {0}")]
    Classification(String),

    /// Classifier confidence below the acceptance threshold
    #[error(
        "Character could not be identified (confidence {confidence:.2} < threshold {threshold:.2})"
    )]
    Unidentified {
        best_guess: String,
        confidence: f32,
        threshold: f32,
    },

    /// An external collaborator failed (network, non-2xx, malformed body)
    #[error("{service} error: {message}")]
    Upstream {
        service: String,
        message: String,
        status_code: Option<u16>,
    },

    /// Operation timed out
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },
}

impl RecognizeError {
    /// Stage-level classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecognizeError::InvalidUpload(_)
            | RecognizeError::FileTooLarge { .. }
            | RecognizeError::ImageTooLarge { .. }
            | RecognizeError::Decode(_) => ErrorKind::Validation,
            RecognizeError::Unidentified { .. } => ErrorKind::NotFound,
            RecognizeError::Upstream { .. } => ErrorKind::Upstream,
            RecognizeError::Classification(_) | RecognizeError::Timeout { .. } => {
                ErrorKind::Internal
            }
        }
    }

    pub(crate) fn upstream(service: &str, message: impl Into<String>) -> Self {
        RecognizeError::Upstream {
            service: service.to_string(),
            message: message.into(),
            status_code: None,
        }
    }
}

/// Convenience type alias for charalens results.
pub type Result<T> = std::result::Result<T, CharaError>;

/// Convenience type alias for recognition-stage results.
pub type RecognizeResult<T> = std::result::Result<T, RecognizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            RecognizeError::InvalidUpload("text/plain".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            RecognizeError::Unidentified {
                best_guess: "Anya Forger".into(),
                confidence: 0.1,
                threshold: 0.2,
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RecognizeError::upstream("gemini", "quota exceeded").kind(),
            ErrorKind::Upstream
        );
        assert_eq!(
            RecognizeError::Timeout {
                stage: "classify".into(),
                timeout_ms: 100
            }
            .kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_unidentified_message_reports_confidence() {
        let err = RecognizeError::Unidentified {
            best_guess: "Anya Forger".into(),
            confidence: 0.1,
            threshold: 0.2,
        };
        assert!(err.to_string().contains("0.10"));
        assert!(err.to_string().contains("0.20"));
    }
}
