//! Upload validation before decoding.

use crate::config::LimitsConfig;
use crate::error::{RecognizeError, RecognizeResult};

/// Validates uploaded bytes before decode.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation before full decode.
    ///
    /// Checks:
    /// - Declared content type (when present) is `image/*`
    /// - Body is non-empty and within the size limit
    /// - Body starts with known image magic bytes
    pub fn validate(&self, bytes: &[u8], content_type: Option<&str>) -> RecognizeResult<()> {
        if let Some(content_type) = content_type {
            if !is_image_content_type(content_type) {
                return Err(RecognizeError::InvalidUpload(format!(
                    "File provided is not an image (content type {content_type:?})"
                )));
            }
        }

        if bytes.is_empty() {
            return Err(RecognizeError::InvalidUpload("Uploaded file is empty".to_string()));
        }

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if bytes.len() as u64 > max_bytes {
            return Err(RecognizeError::FileTooLarge {
                size_mb: bytes.len() as u64 / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        if !Self::is_valid_image_header(bytes) {
            return Err(RecognizeError::InvalidUpload(
                "Unrecognized image format (invalid magic bytes)".to_string(),
            ));
        }

        Ok(())
    }

    /// Check if the leading bytes match known image formats.
    fn is_valid_image_header(header: &[u8]) -> bool {
        if header.len() < 4 {
            return false;
        }

        // JPEG: FF D8 FF
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return true;
        }

        // PNG: 89 50 4E 47
        if header.starts_with(&[0x89, b'P', b'N', b'G']) {
            return true;
        }

        // GIF: GIF8
        if header.starts_with(b"GIF8") {
            return true;
        }

        // WebP: RIFF....WEBP
        if header.starts_with(b"RIFF") {
            return header.len() >= 12 && &header[8..12] == b"WEBP";
        }

        // BMP: BM
        if header.starts_with(b"BM") {
            return true;
        }

        // AVIF: ftyp box at offset 4
        header.len() >= 12 && &header[4..8] == b"ftyp"
    }
}

/// Whether a MIME type (parameters ignored) names an image.
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().to_ascii_lowercase().starts_with("image/"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 12] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_magic_bytes_jpeg() {
        assert!(Validator::is_valid_image_header(&[0xFF, 0xD8, 0xFF, 0xE0]));
    }

    #[test]
    fn test_magic_bytes_png() {
        assert!(Validator::is_valid_image_header(&PNG_HEADER));
    }

    #[test]
    fn test_magic_bytes_webp() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'E', b'B', b'P'];
        assert!(Validator::is_valid_image_header(&header));
    }

    #[test]
    fn test_magic_bytes_riff_not_webp_rejected() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'A', b'V', b'E'];
        assert!(!Validator::is_valid_image_header(&header));
    }

    #[test]
    fn test_magic_bytes_invalid() {
        assert!(!Validator::is_valid_image_header(b"hello world!"));
        assert!(!Validator::is_valid_image_header(&[0xFF]));
    }

    #[test]
    fn test_content_type_check() {
        assert!(is_image_content_type("image/png"));
        assert!(is_image_content_type("Image/JPEG; charset=binary"));
        assert!(!is_image_content_type("text/plain"));
        assert!(!is_image_content_type("application/octet-stream"));
    }

    #[test]
    fn test_validate_rejects_non_image_content_type() {
        let validator = Validator::new(LimitsConfig::default());
        let err = validator.validate(&PNG_HEADER, Some("text/plain")).unwrap_err();
        assert!(matches!(err, RecognizeError::InvalidUpload(_)));
    }

    #[test]
    fn test_validate_rejects_empty() {
        let validator = Validator::new(LimitsConfig::default());
        assert!(validator.validate(&[], Some("image/png")).is_err());
    }

    #[test]
    fn test_validate_rejects_oversized() {
        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        };
        let validator = Validator::new(limits);
        let mut bytes = PNG_HEADER.to_vec();
        bytes.resize(1024 * 1024 + 1, 0);
        let err = validator.validate(&bytes, None).unwrap_err();
        assert!(matches!(err, RecognizeError::FileTooLarge { max_mb: 1, .. }));
    }

    #[test]
    fn test_validate_accepts_missing_content_type() {
        let validator = Validator::new(LimitsConfig::default());
        assert!(validator.validate(&PNG_HEADER, None).is_ok());
    }
}
