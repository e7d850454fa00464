//! API error types mapped to HTTP status codes.
//!
//! Every error renders as `{"detail": message, "kind": kind}`, plus the
//! classifier `confidence` when a character could not be identified.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use charalens_core::{ErrorKind, RecognizeError};
use serde_json::json;

/// Application-level error type that implements `IntoResponse`.
///
/// - `BadRequest` → 400
/// - `PayloadTooLarge` → 413
/// - `NotFound` → 404
/// - `BadGateway` → 502
/// - `Internal` → 500
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or unsupported upload (400).
    BadRequest(String),
    /// Upload exceeds the size limit (413).
    PayloadTooLarge(String),
    /// No character identified; carries the best guess's confidence (404).
    NotFound { message: String, confidence: f32 },
    /// An external service failed (502).
    BadGateway(String),
    /// Unexpected server error (500).
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) | ApiError::PayloadTooLarge(_) => {
                ErrorKind::Validation.as_str()
            }
            ApiError::NotFound { .. } => ErrorKind::NotFound.as_str(),
            ApiError::BadGateway(_) => ErrorKind::Upstream.as_str(),
            ApiError::Internal(_) => ErrorKind::Internal.as_str(),
        }
    }

    /// Map a failure while reading multipart fields.
    pub fn from_multipart(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<RecognizeError> for ApiError {
    fn from(err: RecognizeError) -> Self {
        let message = err.to_string();
        match err {
            RecognizeError::FileTooLarge { .. } => ApiError::PayloadTooLarge(message),
            RecognizeError::Unidentified { confidence, .. } => ApiError::NotFound {
                message,
                confidence,
            },
            other => match other.kind() {
                ErrorKind::Validation => ApiError::BadRequest(message),
                ErrorKind::NotFound => ApiError::NotFound {
                    message,
                    confidence: 0.0,
                },
                ErrorKind::Upstream => ApiError::BadGateway(message),
                ErrorKind::Internal => ApiError::Internal(message),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), kind, "{self:?}");
        } else {
            tracing::debug!(status = status.as_u16(), kind, "{self:?}");
        }

        let body = match self {
            ApiError::NotFound {
                message,
                confidence,
            } => json!({ "detail": message, "kind": kind, "confidence": confidence }),
            ApiError::BadRequest(message)
            | ApiError::PayloadTooLarge(message)
            | ApiError::BadGateway(message)
            | ApiError::Internal(message) => json!({ "detail": message, "kind": kind }),
        };
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                RecognizeError::InvalidUpload("not an image".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                RecognizeError::FileTooLarge {
                    size_mb: 12,
                    max_mb: 10,
                },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                RecognizeError::Unidentified {
                    best_guess: "Anya Forger".into(),
                    confidence: 0.12,
                    threshold: 0.2,
                },
                StatusCode::NOT_FOUND,
            ),
            (
                RecognizeError::Upstream {
                    service: "gemini".into(),
                    message: "HTTP 429".into(),
                    status_code: Some(429),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                RecognizeError::Classification("label missing".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RecognizeError::Timeout {
                    stage: "decode".into(),
                    timeout_ms: 5000,
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_not_found_keeps_confidence() {
        let api_err = ApiError::from(RecognizeError::Unidentified {
            best_guess: "Anya Forger".into(),
            confidence: 0.12,
            threshold: 0.2,
        });
        assert_eq!(api_err.kind(), "not_found");
        assert!(matches!(
            api_err,
            ApiError::NotFound { confidence, .. } if (confidence - 0.12).abs() < 1e-6
        ));
    }
}
