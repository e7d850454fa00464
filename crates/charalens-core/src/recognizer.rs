//! Recognition orchestration: wires together every stage of a request.
//!
//! ```text
//! upload → validate → decode → classify ─┬─ below threshold → Unidentified
//!                                        └─ details → rank catalog → images → result
//! ```
//!
//! A [`Recognizer`] is built once at startup and shared read-only.

use std::sync::Arc;
use std::time::{Duration, Instant};

use image::DynamicImage;
use tokio::time::timeout;

use crate::catalog::Catalog;
use crate::classifier::{CharacterClassifier, OnnxClassifier};
use crate::config::Config;
use crate::details::{DetailOutcome, DetailService};
use crate::error::{RecognizeError, RecognizeResult, Result};
use crate::images::{create_lookup, ImageLookup, PacedLookup};
use crate::pipeline::{content_hash, ImageDecoder, Validator};
use crate::types::{Prediction, RecognitionResult, SimilarCharacter};

/// The recognition service and its collaborators.
pub struct Recognizer {
    classifier: Arc<dyn CharacterClassifier>,
    details: DetailService,
    catalog: Catalog,
    images: PacedLookup,
    validator: Validator,
    decoder: ImageDecoder,
    confidence_threshold: f32,
    top_n: usize,
    classify_timeout_ms: u64,
}

impl Recognizer {
    /// Assemble a recognizer from already-built collaborators.
    pub fn new(
        config: &Config,
        classifier: Arc<dyn CharacterClassifier>,
        details: DetailService,
        catalog: Catalog,
        images: PacedLookup,
    ) -> Self {
        Self {
            classifier,
            details,
            catalog,
            images,
            validator: Validator::new(config.limits.clone()),
            decoder: ImageDecoder::new(config.limits.clone()),
            confidence_threshold: config.classifier.confidence_threshold,
            top_n: config.catalog.top_n,
            classify_timeout_ms: config.limits.classify_timeout_ms,
        }
    }

    /// Load the model, label map and catalog from disk and build the
    /// configured providers.
    pub fn from_config(config: &Config) -> Result<Self> {
        let classifier = OnnxClassifier::load(
            &config.classifier,
            &config.model_path(),
            &config.labels_path(),
        )?;
        let details = DetailService::from_config(config)?;
        let catalog = Catalog::load(&config.catalog_path());
        let images = create_lookup(config)?;

        tracing::info!(
            classes = classifier.num_classes(),
            catalog = catalog.len(),
            details = details.provider_name(),
            images = images.name(),
            "Recognizer ready"
        );

        Ok(Self::new(
            config,
            Arc::new(classifier),
            details,
            catalog,
            images,
        ))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    pub fn num_classes(&self) -> usize {
        self.classifier.num_classes()
    }

    /// Run the full recognition flow on an uploaded image.
    ///
    /// `content_type` is the MIME type the client declared, if any.
    pub async fn recognize(
        &self,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> RecognizeResult<RecognitionResult> {
        let start = Instant::now();

        self.validator.validate(&bytes, content_type)?;
        let image_hash = content_hash(&bytes);

        let decode_start = Instant::now();
        let decoded = self.decoder.decode_from_bytes(bytes).await?;
        tracing::trace!(
            "  Decode: {:?} ({}x{})",
            decode_start.elapsed(),
            decoded.width,
            decoded.height
        );

        let classify_start = Instant::now();
        let prediction = self.classify(decoded.image).await?;
        tracing::trace!("  Classify: {:?}", classify_start.elapsed());

        if prediction.confidence < self.confidence_threshold {
            tracing::info!(
                "Low confidence for {:?}: {:.3} < {:.2}",
                prediction.character_name,
                prediction.confidence,
                self.confidence_threshold
            );
            return Err(RecognizeError::Unidentified {
                best_guess: prediction.character_name,
                confidence: prediction.confidence,
                threshold: self.confidence_threshold,
            });
        }

        let details_start = Instant::now();
        let outcome = self.details.lookup(&prediction.character_name).await?;
        tracing::trace!("  Details: {:?}", details_start.elapsed());

        let mut details = match outcome {
            DetailOutcome::Found(details) => details,
            DetailOutcome::SoftError(reason) => {
                tracing::warn!(
                    "No details for {:?}: {reason}",
                    prediction.character_name
                );
                return Ok(RecognitionResult {
                    image_hash,
                    prediction_result: prediction,
                    character_details: None,
                    similar_characters: vec![],
                    enrichment_error: Some(reason),
                });
            }
        };

        let mut similar = self
            .catalog
            .rank_similar(&details.name, &details.tags, self.top_n);

        let images_start = Instant::now();
        details.image_url = self.images.image_url_or_none(&details.name).await;
        self.attach_images(&mut similar).await;
        tracing::trace!("  Images: {:?}", images_start.elapsed());

        tracing::debug!(
            "Recognized {:?} ({:.3}) in {:?}",
            details.name,
            prediction.confidence,
            start.elapsed()
        );

        Ok(RecognitionResult {
            image_hash,
            prediction_result: prediction,
            character_details: Some(details),
            similar_characters: similar,
            enrichment_error: None,
        })
    }

    /// Fill in thumbnails one at a time, paced. Failures leave `image_url` empty.
    pub async fn attach_images(&self, similar: &mut [SimilarCharacter]) {
        for character in similar.iter_mut() {
            character.image_url = self.images.image_url_or_none(&character.name).await;
        }
    }

    /// Classify on the blocking pool, bounded by the classify timeout.
    async fn classify(&self, image: DynamicImage) -> RecognizeResult<Prediction> {
        let classifier = Arc::clone(&self.classifier);
        let timeout_duration = Duration::from_millis(self.classify_timeout_ms);

        let result = timeout(
            timeout_duration,
            tokio::task::spawn_blocking(move || classifier.classify(&image)),
        )
        .await;

        match result {
            Ok(Ok(prediction)) => prediction,
            Ok(Err(e)) => Err(RecognizeError::Classification(format!(
                "Task join error: {e}"
            ))),
            Err(_) => Err(RecognizeError::Timeout {
                stage: "classify".to_string(),
                timeout_ms: self.classify_timeout_ms,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::details::{LlmProvider, LlmRequest, LlmResponse};
    use crate::error::ErrorKind;
    use crate::types::CharacterRecord;
    use async_trait::async_trait;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedClassifier {
        prediction: Prediction,
        calls: Arc<AtomicUsize>,
    }

    impl CharacterClassifier for FixedClassifier {
        fn classify(&self, _image: &DynamicImage) -> RecognizeResult<Prediction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.prediction.clone())
        }

        fn num_classes(&self) -> usize {
            3
        }
    }

    struct CannedProvider {
        reply: std::result::Result<String, String>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, _request: &LlmRequest) -> RecognizeResult<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(LlmResponse {
                    text: text.clone(),
                    model: "canned-1".to_string(),
                    tokens_used: Some(10),
                    latency_ms: 1,
                }),
                Err(message) => Err(RecognizeError::Upstream {
                    service: "canned".to_string(),
                    message: message.clone(),
                    status_code: Some(429),
                }),
            }
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
    }

    struct StubLookup {
        calls: Arc<AtomicUsize>,
        fail_for: Option<&'static str>,
    }

    #[async_trait]
    impl ImageLookup for StubLookup {
        fn name(&self) -> &str {
            "stub"
        }

        async fn image_url(&self, character_name: &str) -> RecognizeResult<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_for == Some(character_name) {
                return Err(RecognizeError::upstream("stub", "HTTP 500"));
            }
            Ok(Some(format!("https://img.example/{}.jpg", character_name.replace(' ', "_"))))
        }
    }

    const ANYA_DETAILS: &str = r#"```json
{
    "name": "Anya Forger",
    "about": "A telepathic girl adopted by a spy.",
    "tags": ["pink hair", "green eyes", "child"],
    "anime_name": "Spy x Family",
    "streaming_platforms": ["Crunchyroll", "Netflix"]
}
```"#;

    #[derive(Default)]
    struct Counters {
        classify: Arc<AtomicUsize>,
        details: Arc<AtomicUsize>,
        images: Arc<AtomicUsize>,
    }

    struct Setup {
        confidence: f32,
        reply: std::result::Result<String, String>,
        fail_image_for: Option<&'static str>,
    }

    impl Default for Setup {
        fn default() -> Self {
            Self {
                confidence: 0.93,
                reply: Ok(ANYA_DETAILS.to_string()),
                fail_image_for: None,
            }
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_records(vec![
            CharacterRecord::new("Anya Forger", "Spy x Family", &["pink hair", "green eyes", "child"]),
            CharacterRecord::new("Bond Forger", "Spy x Family", &["dog", "white fur"]),
            CharacterRecord::new("Madoka Kaname", "Madoka Magica", &["pink hair", "child", "ribbons"]),
            CharacterRecord::new("Levi Ackerman", "Attack on Titan", &["black hair", "short"]),
        ])
    }

    fn recognizer(setup: Setup) -> (Recognizer, Counters) {
        let counters = Counters::default();
        let classifier = FixedClassifier {
            prediction: Prediction {
                character_name: "Anya Forger".to_string(),
                class_index: 0,
                confidence: setup.confidence,
            },
            calls: counters.classify.clone(),
        };
        let provider = CannedProvider {
            reply: setup.reply,
            calls: counters.details.clone(),
        };
        let lookup = StubLookup {
            calls: counters.images.clone(),
            fail_for: setup.fail_image_for,
        };

        let mut config = Config::default();
        config.catalog.top_n = 2;

        let recognizer = Recognizer::new(
            &config,
            Arc::new(classifier),
            DetailService::new(Box::new(provider)),
            catalog(),
            PacedLookup::new(Box::new(lookup), Duration::ZERO),
        );
        (recognizer, counters)
    }

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(48, 48, Rgb([250, 180, 200])));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_recognize_full_flow() {
        let (recognizer, counters) = recognizer(Setup::default());
        let result = recognizer
            .recognize(png_bytes(), Some("image/png"))
            .await
            .unwrap();

        assert_eq!(result.prediction_result.character_name, "Anya Forger");
        assert_eq!(result.image_hash.len(), 64);

        let details = result.character_details.unwrap();
        assert_eq!(details.anime_name, "Spy x Family");
        assert_eq!(
            details.image_url.as_deref(),
            Some("https://img.example/Anya_Forger.jpg")
        );

        let names: Vec<&str> = result
            .similar_characters
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Madoka Kaname", "Bond Forger"]);
        assert!(result
            .similar_characters
            .iter()
            .all(|s| s.image_url.is_some()));
        assert!(result.enrichment_error.is_none());

        assert_eq!(counters.classify.load(Ordering::SeqCst), 1);
        assert_eq!(counters.details.load(Ordering::SeqCst), 1);
        assert_eq!(counters.images.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_low_confidence_skips_enrichment() {
        let (recognizer, counters) = recognizer(Setup {
            confidence: 0.10,
            ..Setup::default()
        });
        let err = recognizer
            .recognize(png_bytes(), Some("image/png"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(matches!(
            err,
            RecognizeError::Unidentified { confidence, .. } if (confidence - 0.10).abs() < 1e-6
        ));
        assert_eq!(counters.details.load(Ordering::SeqCst), 0);
        assert_eq!(counters.images.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let (recognizer, _) = recognizer(Setup {
            confidence: 0.20,
            ..Setup::default()
        });
        assert!(recognizer
            .recognize(png_bytes(), Some("image/png"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_soft_error_returns_prediction_only() {
        let (recognizer, counters) = recognizer(Setup {
            reply: Ok(r#"{"error": "Character not recognized"}"#.to_string()),
            ..Setup::default()
        });
        let result = recognizer
            .recognize(png_bytes(), Some("image/png"))
            .await
            .unwrap();

        assert!(result.character_details.is_none());
        assert!(result.similar_characters.is_empty());
        assert_eq!(
            result.enrichment_error.as_deref(),
            Some("Character not recognized")
        );
        assert_eq!(counters.images.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_fails_request() {
        let (recognizer, counters) = recognizer(Setup {
            reply: Err("quota exceeded".to_string()),
            ..Setup::default()
        });
        let err = recognizer
            .recognize(png_bytes(), Some("image/png"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(matches!(
            err,
            RecognizeError::Upstream {
                status_code: Some(429),
                ..
            }
        ));
        assert_eq!(counters.images.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_image_lookup_failure_is_not_fatal() {
        let (recognizer, _) = recognizer(Setup {
            fail_image_for: Some("Madoka Kaname"),
            ..Setup::default()
        });
        let result = recognizer
            .recognize(png_bytes(), Some("image/png"))
            .await
            .unwrap();

        let madoka = &result.similar_characters[0];
        assert_eq!(madoka.name, "Madoka Kaname");
        assert!(madoka.image_url.is_none());
        assert!(result.character_details.unwrap().image_url.is_some());
    }

    #[tokio::test]
    async fn test_non_image_rejected_before_classification() {
        let (recognizer, counters) = recognizer(Setup::default());
        let err = recognizer
            .recognize(b"name,anime\n".to_vec(), Some("text/csv"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(counters.classify.load(Ordering::SeqCst), 0);
    }
}
