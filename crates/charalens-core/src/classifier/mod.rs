//! Character classification from decoded images.
//!
//! The production classifier is a fine-tuned EfficientNet exported to ONNX and
//! run locally through ONNX Runtime. The orchestrator only sees the
//! [`CharacterClassifier`] trait, so tests can substitute a fixed prediction.
//!
//! ```rust,ignore
//! use charalens_core::classifier::{CharacterClassifier, OnnxClassifier};
//!
//! let classifier = OnnxClassifier::load(&config.classifier, &config.model_path(), &config.labels_path())?;
//! let prediction = classifier.classify(&decoded.image)?;
//! ```

pub mod labels;
pub(crate) mod preprocess;
pub(crate) mod session;

use std::path::Path;

use image::DynamicImage;

use crate::config::ClassifierConfig;
use crate::error::{RecognizeError, RecognizeResult};
use crate::math::{argmax, softmax};
use crate::types::Prediction;

pub use self::labels::LabelMap;
use self::preprocess::preprocess;
use self::session::ClassifierSession;

/// Anything that can name the character in an image.
///
/// Implementations are CPU-bound and synchronous; callers run them on the
/// blocking pool.
pub trait CharacterClassifier: Send + Sync {
    /// Return the most likely character and its probability.
    fn classify(&self, image: &DynamicImage) -> RecognizeResult<Prediction>;

    /// Number of classes the model distinguishes.
    fn num_classes(&self) -> usize;
}

/// ONNX Runtime classifier with its label map.
pub struct OnnxClassifier {
    session: ClassifierSession,
    labels: LabelMap,
    resize_size: u32,
    image_size: u32,
}

impl OnnxClassifier {
    /// Load the model weights and label map.
    pub fn load(
        config: &ClassifierConfig,
        model_path: &Path,
        labels_path: &Path,
    ) -> RecognizeResult<Self> {
        if !model_path.exists() {
            return Err(RecognizeError::Classification(format!(
                "Model not found at {:?}. Export the trained classifier to ONNX first.",
                model_path
            )));
        }

        let labels = LabelMap::load(labels_path)?;
        if labels.is_empty() {
            return Err(RecognizeError::Classification(format!(
                "Label map {:?} is empty",
                labels_path
            )));
        }

        tracing::info!("Loading classifier from {:?}", model_path);
        let session = ClassifierSession::load(model_path)?;
        tracing::info!("Classifier loaded with {} classes", labels.len());

        Ok(Self {
            session,
            labels,
            resize_size: config.resize_size,
            image_size: config.image_size,
        })
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }
}

impl CharacterClassifier for OnnxClassifier {
    fn classify(&self, image: &DynamicImage) -> RecognizeResult<Prediction> {
        let tensor = preprocess(image, self.resize_size, self.image_size);
        let logits = self.session.logits(&tensor)?;
        prediction_from_logits(&logits, &self.labels)
    }

    fn num_classes(&self) -> usize {
        self.labels.len()
    }
}

/// Turn raw logits into the top prediction.
pub(crate) fn prediction_from_logits(
    logits: &[f32],
    labels: &LabelMap,
) -> RecognizeResult<Prediction> {
    if logits.len() != labels.len() {
        return Err(RecognizeError::Classification(format!(
            "Model produced {} logits but the label map has {} classes",
            logits.len(),
            labels.len()
        )));
    }

    let probabilities = softmax(logits);
    let (class_index, confidence) = argmax(&probabilities)
        .ok_or_else(|| RecognizeError::Classification("Model produced no logits".to_string()))?;

    let character_name = labels
        .get(class_index)
        .ok_or_else(|| {
            RecognizeError::Classification(format!("Class index {class_index} has no label"))
        })?
        .to_string();

    Ok(Prediction {
        character_name,
        class_index,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> LabelMap {
        LabelMap::new(vec![
            "Anya Forger".to_string(),
            "Loid Forger".to_string(),
            "Yor Forger".to_string(),
        ])
    }

    #[test]
    fn test_prediction_from_logits() {
        let prediction = prediction_from_logits(&[0.1, 4.0, 0.2], &labels()).unwrap();
        assert_eq!(prediction.character_name, "Loid Forger");
        assert_eq!(prediction.class_index, 1);
        assert!(prediction.confidence > 0.9);
    }

    #[test]
    fn test_uniform_logits_low_confidence() {
        let prediction = prediction_from_logits(&[1.0, 1.0, 1.0], &labels()).unwrap();
        assert_eq!(prediction.class_index, 0);
        assert!((prediction.confidence - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_label_count_mismatch() {
        let err = prediction_from_logits(&[1.0, 2.0], &labels()).unwrap_err();
        assert!(err.to_string().contains("label map has 3 classes"));
    }

    #[test]
    fn test_load_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let result = OnnxClassifier::load(
            &ClassifierConfig::default(),
            &dir.path().join("missing.onnx"),
            &dir.path().join("class_names.json"),
        );
        assert!(matches!(result, Err(RecognizeError::Classification(_))));
    }
}
