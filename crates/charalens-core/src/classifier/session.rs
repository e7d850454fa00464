//! ONNX Runtime session management for the exported classifier.

use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::{RecognizeError, RecognizeResult};

/// Wraps an ONNX Runtime session producing class logits.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`.
pub struct ClassifierSession {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl ClassifierSession {
    /// Load an exported classifier from an ONNX file.
    pub fn load(model_path: &Path) -> RecognizeResult<Self> {
        let session = Session::builder()
            .map_err(|e| {
                RecognizeError::Classification(format!(
                    "Failed to create ONNX session builder: {e}"
                ))
            })?
            .commit_from_file(model_path)
            .map_err(|e| {
                RecognizeError::Classification(format!(
                    "Failed to load ONNX model {:?}: {e}",
                    model_path
                ))
            })?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "input".to_string());
        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .unwrap_or_else(|| "output".to_string());

        tracing::debug!(
            "Loaded classifier from {:?} (input: {:?}, output: {:?})",
            model_path,
            input_name,
            output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }

    /// Run inference on a preprocessed `[1, 3, H, W]` tensor and return raw logits.
    pub fn logits(&self, preprocessed: &Array4<f32>) -> RecognizeResult<Vec<f32>> {
        let shape: Vec<i64> = preprocessed.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = preprocessed.iter().copied().collect();

        let input_value = Value::from_array((shape, flat_data)).map_err(|e| {
            RecognizeError::Classification(format!("Failed to create input tensor: {e}"))
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_value];

        let mut session = self.session.lock().map_err(|e| {
            RecognizeError::Classification(format!("Session lock poisoned: {e}"))
        })?;

        let outputs = session
            .run(inputs)
            .map_err(|e| RecognizeError::Classification(format!("ONNX inference failed: {e}")))?;

        let logits = outputs
            .iter()
            .find(|(name, _)| *name == self.output_name)
            .ok_or_else(|| {
                RecognizeError::Classification(format!(
                    "Model did not produce {:?}",
                    self.output_name
                ))
            })?;

        let (shape, data) = logits.1.try_extract_tensor::<f32>().map_err(|e| {
            RecognizeError::Classification(format!("Failed to extract logits tensor: {e}"))
        })?;

        match shape.len() {
            1 => Ok(data.to_vec()),
            2 => {
                let classes = shape[1] as usize;
                Ok(data[..classes].to_vec())
            }
            _ => Err(RecognizeError::Classification(format!(
                "Unexpected logits shape: {:?}",
                shape
            ))),
        }
    }
}
