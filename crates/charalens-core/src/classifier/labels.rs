//! Class index → character name mapping.
//!
//! Stored as a JSON object keyed by the stringified index:
//! `{"0": "Anya Forger", "1": "Asuka Langley", ...}`. Indices follow the
//! alphabetical order of the dataset's class folders, which is the order the
//! training loader assigns them.

use std::collections::BTreeMap;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{RecognizeError, RecognizeResult};

/// Ordered list of class names, indexed by class id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    names: Vec<String>,
}

impl LabelMap {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Load a label map from its JSON file.
    pub fn load(path: &Path) -> RecognizeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RecognizeError::Classification(format!("Cannot read label map {:?}: {e}", path))
        })?;
        Self::from_json(&content)
    }

    /// Parse the `{"index": "name"}` JSON form.
    ///
    /// Indices must be contiguous from 0.
    pub fn from_json(content: &str) -> RecognizeResult<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(content)
            .map_err(|e| RecognizeError::Classification(format!("Malformed label map: {e}")))?;

        let mut indexed = BTreeMap::new();
        for (key, name) in raw {
            let index: usize = key.parse().map_err(|_| {
                RecognizeError::Classification(format!("Label map key {key:?} is not an index"))
            })?;
            indexed.insert(index, name);
        }

        if indexed.keys().enumerate().any(|(position, &index)| position != index) {
            return Err(RecognizeError::Classification(
                "Label map indices are not contiguous from 0".to_string(),
            ));
        }

        let names: Vec<String> = indexed.into_values().collect();
        Ok(Self { names })
    }

    /// Build a label map from the class folders of a dataset directory.
    ///
    /// Only immediate subdirectories count; names are sorted alphabetically.
    pub fn from_dataset_dir(dir: &Path) -> RecognizeResult<Self> {
        if !dir.is_dir() {
            return Err(RecognizeError::Classification(format!(
                "Dataset directory {:?} was not found",
                dir
            )));
        }

        let mut names: Vec<String> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect();

        if names.is_empty() {
            return Err(RecognizeError::Classification(format!(
                "No class folders found in {:?}",
                dir
            )));
        }

        names.sort();
        Ok(Self { names })
    }

    /// Serialize to the `{"index": "name"}` JSON form, pretty-printed.
    pub fn to_json(&self) -> String {
        // serde_json::Map would order keys as strings ("10" before "2").
        let entries: Vec<String> = self
            .names
            .iter()
            .enumerate()
            .map(|(i, name)| format!("  \"{i}\": {}", serde_json::Value::from(name.as_str())))
            .collect();
        format!("{{\n{}\n}}", entries.join(",\n"))
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
