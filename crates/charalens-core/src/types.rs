//! Core data types for the charalens recognition pipeline.
//!
//! The serialized field names of [`RecognitionResult`] are the wire contract
//! consumed by the web frontend.

use serde::{Deserialize, Serialize};

/// A character entry in the similarity catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// Display name; also the identity used for self-exclusion
    pub name: String,

    /// Title of the anime the character appears in
    pub anime: String,

    /// Appearance tags (e.g., "glasses", "red hair")
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CharacterRecord {
    pub fn new(name: impl Into<String>, anime: impl Into<String>, tags: &[&str]) -> Self {
        Self {
            name: name.into(),
            anime: anime.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// A catalog character ranked by tag distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarCharacter {
    pub name: String,
    pub anime: String,

    /// Jaccard distance in [0, 1]; lower is more similar
    pub distance: f64,

    /// Thumbnail URL, attached after ranking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// The classifier's top prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Character name from the label map
    pub character_name: String,

    /// Index of the predicted class
    pub class_index: usize,

    /// Softmax probability of the predicted class
    pub confidence: f32,
}

/// Biography and tags returned by the detail provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDetails {
    /// Canonical full name
    pub name: String,

    /// Short biography (2-3 sentences)
    #[serde(default)]
    pub about: String,

    /// Appearance tags used for similarity ranking
    #[serde(default)]
    pub tags: Vec<String>,

    /// Primary anime title
    #[serde(default)]
    pub anime_name: String,

    /// Legal streaming sites carrying the anime
    #[serde(default)]
    pub streaming_platforms: Vec<String>,

    /// Thumbnail URL, attached after the image lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// The complete output of a recognition request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// BLAKE3 hash of the uploaded bytes
    pub image_hash: String,

    /// The accepted classifier prediction
    pub prediction_result: Prediction,

    /// Enrichment from the detail provider; `None` on a soft failure
    pub character_details: Option<CharacterDetails>,

    /// Catalog characters most similar to the recognized one
    pub similar_characters: Vec<SimilarCharacter>,

    /// Reason enrichment was skipped, if it was
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_record_missing_tags_defaults_empty() {
        let record: CharacterRecord =
            serde_json::from_str(r#"{"name": "Anya Forger", "anime": "Spy x Family"}"#).unwrap();
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_similar_character_skips_missing_image() {
        let similar = SimilarCharacter {
            name: "Yor Forger".to_string(),
            anime: "Spy x Family".to_string(),
            distance: 0.5,
            image_url: None,
        };
        let json = serde_json::to_string(&similar).unwrap();
        assert!(!json.contains("image_url"));
    }

    #[test]
    fn test_recognition_result_wire_names() {
        let result = RecognitionResult {
            image_hash: "abc123".to_string(),
            prediction_result: Prediction {
                character_name: "Anya Forger".to_string(),
                class_index: 3,
                confidence: 0.91,
            },
            character_details: None,
            similar_characters: vec![],
            enrichment_error: Some("unknown character".to_string()),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["prediction_result"]["character_name"], "Anya Forger");
        assert!(json["character_details"].is_null());
        assert_eq!(json["enrichment_error"], "unknown character");
    }
}
