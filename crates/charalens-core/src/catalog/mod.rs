//! Static character catalog and tag-similarity ranking.
//!
//! The catalog is a JSON array of `{name, anime, tags}` records loaded once at
//! startup. It is deliberately forgiving: a missing or malformed file yields an
//! empty catalog, and ranking against it returns no results.
//!
//! ```text
//! predicted tags ──┐
//!                  ├─ Jaccard distance per record ─ stable sort ─ top N
//! catalog records ─┘   (self excluded, case-insensitive)
//! ```

pub mod similarity;

use std::path::Path;

use crate::types::{CharacterRecord, SimilarCharacter};

use self::similarity::{jaccard_distance, tag_set, TagVocabulary};

/// Read-only collection of characters used for similarity ranking.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<CharacterRecord>,
    vocabulary: TagVocabulary,
}

impl Catalog {
    /// Build a catalog from in-memory records.
    pub fn from_records(records: Vec<CharacterRecord>) -> Self {
        let vocabulary = TagVocabulary::from_records(&records);
        Self {
            records,
            vocabulary,
        }
    }

    /// Load the catalog from a JSON file.
    ///
    /// Never fails: a missing or unparseable file is logged and treated as an
    /// empty catalog.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Catalog {:?} not readable ({e}), similarity disabled", path);
                return Self::default();
            }
        };

        match serde_json::from_str::<Vec<CharacterRecord>>(&content) {
            Ok(records) => {
                tracing::info!("Loaded {} catalog characters from {:?}", records.len(), path);
                Self::from_records(records)
            }
            Err(e) => {
                tracing::warn!("Catalog {:?} is malformed ({e}), similarity disabled", path);
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CharacterRecord] {
        &self.records
    }

    /// All distinct tags across the catalog, sorted.
    pub fn vocabulary(&self) -> &TagVocabulary {
        &self.vocabulary
    }

    /// Rank catalog characters by tag distance to a predicted character.
    ///
    /// Records whose name equals `predicted_name` (case-insensitively) are
    /// skipped. Results are sorted ascending by distance; ties keep catalog
    /// order. At most `top_n` results are returned.
    pub fn rank_similar(
        &self,
        predicted_name: &str,
        predicted_tags: &[String],
        top_n: usize,
    ) -> Vec<SimilarCharacter> {
        let predicted_key = predicted_name.to_lowercase();
        let predicted_set = tag_set(predicted_tags);

        let mut ranked: Vec<SimilarCharacter> = self
            .records
            .iter()
            .filter(|record| record.name.to_lowercase() != predicted_key)
            .map(|record| SimilarCharacter {
                name: record.name.clone(),
                anime: record.anime.clone(),
                distance: jaccard_distance(&predicted_set, &tag_set(&record.tags)),
                image_url: None,
            })
            .collect();

        ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        ranked.truncate(top_n);

        tracing::debug!(
            "Ranked {} of {} catalog characters against {:?}",
            ranked.len(),
            self.records.len(),
            predicted_name
        );
        ranked
    }
}
