//! Tag set and tag vector representations, and the Jaccard distance over both.
//!
//! Tags are case-sensitive tokens. The set form collapses duplicates; the
//! vector form is a binary indicator over a sorted vocabulary. Both forms give
//! the same distance for tags that are in the vocabulary.

use std::collections::{BTreeSet, HashSet};

use crate::types::CharacterRecord;

/// A set of tags borrowed from a character's tag list.
pub type TagSet<'a> = HashSet<&'a str>;

/// Build the set form of a tag list.
pub fn tag_set(tags: &[String]) -> TagSet<'_> {
    tags.iter().map(String::as_str).collect()
}

/// Jaccard distance `1 - |A ∩ B| / |A ∪ B|`.
///
/// Two empty sets are identical (distance 0).
pub fn jaccard_distance(a: &TagSet<'_>, b: &TagSet<'_>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    1.0 - intersection as f64 / union as f64
}

/// Sorted, deduplicated list of every tag seen in a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagVocabulary {
    terms: Vec<String>,
}

impl TagVocabulary {
    /// Collect the vocabulary of a set of character records.
    pub fn from_records(records: &[CharacterRecord]) -> Self {
        let terms: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.tags.iter().map(String::as_str))
            .collect();
        Self {
            terms: terms.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Binary indicator vector: entry `i` is 1 when `terms[i]` is in `tags`.
    ///
    /// Tags outside the vocabulary are ignored.
    pub fn vectorize(&self, tags: &[String]) -> Vec<u8> {
        let mut vector = vec![0u8; self.terms.len()];
        for tag in tags {
            if let Ok(idx) = self.terms.binary_search(tag) {
                vector[idx] = 1;
            }
        }
        vector
    }
}

/// Jaccard distance between two indicator vectors of the same vocabulary.
pub fn jaccard_distance_vectors(a: &[u8], b: &[u8]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let mut intersection = 0usize;
    let mut union = 0usize;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x != 0, y != 0);
        if x && y {
            intersection += 1;
        }
        if x || y {
            union += 1;
        }
    }
    if union == 0 {
        return 0.0;
    }
    1.0 - intersection as f64 / union as f64
}
