//! Categorical label encoding for the ad approach feature

use crate::error::{Result, RoiError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Policy deciding which integer code each distinct label receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeOrder {
    /// Codes follow the sorted order of the labels
    #[default]
    Lexicographic,
    /// Codes follow the order in which labels first appear
    FirstSeen,
}

/// Bidirectional mapping between a fixed set of labels and codes in `[0, N)`.
///
/// Built once from training data and immutable afterwards. The same encoder
/// must be handed to both training and inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EncoderTable", into = "EncoderTable")]
pub struct CategoryEncoder {
    labels: Vec<String>,
    codes: HashMap<String, usize>,
}

/// Serialized form: only the ordered label table is persisted
#[derive(Serialize, Deserialize)]
struct EncoderTable {
    labels: Vec<String>,
}

impl From<EncoderTable> for CategoryEncoder {
    fn from(table: EncoderTable) -> Self {
        Self::from_ordered(table.labels)
    }
}

impl From<CategoryEncoder> for EncoderTable {
    fn from(encoder: CategoryEncoder) -> Self {
        Self {
            labels: encoder.labels,
        }
    }
}

impl CategoryEncoder {
    /// Fit an encoder on the given labels
    pub fn fit<I, S>(labels: I, order: CodeOrder) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut distinct: Vec<String> = Vec::new();
        for label in labels {
            let label = label.as_ref();
            if !distinct.iter().any(|known| known == label) {
                distinct.push(label.to_string());
            }
        }

        if distinct.is_empty() {
            return Err(RoiError::InsufficientData(
                "Cannot fit a category encoder without labels".to_string(),
            ));
        }

        if order == CodeOrder::Lexicographic {
            distinct.sort();
        }

        Ok(Self::from_ordered(distinct))
    }

    fn from_ordered(labels: Vec<String>) -> Self {
        let codes = labels
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code))
            .collect();

        Self { labels, codes }
    }

    /// Code assigned to `label`
    pub fn encode(&self, label: &str) -> Result<usize> {
        self.codes
            .get(label)
            .copied()
            .ok_or_else(|| RoiError::UnknownCategory(label.to_string()))
    }

    /// Label assigned to `code`, if any
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }

    /// Whether `label` was seen at fit time
    pub fn contains(&self, label: &str) -> bool {
        self.codes.contains_key(label)
    }

    /// Known labels, indexed by code
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of known labels
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a fitted encoder
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
