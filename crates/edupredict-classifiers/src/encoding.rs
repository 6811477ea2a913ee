//! Categorical encoding against the bundle's fitted label encoders.
//!
//! A `LabelEncoder` is a fixed, ordered list of category labels; the code of a
//! label is its position in that list. Matching is exact and case-sensitive.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::bundle::ArtifactBundle;
use crate::error::{PredictionError, Result};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LabelEncoder {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Zero-based code of `raw`, or `None` when it was never seen in training.
    pub fn encode(&self, raw: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == raw)
    }

    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    /// Name of the first class label that appears twice, if any.
    pub(crate) fn first_duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::with_capacity(self.classes.len());
        self.classes
            .iter()
            .find(|c| !seen.insert(c.as_str()))
            .map(String::as_str)
    }
}

/// Encode one raw categorical value with the bundle's encoder for `feature`.
pub fn encode_categorical(bundle: &ArtifactBundle, feature: &str, raw: &str) -> Result<usize> {
    let encoder = bundle.categorical_encoder(feature).ok_or_else(|| {
        PredictionError::Schema(format!("bundle has no categorical encoder for '{}'", feature))
    })?;

    encoder
        .encode(raw)
        .ok_or_else(|| PredictionError::UnknownCategory {
            feature: feature.to_string(),
            value: raw.to_string(),
            expected: encoder.classes().to_vec(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_position_in_classes() {
        let enc = LabelEncoder::new(["divorced", "married", "single"]);
        assert_eq!(enc.encode("divorced"), Some(0));
        assert_eq!(enc.encode("single"), Some(2));
        assert_eq!(enc.decode(1), Some("married"));
        assert_eq!(enc.decode(3), None);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let enc = LabelEncoder::new(["female", "male"]);
        assert_eq!(enc.encode("Female"), None);
        assert_eq!(enc.encode(" female"), None);
    }

    #[test]
    fn finds_duplicate_labels() {
        assert_eq!(LabelEncoder::new(["a", "b", "a"]).first_duplicate(), Some("a"));
        assert_eq!(LabelEncoder::new(["a", "b"]).first_duplicate(), None);
    }

    #[test]
    fn deserializes_from_classes_list() {
        let enc: LabelEncoder =
            serde_json::from_str(r#"{"classes": ["Dropout", "Graduate"]}"#).unwrap();
        assert_eq!(enc.len(), 2);
        assert_eq!(enc.encode("Graduate"), Some(1));
    }
}
