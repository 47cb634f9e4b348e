//! Vocabulary-based token counter.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{FeatureVector, Vectorizer};
use crate::error::Result;

/// Token pattern used when the artifact does not specify one: words of two
/// or more word characters.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// On-disk form of a [`CountVectorizer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountVectorizerSpec {
    /// Vocabulary in feature-index order.
    pub vocabulary: Vec<String>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    /// Record presence (1.0) instead of occurrence counts.
    #[serde(default)]
    pub binary: bool,
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

/// Counts vocabulary terms matched by a token pattern.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    vocabulary: Vec<String>,
    index: HashMap<String, usize>,
    pattern: Regex,
    lowercase: bool,
    binary: bool,
}

impl CountVectorizer {
    /// Vectorizer over `vocabulary` with default settings.
    pub fn new<I, S>(vocabulary: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_spec(CountVectorizerSpec {
            vocabulary: vocabulary.into_iter().map(Into::into).collect(),
            lowercase: true,
            token_pattern: default_token_pattern(),
            binary: false,
        })
    }

    pub fn from_spec(spec: CountVectorizerSpec) -> anyhow::Result<Self> {
        let pattern = Regex::new(&spec.token_pattern)
            .map_err(|e| anyhow::anyhow!("invalid token_pattern: {e}"))?;

        let mut index = HashMap::with_capacity(spec.vocabulary.len());
        for (i, term) in spec.vocabulary.iter().enumerate() {
            if index.insert(term.clone(), i).is_some() {
                anyhow::bail!("duplicate vocabulary term '{term}'");
            }
        }

        Ok(Self {
            vocabulary: spec.vocabulary,
            index,
            pattern,
            lowercase: spec.lowercase,
            binary: spec.binary,
        })
    }

    /// Parse a JSON [`CountVectorizerSpec`].
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let spec: CountVectorizerSpec = serde_json::from_str(json)?;
        Self::from_spec(spec)
    }

    /// Index of `term` in the vocabulary.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.index.get(term).copied()
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }
}

impl Vectorizer for CountVectorizer {
    fn transform(&self, text: &str) -> Result<FeatureVector> {
        let text = if self.lowercase {
            std::borrow::Cow::Owned(text.to_lowercase())
        } else {
            std::borrow::Cow::Borrowed(text)
        };

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for m in self.pattern.find_iter(&text) {
            if let Some(&idx) = self.index.get(m.as_str()) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        if self.binary {
            counts.values_mut().for_each(|v| *v = 1.0);
        }

        Ok(FeatureVector::from_entries(self.vocabulary.len(), counts))
    }

    fn feature_names(&self) -> &[String] {
        &self.vocabulary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_counts() {
        let v = CountVectorizer::new(["free", "money", "meet"]).unwrap();
        let x = v.transform("free money free prize").unwrap();
        assert_eq!(x.dim(), 3);
        assert_eq!(x.iter().collect::<Vec<_>>(), vec![(0, 2.0), (1, 1.0)]);
    }

    #[test]
    fn test_single_char_tokens_ignored() {
        let v = CountVectorizer::new(["a", "ab"]).unwrap();
        let x = v.transform("a ab a").unwrap();
        assert_eq!(x.iter().collect::<Vec<_>>(), vec![(1, 1.0)]);
    }

    #[test]
    fn test_lowercase_and_binary() {
        let json = r#"{"vocabulary": ["free", "win"], "binary": true}"#;
        let v = CountVectorizer::from_json(json).unwrap();
        let x = v.transform("FREE free Win").unwrap();
        assert_eq!(x.iter().collect::<Vec<_>>(), vec![(0, 1.0), (1, 1.0)]);
    }

    #[test]
    fn test_case_sensitive_when_lowercase_disabled() {
        let json = r#"{"vocabulary": ["free"], "lowercase": false}"#;
        let v = CountVectorizer::from_json(json).unwrap();
        assert!(v.transform("FREE").unwrap().is_zero());
    }

    #[test]
    fn test_empty_text_gives_zero_vector() {
        let v = CountVectorizer::new(["free"]).unwrap();
        let x = v.transform("").unwrap();
        assert!(x.is_zero());
        assert_eq!(x.dim(), 1);
    }

    #[test]
    fn test_duplicate_vocabulary_rejected() {
        assert!(CountVectorizer::new(["free", "free"]).is_err());
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let json = r#"{"vocabulary": ["free"], "token_pattern": "("}"#;
        assert!(CountVectorizer::from_json(json).is_err());
    }

    #[test]
    fn test_feature_names_in_vocabulary_order() {
        let v = CountVectorizer::new(["zeta", "alpha"]).unwrap();
        assert_eq!(v.feature_names(), ["zeta", "alpha"]);
        assert_eq!(v.index_of("alpha"), Some(1));
    }
}
