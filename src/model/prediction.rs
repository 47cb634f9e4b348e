//! Prediction results returned to the caller.

use serde::{Deserialize, Serialize};

use crate::classifier::artifacts::ArtifactInfo;
use crate::text::Token;

/// Final classification of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Spam,
    Ham,
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spam => f.pad("Spam"),
            Self::Ham => f.pad("Ham"),
        }
    }
}

/// How much a single word pushed the decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    /// Vocabulary entry.
    pub word: String,
    /// Signed model coefficient; positive leans towards the positive class.
    pub weight: f64,
    /// Magnitude of the feature in the vectorized message.
    pub count: f64,
}

impl FeatureWeight {
    /// `|weight * count|`, the quantity features are ranked by.
    pub fn contribution(&self) -> f64 {
        (self.weight * self.count).abs()
    }
}

/// Class probabilities. The two values always sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probability {
    pub spam: f64,
    pub ham: f64,
}

/// Previews of the parsed token streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedContent {
    /// First tokens of the subject line.
    pub subject_tokens: Vec<Token>,
    /// First tokens of the body.
    pub body_tokens_preview: Vec<Token>,
    /// Top-level content type of the message.
    pub content_type: String,
}

/// Everything the caller gets back for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: Label,
    pub probability: Probability,
    /// First tokens of the combined subject + body stream.
    pub tokens: Vec<Token>,
    pub total_tokens: usize,
    /// Ranked explanation, strongest contribution first.
    pub feature_weights: Vec<FeatureWeight>,
    pub parsed_content: ParsedContent,
}

impl PredictionResult {
    pub fn is_spam(&self) -> bool {
        self.prediction == Label::Spam
    }
}

/// Liveness report for the classifier service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub models_loaded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub artifacts: Vec<ArtifactInfo>,
}
