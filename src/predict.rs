//! Prediction orchestration: parse → tokenize → vectorize → classify → explain.

use std::path::Path;

use tracing::{debug, error};

use crate::classifier::{artifacts, rank, ArtifactInfo, Classifier, Vectorizer, DEFAULT_TOP_N};
use crate::config::{self, Config};
use crate::error::{Result, SpamError};
use crate::model::email::ParsedEmail;
use crate::model::prediction::{
    HealthStatus, Label, ParsedContent, PredictionResult, Probability,
};
use crate::parser::EmailParser;

/// Tokens of the combined stream included in a result.
pub const TOKEN_PREVIEW_LIMIT: usize = 50;
/// Subject tokens included in a result.
pub const SUBJECT_PREVIEW_LIMIT: usize = 20;
/// Body tokens included in a result.
pub const BODY_PREVIEW_LIMIT: usize = 30;

const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Options that shape a prediction result.
#[derive(Debug, Clone)]
pub struct PredictOptions {
    /// Model label that maps to [`Label::Spam`], compared case-sensitively.
    pub positive_label: String,
    /// Length of the feature explanation.
    pub top_features: usize,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            positive_label: "spam".to_string(),
            top_features: DEFAULT_TOP_N,
        }
    }
}

/// Long-lived classification service.
///
/// Built once at startup; every field is read-only afterwards, so a single
/// instance can serve concurrent requests behind an `Arc`.
pub struct Predictor {
    parser: EmailParser,
    vectorizer: Option<Box<dyn Vectorizer>>,
    model: Option<Box<dyn Classifier>>,
    artifacts: Vec<ArtifactInfo>,
    options: PredictOptions,
}

impl Predictor {
    /// A predictor with no model loaded yet.
    pub fn new(parser: EmailParser, options: PredictOptions) -> Self {
        Self {
            parser,
            vectorizer: None,
            model: None,
            artifacts: Vec::new(),
            options,
        }
    }

    pub fn with_vectorizer(mut self, vectorizer: impl Vectorizer + 'static) -> Self {
        self.vectorizer = Some(Box::new(vectorizer));
        self
    }

    pub fn with_model(mut self, model: impl Classifier + 'static) -> Self {
        self.model = Some(Box::new(model));
        self
    }

    /// Build the service from configuration, loading artifacts eagerly.
    ///
    /// Artifact failures are logged and leave the predictor without a model,
    /// so `health` reports it and `predict` returns
    /// [`SpamError::UnavailableModel`].
    pub fn from_config(config: &Config) -> Self {
        Self::from_config_with_paths(
            config,
            &config::vectorizer_path(config),
            &config::model_path(config),
        )
    }

    /// Like [`Predictor::from_config`] with explicit artifact paths.
    pub fn from_config_with_paths(config: &Config, vectorizer_path: &Path, model_path: &Path) -> Self {
        let parser = EmailParser::from_config(config);
        let options = PredictOptions {
            positive_label: config.classifier.positive_label.clone(),
            top_features: config.classifier.top_features,
        };
        let predictor = Self::new(parser, options);

        match artifacts::load(vectorizer_path, model_path, &config.classifier.positive_label) {
            Ok(loaded) => {
                let mut predictor = predictor
                    .with_vectorizer(loaded.vectorizer)
                    .with_model(loaded.model);
                predictor.artifacts = loaded.info;
                predictor
            }
            Err(e) => {
                error!(error = %e, "Failed to load model artifacts");
                predictor
            }
        }
    }

    pub fn options(&self) -> &PredictOptions {
        &self.options
    }

    /// True when both the vectorizer and the model are available.
    pub fn models_loaded(&self) -> bool {
        self.vectorizer.is_some() && self.model.is_some()
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            models_loaded: self.models_loaded(),
            artifacts: self.artifacts.clone(),
        }
    }

    /// Classify a raw message and explain the decision.
    pub fn predict(&self, raw: &str) -> Result<PredictionResult> {
        // Check availability before doing any parsing work.
        self.engine()?;
        let parsed = self.parser.parse(raw)?;
        self.predict_parsed(&parsed)
    }

    /// Classify an already parsed message.
    ///
    /// An empty token stream is still classified; the explanation is then empty.
    pub fn predict_parsed(&self, parsed: &ParsedEmail) -> Result<PredictionResult> {
        let (vectorizer, model) = self.engine()?;

        let features = vectorizer.transform(&parsed.joined_text())?;
        debug!(
            tokens = parsed.all_tokens().len(),
            nonzero = features.nnz(),
            "Vectorized message"
        );

        let label = model.predict(&features)?;
        let prediction = if label == self.options.positive_label {
            Label::Spam
        } else {
            Label::Ham
        };
        let probability = self.probability(model, &model.predict_proba(&features)?)?;

        let coefficients = model.coefficients();
        let feature_names = vectorizer.feature_names();
        if coefficients.len() != feature_names.len() {
            return Err(SpamError::Processing(format!(
                "model has {} coefficients but the vectorizer has {} features",
                coefficients.len(),
                feature_names.len()
            )));
        }
        let feature_weights = rank(
            &features,
            coefficients,
            feature_names,
            self.options.top_features,
        );

        debug!(
            prediction = %prediction,
            spam = probability.spam,
            explained = feature_weights.len(),
            "Prediction complete"
        );

        Ok(PredictionResult {
            prediction,
            probability,
            tokens: preview(parsed.all_tokens(), TOKEN_PREVIEW_LIMIT),
            total_tokens: parsed.all_tokens().len(),
            feature_weights,
            parsed_content: ParsedContent {
                subject_tokens: preview(parsed.subject_tokens(), SUBJECT_PREVIEW_LIMIT),
                body_tokens_preview: preview(parsed.body_tokens(), BODY_PREVIEW_LIMIT),
                content_type: parsed.content_type().to_string(),
            },
        })
    }

    fn engine(&self) -> Result<(&dyn Vectorizer, &dyn Classifier)> {
        match (&self.vectorizer, &self.model) {
            (Some(v), Some(m)) => Ok((v.as_ref(), m.as_ref())),
            (None, _) => {
                error!("Prediction requested but the vectorizer is not loaded");
                Err(SpamError::UnavailableModel("vectorizer not loaded".into()))
            }
            (_, None) => {
                error!("Prediction requested but the model is not loaded");
                Err(SpamError::UnavailableModel("model not loaded".into()))
            }
        }
    }

    /// Map class probabilities onto spam/ham using the positive label's position.
    fn probability(&self, model: &dyn Classifier, proba: &[f64; 2]) -> Result<Probability> {
        let classes = model.classes();
        if classes.len() != 2 {
            return Err(SpamError::Processing(format!(
                "expected a binary model, got classes {classes:?}"
            )));
        }
        let spam_idx = classes
            .iter()
            .position(|c| *c == self.options.positive_label)
            .ok_or_else(|| {
                SpamError::Processing(format!(
                    "positive label '{}' is not a model class",
                    self.options.positive_label
                ))
            })?;

        let spam = proba[spam_idx];
        let ham = proba[1 - spam_idx];
        let sum = spam + ham;
        if !sum.is_finite() || sum <= 0.0 || spam < 0.0 || ham < 0.0 {
            return Err(SpamError::Processing(format!(
                "model returned invalid probabilities {proba:?}"
            )));
        }

        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            debug!(sum, "Normalizing class probabilities");
            return Ok(Probability {
                spam: spam / sum,
                ham: ham / sum,
            });
        }
        Ok(Probability { spam, ham })
    }
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("parser", &self.parser)
            .field("models_loaded", &self.models_loaded())
            .field("options", &self.options)
            .finish()
    }
}

fn preview(tokens: &[String], limit: usize) -> Vec<String> {
    tokens.iter().take(limit).cloned().collect()
}
