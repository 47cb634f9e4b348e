//! Binary logistic regression over sparse features.

use serde::{Deserialize, Serialize};

use super::{Classifier, FeatureVector};
use crate::error::{Result, SpamError};

/// Fitted linear model: `p(classes[1]) = sigmoid(intercept + coefficients · x)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    classes: Vec<String>,
    coefficients: Vec<f64>,
    #[serde(default)]
    intercept: f64,
}

impl LinearModel {
    pub fn new(
        classes: [impl Into<String>; 2],
        coefficients: Vec<f64>,
        intercept: f64,
    ) -> anyhow::Result<Self> {
        let model = Self {
            classes: Vec::from(classes.map(Into::<String>::into)),
            coefficients,
            intercept,
        };
        model.validate()?;
        Ok(model)
    }

    /// Parse and validate a JSON model.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let model: Self = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.classes.len() != 2 {
            anyhow::bail!(
                "expected exactly 2 classes, found {}",
                self.classes.len()
            );
        }
        if self.classes[0] == self.classes[1] {
            anyhow::bail!("class labels must differ");
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            anyhow::bail!("coefficients and intercept must be finite");
        }
        Ok(())
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Signed distance from the decision boundary; positive favours `classes[1]`.
    pub fn decision_function(&self, features: &FeatureVector) -> Result<f64> {
        if features.dim() != self.coefficients.len() {
            return Err(SpamError::Processing(format!(
                "feature vector has {} dimensions, model expects {}",
                features.dim(),
                self.coefficients.len()
            )));
        }
        Ok(self.intercept + features.dot(&self.coefficients))
    }
}

impl Classifier for LinearModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, features: &FeatureVector) -> Result<&str> {
        let z = self.decision_function(features)?;
        let idx = usize::from(z > 0.0);
        Ok(&self.classes[idx])
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2]> {
        let p = sigmoid(self.decision_function(features)?);
        Ok([1.0 - p, p])
    }

    fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

#[inline(always)]
fn sigmoid(z: f64) -> f64 {
    let z = z.clamp(-35.0, 35.0);
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let exp_z = z.exp();
        exp_z / (1.0 + exp_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> LinearModel {
        LinearModel::new(["ham", "spam"], vec![2.0, -1.0, 0.5], -0.5).unwrap()
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(100.0) < 1.0);
        assert!(sigmoid(-100.0) > 0.0);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_spam() {
        let x = FeatureVector::from_entries(3, [(0, 2.0)]);
        assert_eq!(model().decision_function(&x).unwrap(), 3.5);
        assert_eq!(model().predict(&x).unwrap(), "spam");
        let [ham, spam] = model().predict_proba(&x).unwrap();
        assert!(spam > 0.9);
        assert!((ham + spam - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_vector_uses_intercept() {
        let x = FeatureVector::zeros(3);
        assert_eq!(model().predict(&x).unwrap(), "ham");
        let [ham, spam] = model().predict_proba(&x).unwrap();
        assert!(ham > spam);
    }

    #[test]
    fn test_dimension_mismatch() {
        let x = FeatureVector::zeros(2);
        assert!(matches!(
            model().predict(&x),
            Err(SpamError::Processing(_))
        ));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"classes": ["ham", "spam"], "coefficients": [1.0, -1.0]}"#;
        let m = LinearModel::from_json(json).unwrap();
        assert_eq!(m.intercept(), 0.0);
        assert_eq!(m.coefficients(), [1.0, -1.0]);
    }

    #[test]
    fn test_invalid_models_rejected() {
        assert!(LinearModel::from_json(r#"{"classes": ["spam"], "coefficients": []}"#).is_err());
        assert!(
            LinearModel::from_json(r#"{"classes": ["a", "a"], "coefficients": [1.0]}"#).is_err()
        );
        assert!(LinearModel::from_json("not json").is_err());
    }
}
