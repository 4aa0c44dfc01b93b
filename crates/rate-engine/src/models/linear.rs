use serde::{Deserialize, Serialize};

use super::{ModelError, RelationshipClassifier, RiskRegressor};
use crate::pricing::EncodedProfile;

/// One standardized input of a linear scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTerm {
    pub feature: String,
    pub weight: f64,
    #[serde(default)]
    pub mean: f64,
    #[serde(default = "unit_scale")]
    pub scale: f64,
    /// Importance exported alongside the weights at training time.
    #[serde(default)]
    pub importance: f64,
}

fn unit_scale() -> f64 {
    1.0
}

/// Serialized form shared by both linear scorers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSpec {
    #[serde(default)]
    pub intercept: f64,
    pub terms: Vec<LinearTerm>,
}

impl LinearSpec {
    fn validate(&self, model: &str) -> Result<(), ModelError> {
        if self.terms.is_empty() {
            return Err(ModelError::InvalidDefinition(format!(
                "{model} model has no terms"
            )));
        }
        if !self.intercept.is_finite() {
            return Err(ModelError::InvalidDefinition(format!(
                "{model} intercept is not finite"
            )));
        }
        for term in &self.terms {
            if !(term.weight.is_finite() && term.mean.is_finite() && term.scale.is_finite()) {
                return Err(ModelError::InvalidDefinition(format!(
                    "{model} term '{}' has a non-finite coefficient",
                    term.feature
                )));
            }
            if term.scale == 0.0 {
                return Err(ModelError::InvalidDefinition(format!(
                    "{model} term '{}' has zero scale",
                    term.feature
                )));
            }
        }
        Ok(())
    }

    fn linear_score(&self, features: &EncodedProfile) -> f64 {
        self.terms.iter().fold(self.intercept, |acc, term| {
            acc + term.weight * (features.value(&term.feature) - term.mean) / term.scale
        })
    }

    fn feature_names(&self) -> Vec<String> {
        self.terms.iter().map(|term| term.feature.clone()).collect()
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Logistic model over standardized inputs. Class 1 is attrition, so class 0 is
/// the relationship strength.
#[derive(Debug, Clone)]
pub struct LogisticClassifier {
    spec: LinearSpec,
    names: Vec<String>,
}

impl LogisticClassifier {
    pub fn from_spec(spec: LinearSpec) -> Result<Self, ModelError> {
        spec.validate("relationship")?;
        let names = spec.feature_names();
        Ok(Self { spec, names })
    }
}

impl RelationshipClassifier for LogisticClassifier {
    fn feature_names(&self) -> &[String] {
        &self.names
    }

    fn predict_proba(&self, features: &EncodedProfile) -> Result<[f64; 2], ModelError> {
        let z = self.spec.linear_score(features);
        if z.is_nan() {
            return Err(ModelError::Inference(
                "relationship score is not a number".to_string(),
            ));
        }
        let attrition = sigmoid(z);
        Ok([1.0 - attrition, attrition])
    }

    fn feature_importances(&self) -> Vec<f64> {
        self.spec.terms.iter().map(|term| term.importance).collect()
    }
}

/// Linear risk model over standardized inputs.
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    spec: LinearSpec,
    names: Vec<String>,
}

impl LinearRegressor {
    pub fn from_spec(spec: LinearSpec) -> Result<Self, ModelError> {
        spec.validate("risk")?;
        let names = spec.feature_names();
        Ok(Self { spec, names })
    }
}

impl RiskRegressor for LinearRegressor {
    fn feature_names(&self) -> &[String] {
        &self.names
    }

    fn predict(&self, features: &EncodedProfile) -> Result<f64, ModelError> {
        let score = self.spec.linear_score(features);
        if !score.is_finite() {
            return Err(ModelError::Inference(format!(
                "risk score {score} is not finite"
            )));
        }
        Ok(score)
    }

    fn gain_scores(&self) -> Vec<(String, f64)> {
        self.spec
            .terms
            .iter()
            .filter(|term| term.importance > 0.0)
            .map(|term| (term.feature.clone(), term.importance))
            .collect()
    }
}
