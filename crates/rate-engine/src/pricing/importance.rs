use serde::Serialize;
use tracing::warn;

/// Raw importance weight reported by a model for one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureWeight {
    pub feature: String,
    pub weight: f64,
}

/// Importance weight together with its normalized share.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportanceShare {
    pub feature: String,
    pub weight: f64,
    pub share: f64,
}

/// Per-feature importance in the model's own feature order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportanceTable {
    entries: Vec<FeatureWeight>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ImportanceError {
    #[error("model reported {weights} importances for {features} features")]
    LengthMismatch { features: usize, weights: usize },
}

impl ImportanceTable {
    /// Ensemble importances arrive as an array aligned to a fixed feature order.
    pub fn from_ensemble<S: AsRef<str>>(
        feature_order: &[S],
        importances: &[f64],
    ) -> Result<Self, ImportanceError> {
        if feature_order.len() != importances.len() {
            return Err(ImportanceError::LengthMismatch {
                features: feature_order.len(),
                weights: importances.len(),
            });
        }

        let mut table = Self::default();
        for (feature, weight) in feature_order.iter().zip(importances) {
            table.upsert(feature.as_ref(), *weight);
        }
        Ok(table)
    }

    /// Gain scores only list the features a boosted model actually split on; anything
    /// absent is left out of the table entirely.
    pub fn from_gain<I, S>(scores: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for (feature, weight) in scores {
            let feature = feature.into();
            table.upsert(&feature, weight);
        }
        table
    }

    fn upsert(&mut self, feature: &str, weight: f64) {
        let weight = if weight.is_finite() && weight >= 0.0 {
            weight
        } else {
            warn!(feature, weight, "importance weight clamped to zero");
            0.0
        };

        match self.entries.iter_mut().find(|entry| entry.feature == feature) {
            Some(entry) => entry.weight = weight,
            None => self.entries.push(FeatureWeight {
                feature: feature.to_string(),
                weight,
            }),
        }
    }

    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|entry| entry.weight).sum()
    }

    /// Shares sum to one. An all-zero table divides by one instead of failing.
    pub fn shares(&self) -> Vec<ImportanceShare> {
        let total = self.total_weight();
        let divisor = if total > 0.0 { total } else { 1.0 };

        self.entries
            .iter()
            .map(|entry| ImportanceShare {
                feature: entry.feature.clone(),
                weight: entry.weight,
                share: entry.weight / divisor,
            })
            .collect()
    }

    pub fn weight(&self, feature: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| entry.feature == feature)
            .map(|entry| entry.weight)
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.feature.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
