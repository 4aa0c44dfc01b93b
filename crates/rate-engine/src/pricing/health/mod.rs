//! Hand-authored scoring path: a fixed bps budget per feature, scaled by a
//! bucketed health percent. Trained models play no part here.

mod tables;

use std::collections::BTreeMap;

use serde::Serialize;

use super::encoding::{CustomerProfile, FeatureValue};

/// Health awarded to features the table has no buckets for.
pub const UNSCORED_HEALTH: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HealthBucket {
    /// Half-open `[lower, upper)`. When `lower == upper` the bucket matches that point only.
    Range { lower: f64, upper: f64, health: f64 },
    Category { value: String, health: f64 },
}

impl HealthBucket {
    fn matches(&self, value: &FeatureValue) -> bool {
        match self {
            HealthBucket::Range { lower, upper, .. } => {
                let Some(number) = numeric_view(value) else {
                    return false;
                };
                if lower == upper {
                    number == *lower
                } else {
                    *lower <= number && number < *upper
                }
            }
            HealthBucket::Category { value: expected, .. } => match value {
                FeatureValue::Text(text) => text.trim() == expected,
                FeatureValue::Number(number) => number.to_string() == *expected,
            },
        }
    }

    pub fn health(&self) -> f64 {
        match self {
            HealthBucket::Range { health, .. } | HealthBucket::Category { health, .. } => *health,
        }
    }
}

fn numeric_view(value: &FeatureValue) -> Option<f64> {
    value.numeric().filter(|number| !number.is_nan())
}

/// Ordered buckets per feature. The first matching bucket wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthTable {
    buckets: BTreeMap<String, Vec<HealthBucket>>,
}

impl HealthTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ranges(mut self, feature: &str, ranges: &[(f64, f64, f64)]) -> Self {
        let buckets = ranges
            .iter()
            .map(|&(lower, upper, health)| HealthBucket::Range {
                lower,
                upper,
                health,
            })
            .collect();
        self.buckets.insert(feature.to_string(), buckets);
        self
    }

    pub fn with_categories(mut self, feature: &str, categories: &[(&str, f64)]) -> Self {
        let buckets = categories
            .iter()
            .map(|&(value, health)| HealthBucket::Category {
                value: value.to_string(),
                health,
            })
            .collect();
        self.buckets.insert(feature.to_string(), buckets);
        self
    }

    pub fn buckets(&self, feature: &str) -> Option<&[HealthBucket]> {
        self.buckets.get(feature).map(Vec::as_slice)
    }

    /// Total lookup: unscored features get full health, unmatched values get 0.
    pub fn health_percent(&self, feature: &str, value: &FeatureValue) -> f64 {
        match self.buckets.get(feature) {
            None => UNSCORED_HEALTH,
            Some(buckets) => buckets
                .iter()
                .find(|bucket| bucket.matches(value))
                .map(HealthBucket::health)
                .unwrap_or(0.0),
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Fixed bps budget per feature, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StaticBpsTable {
    entries: Vec<(String, f64)>,
}

impl StaticBpsTable {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(feature, bps)| (feature.into(), bps))
                .collect(),
        }
    }

    pub fn budget(&self, feature: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, bps)| *bps)
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn total_budget(&self) -> f64 {
        self.entries.iter().map(|(_, bps)| bps).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthLine {
    pub parameter: String,
    pub value: FeatureValue,
    pub bps: f64,
    pub health: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthAllocation {
    pub total_bps: f64,
    pub lines: Vec<HealthLine>,
}

impl HealthAllocation {
    pub fn get(&self, parameter: &str) -> Option<&HealthLine> {
        self.lines.iter().find(|line| line.parameter == parameter)
    }
}

/// Earns `budget * health / 100` for every feature of `table`. Values missing from
/// `profile` are scored as 0.
pub fn health_bps(
    profile: &CustomerProfile,
    table: &StaticBpsTable,
    buckets: &HealthTable,
) -> HealthAllocation {
    let mut total_bps = 0.0;
    let lines = table
        .entries
        .iter()
        .map(|(feature, budget)| {
            let value = profile
                .get(feature)
                .cloned()
                .unwrap_or(FeatureValue::Number(0.0));
            let health = buckets.health_percent(feature, &value);
            let earned = budget * (health / 100.0);
            total_bps += earned;
            HealthLine {
                parameter: feature.clone(),
                value,
                bps: earned,
                health,
            }
        })
        .collect();

    HealthAllocation { total_bps, lines }
}
