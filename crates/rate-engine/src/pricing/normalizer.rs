use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const MIN_RANK: f64 = 1.0;
pub const MAX_RANK: f64 = 100.0;

/// Training-set bounds for a single feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Zero-width (or inverted) ranges carry no ordering information.
    pub fn is_degenerate(&self) -> bool {
        !(self.max > self.min)
    }

    /// Position of `raw` on the 1-100 favorability scale. Out-of-range values saturate.
    pub fn rank(&self, raw: f64) -> f64 {
        if self.is_degenerate() || raw.is_nan() {
            return MIN_RANK;
        }

        let clipped = raw.clamp(self.min, self.max);
        MIN_RANK + (clipped - self.min) / (self.max - self.min) * (MAX_RANK - MIN_RANK)
    }

    fn widen(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

/// Feature ranges derived once from training data and shared read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RangeTable {
    ranges: BTreeMap<String, FeatureRange>,
}

impl RangeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: impl Into<String>, range: FeatureRange) {
        self.ranges.insert(feature.into(), range);
    }

    /// Extends the recorded range of `feature` so it covers `value`.
    pub fn observe(&mut self, feature: &str, value: f64) {
        if !value.is_finite() {
            return;
        }
        match self.ranges.get_mut(feature) {
            Some(range) => range.widen(value),
            None => {
                self.ranges
                    .insert(feature.to_string(), FeatureRange::new(value, value));
            }
        }
    }

    pub fn get(&self, feature: &str) -> Option<&FeatureRange> {
        self.ranges.get(feature)
    }

    /// Features without a recorded range rank at the floor.
    pub fn rank(&self, feature: &str, raw: f64) -> f64 {
        self.ranges
            .get(feature)
            .map(|range| range.rank(raw))
            .unwrap_or(MIN_RANK)
    }

    pub fn remove(&mut self, feature: &str) -> Option<FeatureRange> {
        self.ranges.remove(feature)
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureRange)> {
        self.ranges.iter().map(|(name, range)| (name.as_str(), range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_score_rank_matches_linear_scale() {
        let range = FeatureRange::new(300.0, 850.0);
        let rank = range.rank(800.0);
        assert!((rank - 91.0).abs() < 1e-9, "rank was {rank}");
    }

    #[test]
    fn outliers_saturate_at_bounds() {
        let range = FeatureRange::new(18.0, 92.0);
        assert_eq!(range.rank(5.0), 1.0);
        assert_eq!(range.rank(18.0), 1.0);
        assert_eq!(range.rank(92.0), 100.0);
        assert_eq!(range.rank(140.0), 100.0);
    }

    #[test]
    fn degenerate_range_ranks_at_floor() {
        assert_eq!(FeatureRange::new(4.0, 4.0).rank(4.0), 1.0);
        assert_eq!(FeatureRange::new(9.0, 2.0).rank(5.0), 1.0);
        assert_eq!(FeatureRange::new(0.0, 1.0).rank(f64::NAN), 1.0);
    }

    #[test]
    fn rank_is_bounded_and_monotone() {
        let range = FeatureRange::new(-250.0, 1_200.0);
        let mut previous = f64::MIN;
        let mut value = -600.0;
        while value <= 1_600.0 {
            let rank = range.rank(value);
            assert!((1.0..=100.0).contains(&rank), "rank {rank} for {value}");
            assert!(rank >= previous, "rank decreased at {value}");
            previous = rank;
            value += 13.7;
        }
    }

    #[test]
    fn table_observes_and_ranks_unknown_features_at_floor() {
        let mut table = RangeTable::new();
        for value in [620.0, 710.0, 540.0, f64::NAN] {
            table.observe("CreditScore", value);
        }
        assert_eq!(
            table.get("CreditScore"),
            Some(&FeatureRange::new(540.0, 710.0))
        );
        assert_eq!(table.rank("CreditScore", 710.0), 100.0);
        assert_eq!(table.rank("Tenure", 7.0), 1.0);
    }
}
