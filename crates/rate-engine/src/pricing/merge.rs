use std::collections::BTreeMap;

use serde::Serialize;

use super::allocator::BpsAllocation;

/// Per-feature bps summed across models, ordered by feature name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedAllocation {
    pub features: BTreeMap<String, f64>,
}

impl MergedAllocation {
    pub fn total_bps(&self) -> f64 {
        self.features.values().sum()
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        self.features.get(feature).copied()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Outer union of both allocations; a feature missing on one side contributes 0.
pub fn merge(left: &BpsAllocation, right: &BpsAllocation) -> MergedAllocation {
    let mut features = BTreeMap::new();
    for line in left.lines.iter().chain(&right.lines) {
        *features.entry(line.feature.clone()).or_insert(0.0) += line.bps;
    }
    MergedAllocation { features }
}
