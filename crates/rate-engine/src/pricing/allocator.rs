use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::encoding::EncodedProfile;
use super::importance::ImportanceTable;
use super::normalizer::{RangeTable, MAX_RANK, MIN_RANK};
use super::round_to;

pub const DEFAULT_NDIGITS: u32 = 2;

/// How the average rank is turned into a total budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalingStrategy {
    /// `min_bps` is added on top of the proportional share.
    WithFloor,
    /// Pure proportional scaling; a weak profile can drop below `min_bps`.
    ProportionalOnly,
}

impl ScalingStrategy {
    pub fn total_bps(self, avg_rank: f64, bounds: BpsBounds) -> f64 {
        let proportional =
            avg_rank.clamp(MIN_RANK, MAX_RANK) / 100.0 * (bounds.max_bps - bounds.min_bps);
        match self {
            ScalingStrategy::WithFloor => proportional + bounds.min_bps,
            ScalingStrategy::ProportionalOnly => proportional,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BpsBounds {
    pub min_bps: f64,
    pub max_bps: f64,
}

impl Default for BpsBounds {
    fn default() -> Self {
        Self {
            min_bps: 10.0,
            max_bps: 100.0,
        }
    }
}

/// A feature ready for allocation: its importance, normalized share and rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFeature {
    pub feature: String,
    pub importance: f64,
    pub share: f64,
    pub rank: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationLine {
    pub feature: String,
    pub importance: f64,
    pub share: f64,
    pub rank: f64,
    pub bps: f64,
}

/// Result of one model's allocation. `lines` keep the model's feature order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BpsAllocation {
    pub lines: Vec<AllocationLine>,
    pub total_bps: f64,
    pub avg_rank: f64,
    pub expected_total: f64,
    pub drift: f64,
    pub ndigits: u32,
}

impl BpsAllocation {
    pub fn empty(ndigits: u32) -> Self {
        Self {
            lines: Vec::new(),
            total_bps: 0.0,
            avg_rank: 0.0,
            expected_total: 0.0,
            drift: 0.0,
            ndigits,
        }
    }

    /// Sum of the per-feature bps, rounded at the allocation's precision.
    pub fn allocated_bps(&self) -> f64 {
        round_to(self.lines.iter().map(|line| line.bps).sum(), self.ndigits)
    }

    pub fn get(&self, feature: &str) -> Option<&AllocationLine> {
        self.lines.iter().find(|line| line.feature == feature)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn average_rank(features: &[RankedFeature]) -> f64 {
    if features.is_empty() {
        return 0.0;
    }
    features.iter().map(|feature| feature.rank).sum::<f64>() / features.len() as f64
}

/// Splits `total_bps` across `features` by share, scales each slice by its rank and
/// pushes any rounding drift onto the highest-share feature.
pub fn distribute(features: Vec<RankedFeature>, total_bps: f64, ndigits: u32) -> BpsAllocation {
    if features.is_empty() {
        return BpsAllocation::empty(ndigits);
    }

    let avg_rank = average_rank(&features);
    let mut init_sum = 0.0;
    let mut lines: Vec<AllocationLine> = features
        .into_iter()
        .map(|feature| {
            let init_bps = feature.share * total_bps;
            init_sum += init_bps;
            AllocationLine {
                bps: round_to(init_bps * feature.rank / 100.0, ndigits),
                feature: feature.feature,
                importance: feature.importance,
                share: feature.share,
                rank: feature.rank,
            }
        })
        .collect();

    let expected_total = round_to(init_sum * avg_rank / 100.0, ndigits);
    let allocated: f64 = lines.iter().map(|line| line.bps).sum();
    let drift = round_to(expected_total - allocated, ndigits);

    // Half a unit of the last digit absorbs float noise in the comparison.
    let step = 10f64.powi(-(ndigits as i32));
    let applied = if drift.abs() >= step * 0.5 {
        let top = top_share_index(&lines);
        lines[top].bps = round_to(lines[top].bps + drift, ndigits);
        drift
    } else {
        0.0
    };

    BpsAllocation {
        lines,
        total_bps,
        avg_rank,
        expected_total,
        drift: applied,
        ndigits,
    }
}

/// First index holding the largest share.
fn top_share_index(lines: &[AllocationLine]) -> usize {
    let mut top = 0;
    for (index, line) in lines.iter().enumerate().skip(1) {
        if line.share > lines[top].share {
            top = index;
        }
    }
    top
}

/// One model's allocator: immutable ranges and importances plus a scaling strategy.
#[derive(Debug, Clone)]
pub struct BpsAllocator {
    ranges: Arc<RangeTable>,
    importances: ImportanceTable,
    scaling: ScalingStrategy,
    bounds: BpsBounds,
    ndigits: u32,
}

impl BpsAllocator {
    pub fn new(
        ranges: Arc<RangeTable>,
        importances: ImportanceTable,
        scaling: ScalingStrategy,
    ) -> Self {
        Self {
            ranges,
            importances,
            scaling,
            bounds: BpsBounds::default(),
            ndigits: DEFAULT_NDIGITS,
        }
    }

    pub fn with_bounds(mut self, bounds: BpsBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_ndigits(mut self, ndigits: u32) -> Self {
        self.ndigits = ndigits;
        self
    }

    pub fn scaling(&self) -> ScalingStrategy {
        self.scaling
    }

    pub fn importances(&self) -> &ImportanceTable {
        &self.importances
    }

    pub fn rank_profile(&self, profile: &EncodedProfile) -> Vec<RankedFeature> {
        self.importances
            .shares()
            .into_iter()
            .map(|share| RankedFeature {
                rank: self.ranges.rank(&share.feature, profile.value(&share.feature)),
                feature: share.feature,
                importance: share.weight,
                share: share.share,
            })
            .collect()
    }

    pub fn allocate(&self, profile: &EncodedProfile) -> BpsAllocation {
        let ranked = self.rank_profile(profile);
        if ranked.is_empty() {
            return BpsAllocation::empty(self.ndigits);
        }
        let total_bps = self
            .scaling
            .total_bps(average_rank(&ranked), self.bounds);
        distribute(ranked, total_bps, self.ndigits)
    }
}
