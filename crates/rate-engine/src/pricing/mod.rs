//! Pure pricing core: ranks, importance shares, basis point allocation, and rate
//! composition. Nothing in this module performs I/O.

pub mod allocator;
pub mod compositor;
pub mod encoding;
pub mod health;
pub mod importance;
pub mod market;
pub mod merge;
pub mod normalizer;

pub use allocator::{
    distribute, AllocationLine, BpsAllocation, BpsAllocator, BpsBounds, RankedFeature,
    ScalingStrategy, DEFAULT_NDIGITS,
};
pub use compositor::{
    compose_deposit, compose_loan, min_max_normalize, DepositRate, DepositWeights, LoanBlend,
    LoanRate, LoanWeights, PRIMARY_LOAN_WEIGHTS, RISK_WEIGHTED_LOAN_WEIGHTS,
    STANDARD_DEPOSIT_WEIGHTS,
};
pub use encoding::{
    CategoryEncoder, CustomerProfile, EncodedProfile, FeatureEncoder, FeatureValue, LabelEncoder,
    OrdinalMap,
};
pub use health::{
    health_bps, HealthAllocation, HealthBucket, HealthLine, HealthTable, StaticBpsTable,
};
pub use importance::{ImportanceError, ImportanceShare, ImportanceTable};
pub use market::{MarketSignal, MarketTrendScores};
pub use merge::{merge, MergedAllocation};
pub use normalizer::{FeatureRange, RangeTable};

/// Rounds half-to-even at `ndigits` decimal places.
pub(crate) fn round_to(value: f64, ndigits: u32) -> f64 {
    let factor = 10f64.powi(ndigits as i32);
    (value * factor).round_ties_even() / factor
}

#[cfg(test)]
mod tests {
    use super::round_to;

    #[test]
    fn rounds_to_requested_precision() {
        assert_eq!(round_to(24.456, 2), 24.46);
        assert_eq!(round_to(-2.994, 2), -2.99);
        assert_eq!(round_to(6.676, 2), 6.68);
        assert_eq!(round_to(0.125, 2), 0.12);
    }
}
