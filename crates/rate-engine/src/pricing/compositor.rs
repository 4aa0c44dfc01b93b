use serde::{Deserialize, Serialize};

use super::allocator::BpsBounds;
use super::round_to;

/// Linear blend used for house-loan discounts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoanWeights {
    pub crs: f64,
    pub risk: f64,
    pub market: f64,
    /// Fixed market trend factor; the blend uses its complement.
    pub market_trend: f64,
}

pub const PRIMARY_LOAN_WEIGHTS: LoanWeights = LoanWeights {
    crs: 0.5,
    risk: 0.4,
    market: 0.1,
    market_trend: 0.30,
};

pub const RISK_WEIGHTED_LOAN_WEIGHTS: LoanWeights = LoanWeights {
    crs: 0.4,
    risk: 0.5,
    market: 0.1,
    market_trend: 0.30,
};

/// Named loan weight sets. Both are live; neither replaces the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanBlend {
    #[default]
    Primary,
    RiskWeighted,
}

impl LoanBlend {
    pub fn weights(self) -> LoanWeights {
        match self {
            LoanBlend::Primary => PRIMARY_LOAN_WEIGHTS,
            LoanBlend::RiskWeighted => RISK_WEIGHTED_LOAN_WEIGHTS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoanBlend::Primary => "primary",
            LoanBlend::RiskWeighted => "risk_weighted",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "primary" => Some(LoanBlend::Primary),
            "risk_weighted" | "risk-weighted" => Some(LoanBlend::RiskWeighted),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoanRate {
    pub bps: f64,
    pub bps_deduction: f64,
    pub final_rate: f64,
}

/// `crs` and `ras` are both on the 0-1 scale. Higher risk earns a smaller discount.
pub fn compose_loan(crs: f64, ras: f64, base_rate: f64, weights: LoanWeights) -> LoanRate {
    let bounds = BpsBounds::default();
    let blended = weights.crs * crs
        + weights.risk * (1.0 - ras)
        + weights.market * (1.0 - weights.market_trend);
    let raw = bounds.min_bps + (bounds.max_bps - bounds.min_bps) * blended;
    let bps = round_to(raw, 2).max(bounds.min_bps).min(bounds.max_bps);
    let bps_deduction = bps / 100.0;

    LoanRate {
        bps,
        bps_deduction,
        final_rate: round_to(base_rate - bps_deduction, 2),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepositWeights {
    pub crs: f64,
    pub stability: f64,
    pub market: f64,
    pub market_factor: f64,
    pub deposit_range: (f64, f64),
    pub tenure_range: (f64, f64),
}

pub const STANDARD_DEPOSIT_WEIGHTS: DepositWeights = DepositWeights {
    crs: 0.5,
    stability: 0.3,
    market: 0.2,
    market_factor: 0.3,
    deposit_range: (0.0, 100_000_000.0),
    tenure_range: (0.0, 10.0),
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepositRate {
    /// Bonus expressed in percentage points.
    pub bps: f64,
    pub bonus_bps: f64,
    pub final_rate: f64,
}

/// Unclamped min-max scaling; a zero-width range maps everything to the midpoint.
pub fn min_max_normalize(value: f64, min: f64, max: f64) -> f64 {
    if max - min == 0.0 {
        return 0.5;
    }
    (value - min) / (max - min)
}

/// `crs_percent` is on the 0-100 scale.
pub fn compose_deposit(
    crs_percent: f64,
    deposit_amount: f64,
    tenure: f64,
    base_rate: f64,
    weights: DepositWeights,
) -> DepositRate {
    let bounds = BpsBounds::default();
    let crs = crs_percent / 100.0;
    let deposit = min_max_normalize(deposit_amount, weights.deposit_range.0, weights.deposit_range.1);
    let tenure = min_max_normalize(tenure, weights.tenure_range.0, weights.tenure_range.1);
    let stability = (deposit + tenure) / 2.0;

    let weighted = weights.crs * crs
        + weights.stability * stability
        + weights.market * (1.0 - weights.market_factor);
    let raw = bounds.min_bps + (bounds.max_bps - bounds.min_bps) * weighted;
    let bonus_bps = round_to(raw.clamp(bounds.min_bps, bounds.max_bps), 2);

    DepositRate {
        bps: bonus_bps / 100.0,
        bonus_bps,
        final_rate: round_to(base_rate + bonus_bps / 100.0, 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_bonus_for_a_mid_range_customer() {
        let rate = compose_deposit(70.0, 50_000_000.0, 5.0, 6.0, STANDARD_DEPOSIT_WEIGHTS);
        assert_eq!(rate.bonus_bps, 67.6);
        assert_eq!(rate.final_rate, 6.68);
        assert!((rate.bps - 0.676).abs() < 1e-12);
    }

    #[test]
    fn loan_discount_uses_the_selected_blend() {
        let primary = compose_loan(0.8, 0.2, 8.5, LoanBlend::Primary.weights());
        // 10 + 90 * (0.4 + 0.32 + 0.07)
        assert_eq!(primary.bps, 81.1);
        assert_eq!(primary.final_rate, 7.69);

        let risk_weighted = compose_loan(0.8, 0.2, 8.5, LoanBlend::RiskWeighted.weights());
        // 10 + 90 * (0.32 + 0.4 + 0.07)
        assert_eq!(risk_weighted.bps, 81.1);

        let skewed = compose_loan(0.9, 0.6, 8.5, LoanBlend::RiskWeighted.weights());
        let skewed_primary = compose_loan(0.9, 0.6, 8.5, LoanBlend::Primary.weights());
        assert!(skewed.bps < skewed_primary.bps);
    }

    #[test]
    fn loan_bps_are_bounded_and_never_raise_the_rate() {
        let mut crs = -0.5;
        while crs <= 1.5 {
            let mut ras = -0.5;
            while ras <= 1.5 {
                for blend in [LoanBlend::Primary, LoanBlend::RiskWeighted] {
                    let rate = compose_loan(crs, ras, 9.0, blend.weights());
                    assert!((10.0..=100.0).contains(&rate.bps), "bps {}", rate.bps);
                    assert!(rate.final_rate <= 9.0);
                }
                ras += 0.125;
            }
            crs += 0.125;
        }
    }

    #[test]
    fn deposit_rate_never_drops_below_base() {
        for crs in [0.0, 35.0, 100.0, 250.0] {
            for amount in [0.0, 1_000.0, 90_000_000.0, 500_000_000.0] {
                for tenure in [0.0, 3.0, 10.0, 40.0] {
                    let rate = compose_deposit(crs, amount, tenure, 6.25, STANDARD_DEPOSIT_WEIGHTS);
                    assert!((10.0..=100.0).contains(&rate.bonus_bps));
                    assert!(rate.final_rate >= 6.25);
                }
            }
        }
    }

    #[test]
    fn degenerate_normalization_range_maps_to_midpoint() {
        assert_eq!(min_max_normalize(42.0, 3.0, 3.0), 0.5);
        assert_eq!(min_max_normalize(15.0, 0.0, 10.0), 1.5);
    }

    #[test]
    fn blend_labels_round_trip() {
        for blend in [LoanBlend::Primary, LoanBlend::RiskWeighted] {
            assert_eq!(LoanBlend::from_label(blend.label()), Some(blend));
        }
        assert_eq!(LoanBlend::from_label("aggressive"), None);
    }
}
