use serde::{Deserialize, Serialize};

use super::round_to;

/// One scored market signal, 0 (very unfavorable) to 100 (very favorable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSignal {
    #[serde(default)]
    pub summary: Option<String>,
    pub score: f64,
}

impl MarketSignal {
    pub fn scored(score: f64) -> Self {
        Self {
            summary: None,
            score,
        }
    }

    fn clamped(&self) -> f64 {
        if self.score.is_nan() {
            return 0.0;
        }
        self.score.clamp(0.0, 100.0)
    }
}

/// The five market signals and their bps weight at a perfect score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTrendScores {
    pub benchmark_spread: MarketSignal,
    pub liquidity: MarketSignal,
    pub cds_spread: MarketSignal,
    pub market_volatility: MarketSignal,
    pub recent_deals: MarketSignal,
}

impl MarketTrendScores {
    pub const BENCHMARK_SPREAD_BPS: f64 = 5.5;
    pub const LIQUIDITY_BPS: f64 = 3.5;
    pub const CDS_SPREAD_BPS: f64 = 3.0;
    pub const MARKET_VOLATILITY_BPS: f64 = 2.0;
    pub const RECENT_DEALS_BPS: f64 = 1.0;

    /// Adjustment in bps, between 0 and 15.
    pub fn adjusted_bps(&self) -> f64 {
        let weighted = [
            (&self.benchmark_spread, Self::BENCHMARK_SPREAD_BPS),
            (&self.liquidity, Self::LIQUIDITY_BPS),
            (&self.cds_spread, Self::CDS_SPREAD_BPS),
            (&self.market_volatility, Self::MARKET_VOLATILITY_BPS),
            (&self.recent_deals, Self::RECENT_DEALS_BPS),
        ];
        let total: f64 = weighted
            .iter()
            .map(|(signal, weight)| signal.clamped() / 100.0 * weight)
            .sum();
        round_to(total, 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(values: [f64; 5]) -> MarketTrendScores {
        MarketTrendScores {
            benchmark_spread: MarketSignal::scored(values[0]),
            liquidity: MarketSignal::scored(values[1]),
            cds_spread: MarketSignal::scored(values[2]),
            market_volatility: MarketSignal::scored(values[3]),
            recent_deals: MarketSignal::scored(values[4]),
        }
    }

    #[test]
    fn perfect_market_earns_the_full_fifteen_bps() {
        assert_eq!(scores([100.0; 5]).adjusted_bps(), 15.0);
        assert_eq!(scores([0.0; 5]).adjusted_bps(), 0.0);
    }

    #[test]
    fn scores_are_weighted_and_clamped() {
        // 0.6*5.5 + 0.4*3.5 + 0.5*3.0 + 1.0*2.0 + 0.0*1.0
        assert_eq!(scores([60.0, 40.0, 50.0, 180.0, -20.0]).adjusted_bps(), 8.2);
    }

    #[test]
    fn parses_the_analyst_json_shape() {
        let payload = r#"{
            "benchmark_spread": {"summary": "Spreads steady", "score": 70},
            "liquidity": {"summary": "Tight", "score": 55},
            "cds_spread": {"score": 62},
            "market_volatility": {"summary": "VIX elevated", "score": 35},
            "recent_deals": {"summary": "Few issuances", "score": 48}
        }"#;
        let parsed: MarketTrendScores = serde_json::from_str(payload).expect("valid payload");
        assert_eq!(parsed.cds_spread.summary, None);
        assert!(parsed.adjusted_bps() > 0.0);
    }
}
