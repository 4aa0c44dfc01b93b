use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::FallbackProduct;
use crate::pricing::{BpsAllocation, CustomerProfile, HealthLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Product {
    HouseLoan,
    FixedDeposit,
}

impl Product {
    pub fn label(self) -> &'static str {
        match self {
            Product::HouseLoan => "house-loan",
            Product::FixedDeposit => "fixed-deposit",
        }
    }

    pub(crate) fn fallback(self) -> FallbackProduct {
        match self {
            Product::HouseLoan => FallbackProduct::HouseLoan,
            Product::FixedDeposit => FallbackProduct::FixedDeposit,
        }
    }
}

/// Body of both rate endpoints. Deposits reuse the amount and duration fields for
/// the deposit amount and tenure in years.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateQuoteRequest {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(rename = "LoanAmount", alias = "DepositAmount", default)]
    pub amount: Option<f64>,
    #[serde(rename = "LoanDuration", alias = "Tenure", default)]
    pub duration: Option<f64>,
    #[serde(rename = "BaseRate", default)]
    pub base_rate: Option<f64>,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidQuote {
    pub customer_id: String,
    pub amount: f64,
    pub duration: f64,
    pub base_rate: f64,
}

impl RateQuoteRequest {
    pub(crate) fn validate(&self) -> Result<ValidQuote, String> {
        let customer_id = self
            .customer_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| "customer_id is required.".to_string())?;

        match (self.amount, self.duration, self.base_rate) {
            (Some(amount), Some(duration), Some(base_rate))
                if amount.is_finite() && duration.is_finite() && base_rate.is_finite() =>
            {
                Ok(ValidQuote {
                    customer_id: customer_id.to_string(),
                    amount,
                    duration,
                    base_rate,
                })
            }
            _ => Err("LoanAmount, LoanDuration, and BaseRate are required.".to_string()),
        }
    }
}

/// Where the relationship and risk scores came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    Models,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanQuote {
    pub customer_id: String,
    #[serde(rename = "CRS")]
    pub crs: f64,
    #[serde(rename = "RAS")]
    pub ras: f64,
    pub base_rate: f64,
    #[serde(rename = "BPS")]
    pub bps: f64,
    #[serde(rename = "BPS_Deduction")]
    pub bps_deduction: f64,
    pub loan_amount: f64,
    pub loan_duration: f64,
    #[serde(rename = "FinalRate")]
    pub final_rate: f64,
    pub source: ScoreSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub quoted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepositQuote {
    pub customer_id: String,
    #[serde(rename = "CRS")]
    pub crs: f64,
    pub base_rate: f64,
    #[serde(rename = "BPS")]
    pub bps: f64,
    #[serde(rename = "Bonus_bps")]
    pub bonus_bps: f64,
    pub loan_amount: f64,
    pub loan_duration: f64,
    #[serde(rename = "FinalRate")]
    pub final_rate: f64,
    pub source: ScoreSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub quoted_at: DateTime<Utc>,
}

/// Either a stored customer, an ad-hoc profile, or a stored customer with overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorsRequest {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub features: CustomerProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorLine {
    pub feature: String,
    pub bps: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanFactors {
    pub features: Vec<FactorLine>,
    pub total_bps: f64,
    pub relationship: BpsAllocation,
    pub risk: BpsAllocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepositFactors {
    pub features: Vec<FactorLine>,
    /// Reported as twice the allocated sum.
    pub total_bps: f64,
    pub allocation: BpsAllocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthBreakdown {
    pub customer_id: String,
    pub product: Product,
    pub base_rate: f64,
    pub total_bps: f64,
    pub final_rate: f64,
    pub lines: Vec<HealthLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketAdjustment {
    pub adjusted_bps: f64,
    pub max_bps: f64,
}
