use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use super::domain::{
    DepositFactors, DepositQuote, FactorLine, FactorsRequest, HealthBreakdown, LoanFactors,
    LoanQuote, MarketAdjustment, Product, RateQuoteRequest, ScoreSource,
};
use super::inputs::{
    combined_fields, derive_relationship_fields, relationship_input, risk_input, ScoringInput,
};
use crate::artifacts::TrainingArtifacts;
use crate::customers::{CustomerRecord, CustomerRepository, CustomerSummary, RepositoryError};
use crate::models::{
    guarded, parse_fallback_response, CallPolicy, FallbackEstimator, FallbackOutcome,
    FallbackRequest, GuardError, RelationshipClassifier, RiskRegressor,
};
use crate::pricing::{
    compose_deposit, compose_loan, health_bps, merge, round_to, BpsAllocation, BpsAllocator,
    CustomerProfile, DepositWeights, FeatureEncoder, HealthTable, ImportanceError,
    ImportanceTable, LoanBlend, MarketTrendScores, ScalingStrategy, StaticBpsTable,
    DEFAULT_NDIGITS, STANDARD_DEPOSIT_WEIGHTS,
};

/// Tunables chosen at startup.
#[derive(Debug, Clone, Copy)]
pub struct QuoteSettings {
    pub loan_blend: LoanBlend,
    pub deposit_weights: DepositWeights,
    pub policy: CallPolicy,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            loan_blend: LoanBlend::default(),
            deposit_weights: STANDARD_DEPOSIT_WEIGHTS,
            policy: CallPolicy::default(),
        }
    }
}

/// Service composing the customer store, both scorers, the fallback estimator and the
/// pricing core.
pub struct RateQuoteService<R, C, G, F> {
    customers: Arc<R>,
    classifier: Arc<C>,
    regressor: Arc<G>,
    fallback: Arc<F>,
    relationship_encoder: Arc<FeatureEncoder>,
    risk_encoder: Arc<FeatureEncoder>,
    loan_relationship: BpsAllocator,
    loan_risk: BpsAllocator,
    deposit_relationship: BpsAllocator,
    loan_budget: StaticBpsTable,
    deposit_budget: StaticBpsTable,
    health: HealthTable,
    settings: QuoteSettings,
}

impl<R, C, G, F> RateQuoteService<R, C, G, F>
where
    R: CustomerRepository + 'static,
    C: RelationshipClassifier + 'static,
    G: RiskRegressor + 'static,
    F: FallbackEstimator + 'static,
{
    /// Builds the per-model allocators once; they are read-only afterwards.
    pub fn new(
        customers: Arc<R>,
        classifier: Arc<C>,
        regressor: Arc<G>,
        fallback: Arc<F>,
        relationship: &TrainingArtifacts,
        risk: &TrainingArtifacts,
        settings: QuoteSettings,
    ) -> Result<Self, QuoteServiceError> {
        let relationship_importances = ImportanceTable::from_ensemble(
            classifier.feature_names(),
            &classifier.feature_importances(),
        )?;
        let risk_importances = ImportanceTable::from_gain(regressor.gain_scores());

        let loan_relationship = BpsAllocator::new(
            Arc::clone(&relationship.ranges),
            relationship_importances.clone(),
            ScalingStrategy::ProportionalOnly,
        );
        let deposit_relationship = BpsAllocator::new(
            Arc::clone(&relationship.ranges),
            relationship_importances,
            ScalingStrategy::WithFloor,
        );
        let loan_risk = BpsAllocator::new(
            Arc::clone(&risk.ranges),
            risk_importances,
            ScalingStrategy::ProportionalOnly,
        );

        Ok(Self {
            customers,
            classifier,
            regressor,
            fallback,
            relationship_encoder: Arc::new(relationship.encoder.clone()),
            risk_encoder: Arc::new(risk.encoder.clone()),
            loan_relationship,
            loan_risk,
            deposit_relationship,
            loan_budget: StaticBpsTable::house_loan(),
            deposit_budget: StaticBpsTable::fixed_deposit(),
            health: HealthTable::standard(),
            settings,
        })
    }

    pub fn settings(&self) -> QuoteSettings {
        self.settings
    }

    /// Prices a house loan. Incomplete records are scored by the fallback estimator.
    pub async fn quote_house_loan(
        &self,
        request: &RateQuoteRequest,
    ) -> Result<LoanQuote, QuoteServiceError> {
        let quote = request.validate().map_err(QuoteServiceError::Invalid)?;
        let record = self.record(&quote.customer_id)?;
        let relationship = relationship_input(&record);
        let risk = risk_input(&record, quote.amount, quote.duration);

        let (crs, ras, source, explanation) = if relationship.is_complete() && risk.is_complete() {
            let crs = self.relationship_strength(&relationship).await?;
            let ras = self.risk_score(&risk).await? / 100.0;
            (crs, ras, ScoreSource::Models, None)
        } else {
            let request = FallbackRequest {
                product: Product::HouseLoan.fallback(),
                customer_id: record.id.clone(),
                fields: combined_fields(&[&relationship, &risk]),
            };
            match self.estimate(request).await? {
                FallbackOutcome::Scored {
                    crs,
                    ras: Some(ras),
                    explanation,
                } => (crs, ras, ScoreSource::Fallback, explanation),
                FallbackOutcome::Scored { explanation, .. } => {
                    return Err(QuoteServiceError::FallbackUnparsed {
                        explanation: explanation.unwrap_or_else(|| {
                            "fallback estimate did not include a risk score".to_string()
                        }),
                    })
                }
                FallbackOutcome::Unparsed { explanation } => {
                    return Err(QuoteServiceError::FallbackUnparsed { explanation })
                }
            }
        };

        let rate = compose_loan(crs, ras, quote.base_rate, self.settings.loan_blend.weights());
        info!(
            customer_id = %record.id,
            crs,
            ras,
            bps = rate.bps,
            final_rate = rate.final_rate,
            blend = self.settings.loan_blend.label(),
            "house loan quoted"
        );

        Ok(LoanQuote {
            customer_id: record.id,
            crs,
            ras,
            base_rate: quote.base_rate,
            bps: rate.bps,
            bps_deduction: rate.bps_deduction,
            loan_amount: quote.amount,
            loan_duration: quote.duration,
            final_rate: rate.final_rate,
            source,
            explanation,
            quoted_at: Utc::now(),
        })
    }

    /// Prices a fixed deposit; only the relationship strength is needed.
    pub async fn quote_fixed_deposit(
        &self,
        request: &RateQuoteRequest,
    ) -> Result<DepositQuote, QuoteServiceError> {
        let quote = request.validate().map_err(QuoteServiceError::Invalid)?;
        let record = self.record(&quote.customer_id)?;
        let relationship = relationship_input(&record);

        let (crs, source, explanation) = if relationship.is_complete() {
            let crs = self.relationship_strength(&relationship).await?;
            (crs, ScoreSource::Models, None)
        } else {
            let request = FallbackRequest {
                product: Product::FixedDeposit.fallback(),
                customer_id: record.id.clone(),
                fields: relationship.fields.clone(),
            };
            match self.estimate(request).await? {
                FallbackOutcome::Scored {
                    crs, explanation, ..
                } => (crs, ScoreSource::Fallback, explanation),
                FallbackOutcome::Unparsed { explanation } => {
                    return Err(QuoteServiceError::FallbackUnparsed { explanation })
                }
            }
        };

        let rate = compose_deposit(
            crs * 100.0,
            quote.amount,
            quote.duration,
            quote.base_rate,
            self.settings.deposit_weights,
        );
        info!(
            customer_id = %record.id,
            crs,
            bonus_bps = rate.bonus_bps,
            final_rate = rate.final_rate,
            "fixed deposit quoted"
        );

        Ok(DepositQuote {
            customer_id: record.id,
            crs,
            base_rate: quote.base_rate,
            bps: rate.bps,
            bonus_bps: rate.bonus_bps,
            loan_amount: quote.amount,
            loan_duration: quote.duration,
            final_rate: rate.final_rate,
            source,
            explanation,
            quoted_at: Utc::now(),
        })
    }

    /// Classifier and regressor allocations merged per feature.
    pub fn house_loan_factors(
        &self,
        request: &FactorsRequest,
    ) -> Result<LoanFactors, QuoteServiceError> {
        let profile = self.factor_profile(request)?;
        let relationship = self.allocate(&self.loan_relationship, &self.relationship_encoder, &profile);
        let risk = self.allocate(&self.loan_risk, &self.risk_encoder, &profile);

        let merged = merge(&relationship, &risk);
        let total_bps = round_to(merged.total_bps(), DEFAULT_NDIGITS);
        let features = merged
            .features
            .into_iter()
            .map(|(feature, bps)| FactorLine {
                feature,
                bps: round_to(bps, DEFAULT_NDIGITS),
            })
            .collect();

        Ok(LoanFactors {
            features,
            total_bps,
            relationship,
            risk,
        })
    }

    /// Classifier allocation with the floor applied; the reported total is doubled.
    pub fn fixed_deposit_factors(
        &self,
        request: &FactorsRequest,
    ) -> Result<DepositFactors, QuoteServiceError> {
        let profile = self.factor_profile(request)?;
        let allocation =
            self.allocate(&self.deposit_relationship, &self.relationship_encoder, &profile);
        let features = allocation
            .lines
            .iter()
            .map(|line| FactorLine {
                feature: line.feature.clone(),
                bps: line.bps,
            })
            .collect();

        Ok(DepositFactors {
            features,
            total_bps: round_to(2.0 * allocation.allocated_bps(), DEFAULT_NDIGITS),
            allocation,
        })
    }

    /// Static budgets scaled by bucketed health, read straight from the stored row.
    pub fn health_breakdown(
        &self,
        customer_id: &str,
        product: Product,
        base_rate: f64,
    ) -> Result<HealthBreakdown, QuoteServiceError> {
        if !base_rate.is_finite() {
            return Err(QuoteServiceError::Invalid("base_rate must be a number.".into()));
        }
        let record = self.record(customer_id)?;
        let budget = match product {
            Product::HouseLoan => &self.loan_budget,
            Product::FixedDeposit => &self.deposit_budget,
        };

        let allocation = health_bps(&record.profile(), budget, &self.health);
        let adjustment = allocation.total_bps / 100.0;
        let final_rate = match product {
            Product::HouseLoan => round_to(base_rate - adjustment, 2),
            Product::FixedDeposit => round_to(base_rate + adjustment, 2),
        };

        Ok(HealthBreakdown {
            customer_id: record.id,
            product,
            base_rate,
            total_bps: round_to(allocation.total_bps, 4),
            final_rate,
            lines: allocation.lines,
        })
    }

    pub fn market_adjustment(&self, scores: &MarketTrendScores) -> MarketAdjustment {
        MarketAdjustment {
            adjusted_bps: scores.adjusted_bps(),
            max_bps: MarketTrendScores::BENCHMARK_SPREAD_BPS
                + MarketTrendScores::LIQUIDITY_BPS
                + MarketTrendScores::CDS_SPREAD_BPS
                + MarketTrendScores::MARKET_VOLATILITY_BPS
                + MarketTrendScores::RECENT_DEALS_BPS,
        }
    }

    pub fn customer(&self, customer_id: &str) -> Result<CustomerSummary, QuoteServiceError> {
        Ok(self.record(customer_id)?.summary_view())
    }

    pub fn customers(&self) -> Result<Vec<BTreeMap<String, Value>>, QuoteServiceError> {
        let records = self.customers.list()?;
        Ok(records.iter().map(CustomerRecord::detail_view).collect())
    }

    fn record(&self, customer_id: &str) -> Result<CustomerRecord, QuoteServiceError> {
        let customer_id = customer_id.trim();
        self.customers
            .fetch(customer_id)?
            .ok_or_else(|| QuoteServiceError::NotFound(customer_id.to_string()))
    }

    fn factor_profile(&self, request: &FactorsRequest) -> Result<CustomerProfile, QuoteServiceError> {
        let customer_id = request
            .customer_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());

        let mut profile = match customer_id {
            Some(id) => self.record(id)?.profile(),
            None if request.features.is_empty() => {
                return Err(QuoteServiceError::Invalid(
                    "customer_id or features are required.".into(),
                ))
            }
            None => CustomerProfile::new(),
        };
        profile.extend(
            request
                .features
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        derive_relationship_fields(&mut profile);
        Ok(profile)
    }

    fn allocate(
        &self,
        allocator: &BpsAllocator,
        encoder: &FeatureEncoder,
        profile: &CustomerProfile,
    ) -> BpsAllocation {
        let encoded = encoder.encode(allocator.importances().features(), profile);
        allocator.allocate(&encoded)
    }

    async fn relationship_strength(&self, input: &ScoringInput) -> Result<f64, QuoteServiceError> {
        let encoded = self.relationship_encoder.encode(
            self.classifier.feature_names().iter().map(String::as_str),
            &input.profile,
        );
        let classifier = Arc::clone(&self.classifier);
        let [retained, _] = guarded(self.settings.policy, "relationship classifier", move || {
            classifier.predict_proba(&encoded)
        })
        .await?;
        Ok(retained)
    }

    async fn risk_score(&self, input: &ScoringInput) -> Result<f64, QuoteServiceError> {
        let encoded = self.risk_encoder.encode(
            self.regressor.feature_names().iter().map(String::as_str),
            &input.profile,
        );
        let regressor = Arc::clone(&self.regressor);
        let score = guarded(self.settings.policy, "risk regressor", move || {
            regressor.predict(&encoded)
        })
        .await?;
        Ok(score)
    }

    async fn estimate(&self, request: FallbackRequest) -> Result<FallbackOutcome, QuoteServiceError> {
        warn!(
            customer_id = %request.customer_id,
            missing = ?request.missing(),
            "customer record incomplete, using fallback estimator"
        );
        let fallback = Arc::clone(&self.fallback);
        let text = guarded(self.settings.policy, "fallback estimator", move || {
            fallback.estimate(&request)
        })
        .await?;
        Ok(parse_fallback_response(&text))
    }
}

/// Error raised by the quote service.
#[derive(Debug, thiserror::Error)]
pub enum QuoteServiceError {
    #[error("No customer with ID {0}")]
    NotFound(String),
    #[error("{0}")]
    Invalid(String),
    #[error("fallback estimate unusable: {explanation}")]
    FallbackUnparsed { explanation: String },
    #[error(transparent)]
    Upstream(#[from] GuardError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Importance(#[from] ImportanceError),
}
