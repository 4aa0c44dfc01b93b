//! Quote orchestration: customer lookup, scoring or fallback, composition, and the
//! breakdown views, exposed through an axum router.

pub mod domain;
pub mod inputs;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    DepositFactors, DepositQuote, FactorLine, FactorsRequest, HealthBreakdown, LoanFactors,
    LoanQuote, MarketAdjustment, Product, RateQuoteRequest, ScoreSource,
};
pub use inputs::{relationship_input, risk_input, ScoringInput, RELATIONSHIP_FEATURES, RISK_FEATURES};
pub use router::quote_router;
pub use service::{QuoteServiceError, QuoteSettings, RateQuoteService};
