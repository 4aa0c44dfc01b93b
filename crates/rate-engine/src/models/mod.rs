//! Collaborator seams for the trained scorers and the language-model fallback.
//!
//! The pricing core never calls these directly; the quote service runs them on the
//! blocking pool through [`guard::guarded`].

pub mod fallback;
pub mod guard;
pub mod linear;

use crate::pricing::EncodedProfile;

pub use fallback::{
    parse_fallback_response, FallbackError, FallbackEstimator, FallbackOutcome, FallbackProduct,
    FallbackRequest, HttpFallbackEstimator, UnavailableEstimator,
};
pub use guard::{guarded, CallPolicy, GuardError};
pub use linear::{LinearRegressor, LinearSpec, LinearTerm, LogisticClassifier};

/// Binary classifier whose class-0 probability is the customer relationship strength.
pub trait RelationshipClassifier: Send + Sync {
    /// Fixed feature order the importances are aligned to.
    fn feature_names(&self) -> &[String];
    fn predict_proba(&self, features: &EncodedProfile) -> Result<[f64; 2], ModelError>;
    fn feature_importances(&self) -> Vec<f64>;
}

/// Regressor producing a 0-100 risk score.
pub trait RiskRegressor: Send + Sync {
    fn feature_names(&self) -> &[String];
    fn predict(&self, features: &EncodedProfile) -> Result<f64, ModelError>;
    /// Gain per feature. Features the model never uses are absent.
    fn gain_scores(&self) -> Vec<(String, f64)>;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model definition is invalid: {0}")]
    InvalidDefinition(String),
    #[error("model inference failed: {0}")]
    Inference(String),
}
