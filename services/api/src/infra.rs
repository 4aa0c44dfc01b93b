use metrics_exporter_prometheus::PrometheusHandle;
use rate_engine::artifacts::PricingArtifacts;
use rate_engine::config::PricingConfig;
use rate_engine::customers::CsvCustomerRepository;
use rate_engine::error::AppError;
use rate_engine::models::{
    CallPolicy, FallbackError, FallbackEstimator, FallbackRequest, HttpFallbackEstimator,
    LinearRegressor, LogisticClassifier, UnavailableEstimator,
};
use rate_engine::pricing::STANDARD_DEPOSIT_WEIGHTS;
use rate_engine::quotes::{QuoteSettings, RateQuoteService};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Fallback estimator chosen from configuration.
pub(crate) enum ConfiguredEstimator {
    Http(HttpFallbackEstimator),
    Unavailable(UnavailableEstimator),
}

impl FallbackEstimator for ConfiguredEstimator {
    fn estimate(&self, request: &FallbackRequest) -> Result<String, FallbackError> {
        match self {
            ConfiguredEstimator::Http(estimator) => estimator.estimate(request),
            ConfiguredEstimator::Unavailable(estimator) => estimator.estimate(request),
        }
    }
}

pub(crate) type ApiService = RateQuoteService<
    CsvCustomerRepository,
    LogisticClassifier,
    LinearRegressor,
    ConfiguredEstimator,
>;

pub(crate) fn build_service(config: &PricingConfig) -> Result<ApiService, AppError> {
    let artifacts = PricingArtifacts::load(config)?;

    let estimator = match &config.fallback.endpoint {
        Some(endpoint) => {
            info!(%endpoint, "fallback estimator enabled");
            ConfiguredEstimator::Http(HttpFallbackEstimator::new(
                endpoint.clone(),
                config.fallback.api_key.clone(),
                config.collaborator_timeout,
            ))
        }
        None => {
            warn!("RATES_FALLBACK_URL not set; incomplete customer records cannot be quoted");
            ConfiguredEstimator::Unavailable(UnavailableEstimator)
        }
    };

    let settings = QuoteSettings {
        loan_blend: config.loan_blend,
        deposit_weights: STANDARD_DEPOSIT_WEIGHTS,
        policy: CallPolicy::new(config.collaborator_timeout),
    };

    let service = RateQuoteService::new(
        Arc::new(CsvCustomerRepository::new(config.customers_csv.clone())),
        Arc::new(artifacts.classifier),
        Arc::new(artifacts.regressor),
        Arc::new(estimator),
        &artifacts.relationship,
        &artifacts.risk,
        settings,
    )?;
    info!(
        customers = %config.customers_csv.display(),
        blend = config.loan_blend.label(),
        "quote service ready"
    );
    Ok(service)
}
