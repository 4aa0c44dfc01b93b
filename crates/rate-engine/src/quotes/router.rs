use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{FactorsRequest, Product, RateQuoteRequest};
use super::service::{QuoteServiceError, RateQuoteService};
use crate::customers::{CustomerRepository, RepositoryError};
use crate::models::{FallbackEstimator, RelationshipClassifier, RiskRegressor};
use crate::pricing::MarketTrendScores;

type SharedService<R, C, G, F> = Arc<RateQuoteService<R, C, G, F>>;

/// Router builder exposing the quoting, breakdown and customer endpoints.
pub fn quote_router<R, C, G, F>(service: SharedService<R, C, G, F>) -> Router
where
    R: CustomerRepository + 'static,
    C: RelationshipClassifier + 'static,
    G: RiskRegressor + 'static,
    F: FallbackEstimator + 'static,
{
    Router::new()
        .route(
            "/api/v1/house-loan/rate",
            post(house_loan_rate_handler::<R, C, G, F>),
        )
        .route(
            "/api/v1/fixed-deposit/rate",
            post(fixed_deposit_rate_handler::<R, C, G, F>),
        )
        .route(
            "/api/v1/house-loan/factors",
            post(house_loan_factors_handler::<R, C, G, F>),
        )
        .route(
            "/api/v1/fixed-deposit/factors",
            post(fixed_deposit_factors_handler::<R, C, G, F>),
        )
        .route(
            "/api/v1/house-loan/health/:customer_id",
            get(house_loan_health_handler::<R, C, G, F>),
        )
        .route(
            "/api/v1/fixed-deposit/health/:customer_id",
            get(fixed_deposit_health_handler::<R, C, G, F>),
        )
        .route(
            "/api/v1/market/adjustment",
            post(market_adjustment_handler::<R, C, G, F>),
        )
        .route("/api/v1/customers", get(customers_handler::<R, C, G, F>))
        .route(
            "/api/v1/customers/:customer_id",
            get(customer_handler::<R, C, G, F>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct HealthQuery {
    base_rate: f64,
}

pub(crate) async fn house_loan_rate_handler<R, C, G, F>(
    State(service): State<SharedService<R, C, G, F>>,
    payload: Result<axum::Json<RateQuoteRequest>, JsonRejection>,
) -> Response
where
    R: CustomerRepository + 'static,
    C: RelationshipClassifier + 'static,
    G: RiskRegressor + 'static,
    F: FallbackEstimator + 'static,
{
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    match service.quote_house_loan(&request).await {
        Ok(quote) => (StatusCode::OK, axum::Json(quote)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fixed_deposit_rate_handler<R, C, G, F>(
    State(service): State<SharedService<R, C, G, F>>,
    payload: Result<axum::Json<RateQuoteRequest>, JsonRejection>,
) -> Response
where
    R: CustomerRepository + 'static,
    C: RelationshipClassifier + 'static,
    G: RiskRegressor + 'static,
    F: FallbackEstimator + 'static,
{
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    match service.quote_fixed_deposit(&request).await {
        Ok(quote) => (StatusCode::OK, axum::Json(quote)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn house_loan_factors_handler<R, C, G, F>(
    State(service): State<SharedService<R, C, G, F>>,
    payload: Result<axum::Json<FactorsRequest>, JsonRejection>,
) -> Response
where
    R: CustomerRepository + 'static,
    C: RelationshipClassifier + 'static,
    G: RiskRegressor + 'static,
    F: FallbackEstimator + 'static,
{
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    match service.house_loan_factors(&request) {
        Ok(factors) => (StatusCode::OK, axum::Json(factors)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fixed_deposit_factors_handler<R, C, G, F>(
    State(service): State<SharedService<R, C, G, F>>,
    payload: Result<axum::Json<FactorsRequest>, JsonRejection>,
) -> Response
where
    R: CustomerRepository + 'static,
    C: RelationshipClassifier + 'static,
    G: RiskRegressor + 'static,
    F: FallbackEstimator + 'static,
{
    let axum::Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    match service.fixed_deposit_factors(&request) {
        Ok(factors) => (StatusCode::OK, axum::Json(factors)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn house_loan_health_handler<R, C, G, F>(
    State(service): State<SharedService<R, C, G, F>>,
    Path(customer_id): Path<String>,
    query: Result<Query<HealthQuery>, QueryRejection>,
) -> Response
where
    R: CustomerRepository + 'static,
    C: RelationshipClassifier + 'static,
    G: RiskRegressor + 'static,
    F: FallbackEstimator + 'static,
{
    health_response(&service, &customer_id, Product::HouseLoan, query)
}

pub(crate) async fn fixed_deposit_health_handler<R, C, G, F>(
    State(service): State<SharedService<R, C, G, F>>,
    Path(customer_id): Path<String>,
    query: Result<Query<HealthQuery>, QueryRejection>,
) -> Response
where
    R: CustomerRepository + 'static,
    C: RelationshipClassifier + 'static,
    G: RiskRegressor + 'static,
    F: FallbackEstimator + 'static,
{
    health_response(&service, &customer_id, Product::FixedDeposit, query)
}

fn health_response<R, C, G, F>(
    service: &RateQuoteService<R, C, G, F>,
    customer_id: &str,
    product: Product,
    query: Result<Query<HealthQuery>, QueryRejection>,
) -> Response
where
    R: CustomerRepository + 'static,
    C: RelationshipClassifier + 'static,
    G: RiskRegressor + 'static,
    F: FallbackEstimator + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    match service.health_breakdown(customer_id, product, query.base_rate) {
        Ok(breakdown) => (StatusCode::OK, axum::Json(breakdown)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn market_adjustment_handler<R, C, G, F>(
    State(service): State<SharedService<R, C, G, F>>,
    payload: Result<axum::Json<MarketTrendScores>, JsonRejection>,
) -> Response
where
    R: CustomerRepository + 'static,
    C: RelationshipClassifier + 'static,
    G: RiskRegressor + 'static,
    F: FallbackEstimator + 'static,
{
    match payload {
        Ok(axum::Json(scores)) => {
            let adjustment = service.market_adjustment(&scores);
            (StatusCode::OK, axum::Json(adjustment)).into_response()
        }
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

pub(crate) async fn customers_handler<R, C, G, F>(
    State(service): State<SharedService<R, C, G, F>>,
) -> Response
where
    R: CustomerRepository + 'static,
    C: RelationshipClassifier + 'static,
    G: RiskRegressor + 'static,
    F: FallbackEstimator + 'static,
{
    match service.customers() {
        Ok(details) => {
            let payload = json!({ "details": details });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn customer_handler<R, C, G, F>(
    State(service): State<SharedService<R, C, G, F>>,
    Path(customer_id): Path<String>,
) -> Response
where
    R: CustomerRepository + 'static,
    C: RelationshipClassifier + 'static,
    G: RiskRegressor + 'static,
    F: FallbackEstimator + 'static,
{
    match service.customer(&customer_id) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

fn bad_request(message: String) -> Response {
    let payload = json!({
        "error": message,
    });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

fn error_response(error: QuoteServiceError) -> Response {
    match error {
        QuoteServiceError::NotFound(_)
        | QuoteServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        QuoteServiceError::Invalid(message) => bad_request(message),
        QuoteServiceError::FallbackUnparsed { explanation } => {
            let payload = json!({
                "CRS": serde_json::Value::Null,
                "RAS": serde_json::Value::Null,
                "explanation": explanation,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        QuoteServiceError::Upstream(error) => {
            tracing::error!(%error, "collaborator call failed");
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        other => {
            tracing::error!(error = %other, "quote request failed");
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
