//! End-to-end quoting against the sample artifacts shipped in `data/`.
//!
//! The scenarios load the training sets, model definitions and customer file from disk the same
//! way the service binary does, then drive the public service facade and router.

mod common {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use rate_engine::artifacts::PricingArtifacts;
    use rate_engine::config::{FallbackConfig, PricingConfig};
    use rate_engine::customers::CsvCustomerRepository;
    use rate_engine::models::{CallPolicy, LinearRegressor, LogisticClassifier, UnavailableEstimator};
    use rate_engine::pricing::{LoanBlend, STANDARD_DEPOSIT_WEIGHTS};
    use rate_engine::quotes::{QuoteSettings, RateQuoteService};

    pub(super) type SampleService = RateQuoteService<
        CsvCustomerRepository,
        LogisticClassifier,
        LinearRegressor,
        UnavailableEstimator,
    >;

    fn data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
    }

    pub(super) fn sample_config() -> PricingConfig {
        let data = data_dir();
        PricingConfig {
            customers_csv: data.join("customers.csv"),
            models_json: data.join("models.json"),
            relationship_training_csv: data.join("training/relationship.csv"),
            risk_training_csv: data.join("training/risk.csv"),
            loan_blend: LoanBlend::Primary,
            fallback: FallbackConfig::default(),
            collaborator_timeout: Duration::from_secs(5),
        }
    }

    pub(super) fn sample_service() -> Arc<SampleService> {
        let config = sample_config();
        let artifacts = PricingArtifacts::load(&config).expect("sample artifacts load");
        let service = RateQuoteService::new(
            Arc::new(CsvCustomerRepository::new(config.customers_csv.clone())),
            Arc::new(artifacts.classifier),
            Arc::new(artifacts.regressor),
            Arc::new(UnavailableEstimator),
            &artifacts.relationship,
            &artifacts.risk,
            QuoteSettings {
                loan_blend: config.loan_blend,
                deposit_weights: STANDARD_DEPOSIT_WEIGHTS,
                policy: CallPolicy::new(config.collaborator_timeout),
            },
        )
        .expect("service builds");
        Arc::new(service)
    }
}

mod quoting {
    use super::common::*;

    use rate_engine::models::GuardError;
    use rate_engine::pricing::BpsBounds;
    use rate_engine::quotes::{Product, QuoteServiceError, RateQuoteRequest, ScoreSource};

    fn request(customer_id: &str, amount: f64, duration: f64, base_rate: f64) -> RateQuoteRequest {
        RateQuoteRequest {
            customer_id: Some(customer_id.to_string()),
            amount: Some(amount),
            duration: Some(duration),
            base_rate: Some(base_rate),
        }
    }

    #[tokio::test]
    async fn complete_customers_get_a_discounted_loan_rate() {
        let service = sample_service();

        let quote = service
            .quote_house_loan(&request("C-1001", 250000.0, 15.0, 8.5))
            .await
            .expect("loan quote");

        let bounds = BpsBounds::default();
        assert_eq!(quote.source, ScoreSource::Models);
        assert!((0.0..=1.0).contains(&quote.crs));
        assert!(quote.bps >= bounds.min_bps && quote.bps <= bounds.max_bps);
        assert!(quote.final_rate < 8.5);
        assert_eq!(quote.bps_deduction, quote.bps / 100.0);
    }

    #[tokio::test]
    async fn deposits_earn_a_bonus_over_the_base_rate() {
        let service = sample_service();

        let quote = service
            .quote_fixed_deposit(&request("C-1003", 2_000_000.0, 3.0, 6.0))
            .await
            .expect("deposit quote");

        assert_eq!(quote.source, ScoreSource::Models);
        assert!(quote.bonus_bps > 0.0);
        assert!(quote.final_rate > 6.0);
    }

    #[tokio::test]
    async fn incomplete_rows_need_a_fallback_endpoint() {
        let service = sample_service();

        let error = service
            .quote_house_loan(&request("C-1002", 90000.0, 10.0, 9.0))
            .await
            .expect_err("no fallback configured");

        assert!(matches!(
            error,
            QuoteServiceError::Upstream(GuardError::Failed {
                collaborator: "fallback estimator",
                ..
            })
        ));
    }

    #[test]
    fn static_breakdown_is_available_without_the_models() {
        let service = sample_service();

        let breakdown = service
            .health_breakdown("C-1002", Product::HouseLoan, 9.0)
            .expect("breakdown");

        assert!(!breakdown.lines.is_empty());
        assert!(breakdown.final_rate <= 9.0);
        assert!(breakdown
            .lines
            .iter()
            .all(|line| (0.0..=100.0).contains(&line.health)));
    }
}

mod routing {
    use super::common::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use rate_engine::quotes::quote_router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    #[tokio::test]
    async fn customer_listing_marks_missing_cells() {
        let router = quote_router(sample_service());

        let response = router
            .oneshot(
                Request::get("/api/v1/customers")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let body: Value = serde_json::from_slice(&bytes).expect("json body");
        let details = body["details"].as_array().expect("details listed");
        assert_eq!(details.len(), 3);

        let incomplete = details
            .iter()
            .find(|row| row["CustomerID"] == json!("C-1002"))
            .expect("C-1002 listed");
        assert_eq!(incomplete["CheckingAccountBalance"], json!("Not Obtained"));
    }

    #[tokio::test]
    async fn loan_quotes_round_trip_through_http() {
        let router = quote_router(sample_service());

        let response = router
            .oneshot(
                Request::post("/api/v1/house-loan/rate")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({
                            "customer_id": "C-1003",
                            "LoanAmount": 400000,
                            "LoanDuration": 20,
                            "BaseRate": 8.75
                        })
                        .to_string(),
                    ))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let body: Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["customer_id"], json!("C-1003"));
        assert_eq!(body["source"], json!("models"));
        assert!(body["FinalRate"].as_f64().is_some_and(|rate| rate < 8.75));
    }
}
