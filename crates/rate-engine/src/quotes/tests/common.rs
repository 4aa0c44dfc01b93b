use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::response::Response;
use serde_json::Value;

use crate::artifacts::{TrainingArtifacts, TrainingSchema};
use crate::customers::{CustomerRecord, InMemoryCustomerRepository};
use crate::models::{
    FallbackError, FallbackEstimator, FallbackRequest, ModelError, RelationshipClassifier,
    RiskRegressor,
};
use crate::pricing::EncodedProfile;
use crate::quotes::{QuoteSettings, RateQuoteService};

pub(super) const RELATIONSHIP_TRAINING: &str = "\
CreditScore,Geography,Gender,Age,Tenure,Balance,NumOfProducts,HasCrCard,IsActiveMember,EstimatedSalary,Exited
350,France,Female,18,0,0,1,0,0,10000,1
850,Spain,Male,92,10,250000,4,1,1,200000,0
620,Germany,Female,45,5,90000,2,1,0,85000,0
";

pub(super) const RISK_TRAINING: &str = "\
Age,CreditScore,EmploymentStatus,EducationLevel,MaritalStatus,HomeOwnershipStatus,LoanPurpose,LoanAmount,DebtToIncomeRatio,RiskScore
21,400,Unemployed,High School,Single,Rent,Auto,5000,0.9,80
65,840,Employed,Doctorate,Married,Own,Home,500000,0.05,20
40,650,Self-Employed,Bachelor,Divorced,Mortgage,Education,120000,0.35,50
";

pub(super) fn relationship_artifacts() -> TrainingArtifacts {
    TrainingArtifacts::from_reader(
        RELATIONSHIP_TRAINING.as_bytes(),
        &TrainingSchema::relationship(),
    )
    .expect("relationship training data loads")
}

pub(super) fn risk_artifacts() -> TrainingArtifacts {
    TrainingArtifacts::from_reader(RISK_TRAINING.as_bytes(), &TrainingSchema::risk())
        .expect("risk training data loads")
}

/// Every relationship and risk input filled in.
pub(super) fn complete_customer() -> CustomerRecord {
    CustomerRecord::new("C-1001")
        .with("CustomerName", "Arun Mehta")
        .with("CreditScore", 780.0)
        .with("Geography", "Spain")
        .with("Gender", "Male")
        .with("Age", 41.0)
        .with("Tenure", 7.0)
        .with("NumOfProducts", 2.0)
        .with("HasCrCard", 1.0)
        .with("IsActiveMember", 1.0)
        .with("AnnualIncome", 120000.0)
        .with("MonthlyIncome", 10000.0)
        .with("EmploymentStatus", "Employed")
        .with("EducationLevel", "Master")
        .with("Experience", 15.0)
        .with("MaritalStatus", "Married")
        .with("NumberOfDependents", 2.0)
        .with("HomeOwnershipStatus", "Own")
        .with("MonthlyDebtPayments", 900.0)
        .with("CreditCardUtilizationRate", 0.2)
        .with("NumberOfOpenCreditLines", 3.0)
        .with("NumberOfCreditInquiries", 1.0)
        .with("DebtToIncomeRatio", 0.18)
        .with("BankruptcyHistory", 0.0)
        .with("LoanPurpose", "Home")
        .with("PreviousLoanDefaults", 0.0)
        .with("PaymentHistory", 24.0)
        .with("LengthOfCreditHistory", 14.0)
        .with("SavingsAccountBalance", 42000.0)
        .with("CheckingAccountBalance", 8000.0)
        .with("TotalAssets", 380000.0)
        .with("TotalLiabilities", 95000.0)
        .with("UtilityBillsPaymentHistory", 0.95)
        .with("JobTenure", 6.0)
        .with("NetWorth", 285000.0)
        .with("BaseInterestRate", 0.21)
        .with("InterestRate", 0.23)
        .with("MonthlyLoanPayment", 1450.0)
        .with("TotalDebtToIncomeRatio", 0.27)
}

/// Same customer with an empty checking balance, so `Balance` cannot be derived.
pub(super) fn incomplete_customer() -> CustomerRecord {
    let mut record = complete_customer().with_missing("CheckingAccountBalance");
    record.id = "C-1002".to_string();
    record
}

pub(super) fn repository() -> InMemoryCustomerRepository {
    InMemoryCustomerRepository::with_records([complete_customer(), incomplete_customer()])
}

pub(super) struct StubClassifier {
    names: Vec<String>,
    retained: f64,
}

impl StubClassifier {
    pub(super) fn retaining(retained: f64) -> Self {
        Self {
            names: crate::quotes::RELATIONSHIP_FEATURES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            retained,
        }
    }
}

impl RelationshipClassifier for StubClassifier {
    fn feature_names(&self) -> &[String] {
        &self.names
    }

    fn predict_proba(&self, _features: &EncodedProfile) -> Result<[f64; 2], ModelError> {
        Ok([self.retained, 1.0 - self.retained])
    }

    fn feature_importances(&self) -> Vec<f64> {
        vec![0.14, 0.02, 0.02, 0.24, 0.08, 0.14, 0.13, 0.02, 0.04, 0.17]
    }
}

pub(super) struct StubRegressor {
    names: Vec<String>,
    score: Option<f64>,
}

impl StubRegressor {
    pub(super) fn scoring(score: f64) -> Self {
        Self {
            names: crate::quotes::RISK_FEATURES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            score: Some(score),
        }
    }

    pub(super) fn broken() -> Self {
        Self {
            score: None,
            ..Self::scoring(0.0)
        }
    }
}

impl RiskRegressor for StubRegressor {
    fn feature_names(&self) -> &[String] {
        &self.names
    }

    fn predict(&self, _features: &EncodedProfile) -> Result<f64, ModelError> {
        self.score
            .ok_or_else(|| ModelError::Inference("booster file is corrupt".to_string()))
    }

    fn gain_scores(&self) -> Vec<(String, f64)> {
        vec![
            ("CreditScore".to_string(), 41.0),
            ("DebtToIncomeRatio".to_string(), 33.0),
            ("LoanAmount".to_string(), 12.0),
            ("EmploymentStatus".to_string(), 9.0),
        ]
    }
}

/// Replies with a fixed completion, or fails when no reply is configured.
pub(super) struct ScriptedFallback {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedFallback {
    pub(super) fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn offline() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FallbackEstimator for ScriptedFallback {
    fn estimate(&self, _request: &FallbackRequest) -> Result<String, FallbackError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or(FallbackError::Unavailable)
    }
}

pub(super) type TestService =
    RateQuoteService<InMemoryCustomerRepository, StubClassifier, StubRegressor, ScriptedFallback>;

pub(super) fn build_service_with(
    classifier: StubClassifier,
    regressor: StubRegressor,
    fallback: Arc<ScriptedFallback>,
) -> Arc<TestService> {
    let service = RateQuoteService::new(
        Arc::new(repository()),
        Arc::new(classifier),
        Arc::new(regressor),
        fallback,
        &relationship_artifacts(),
        &risk_artifacts(),
        QuoteSettings::default(),
    )
    .expect("service builds");
    Arc::new(service)
}

pub(super) fn build_service() -> (Arc<TestService>, Arc<ScriptedFallback>) {
    let fallback = Arc::new(ScriptedFallback::replying(
        r#"{"CRS": 0.7, "RAS": 0.3, "explanation": "checking balance missing"}"#,
    ));
    let service = build_service_with(
        StubClassifier::retaining(0.8),
        StubRegressor::scoring(20.0),
        Arc::clone(&fallback),
    );
    (service, fallback)
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

pub(super) fn json_request(method: &str, uri: &str, body: Value) -> axum::http::Request<Body> {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}
