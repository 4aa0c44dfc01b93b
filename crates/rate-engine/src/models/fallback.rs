use std::fmt::Write as _;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::pricing::FeatureValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackProduct {
    HouseLoan,
    FixedDeposit,
}

/// Everything the estimator is told about a customer whose record is incomplete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackRequest {
    pub product: FallbackProduct,
    pub customer_id: String,
    pub fields: Vec<(String, Option<FeatureValue>)>,
}

impl FallbackRequest {
    /// House loans need a risk score as well as the relationship strength.
    pub fn wants_risk(&self) -> bool {
        matches!(self.product, FallbackProduct::HouseLoan)
    }

    pub fn missing(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn prompt(&self) -> String {
        let mut prompt = String::from(
            "Given the following customer data, estimate the Customer Relationship Strength (CRS)",
        );
        if self.wants_risk() {
            prompt.push_str(" and the Risk Assessment Score (RAS)");
        }
        prompt.push_str(" as fractions between 0 and 1.\nReturn exactly this JSON:\n{\n");
        prompt.push_str("  \"CRS\": <float between 0 and 1, e.g. 0.85>,\n");
        if self.wants_risk() {
            prompt.push_str("  \"RAS\": <float between 0 and 1, e.g. 0.66>,\n");
        }
        prompt.push_str(
            "  \"explanation\": \"Briefly explain how the missing fields were accounted for.\"\n}\n",
        );

        let _ = writeln!(prompt, "Customer {} data:", self.customer_id);
        for (name, value) in &self.fields {
            match value {
                Some(value) => {
                    let _ = writeln!(prompt, "- {name}: {value}");
                }
                None => {
                    let _ = writeln!(prompt, "- {name}: missing");
                }
            }
        }
        prompt
    }
}

/// Result of interpreting an estimator reply. A reply without a usable CRS is never
/// turned into a numeric guess.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FallbackOutcome {
    Scored {
        crs: f64,
        ras: Option<f64>,
        explanation: Option<String>,
    },
    Unparsed {
        explanation: String,
    },
}

/// Reads the first `{` through the last `}` of `text` as JSON.
pub fn parse_fallback_response(text: &str) -> FallbackOutcome {
    let unparsed = || FallbackOutcome::Unparsed {
        explanation: text.trim().to_string(),
    };

    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return unparsed();
    };
    if end < start {
        return unparsed();
    }

    let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(&text[start..=end]) else {
        return unparsed();
    };

    let explanation = fields
        .get("explanation")
        .and_then(Value::as_str)
        .map(str::to_string);

    match unit_score(&fields, "CRS") {
        Some(crs) => FallbackOutcome::Scored {
            crs,
            ras: unit_score(&fields, "RAS"),
            explanation,
        },
        None => FallbackOutcome::Unparsed {
            explanation: explanation.unwrap_or_else(|| text.trim().to_string()),
        },
    }
}

fn unit_score(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = fields
        .get(key)
        .or_else(|| fields.get(&key.to_ascii_lowercase()))?;
    let score = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (score.is_finite() && (0.0..=1.0).contains(&score)).then_some(score)
}

#[derive(Debug, thiserror::Error)]
pub enum FallbackError {
    #[error("no fallback estimator is configured")]
    Unavailable,
    #[error("fallback transport error: {0}")]
    Transport(String),
    #[error("fallback endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Language-model collaborator. Implementations return the raw completion text.
pub trait FallbackEstimator: Send + Sync {
    fn estimate(&self, request: &FallbackRequest) -> Result<String, FallbackError>;
}

/// Used when no endpoint is configured; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableEstimator;

impl FallbackEstimator for UnavailableEstimator {
    fn estimate(&self, _request: &FallbackRequest) -> Result<String, FallbackError> {
        Err(FallbackError::Unavailable)
    }
}

/// Posts `{"prompt": ...}` to a completion endpoint.
#[derive(Debug, Clone)]
pub struct HttpFallbackEstimator {
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpFallbackEstimator {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl FallbackEstimator for HttpFallbackEstimator {
    fn estimate(&self, request: &FallbackRequest) -> Result<String, FallbackError> {
        // Built per call so the blocking client lives and dies on the worker thread.
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|err| FallbackError::Transport(err.to_string()))?;

        let mut call = client
            .post(&self.endpoint)
            .json(&json!({ "prompt": request.prompt() }));
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }

        let response = call
            .send()
            .map_err(|err| FallbackError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| FallbackError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(FallbackError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(completion_text(body))
    }
}

/// Unwraps `{"text": ...}`-style envelopes; anything else is returned verbatim.
fn completion_text(body: String) -> String {
    if let Ok(Value::Object(envelope)) = serde_json::from_str::<Value>(&body) {
        for key in ["text", "output", "completion"] {
            if let Some(text) = envelope.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(product: FallbackProduct) -> FallbackRequest {
        FallbackRequest {
            product,
            customer_id: "C-1007".to_string(),
            fields: vec![
                ("CreditScore".to_string(), Some(FeatureValue::Number(702.0))),
                ("Geography".to_string(), None),
                ("Gender".to_string(), Some("Female".into())),
            ],
        }
    }

    #[test]
    fn extracts_json_embedded_in_prose() {
        let reply = "Sure! Here is my estimate:\n```json\n{\n  \"CRS\": 0.72,\n  \"RAS\": \"0.41\",\n  \"explanation\": \"Geography missing; weighted on credit score.\"\n}\n```";
        assert_eq!(
            parse_fallback_response(reply),
            FallbackOutcome::Scored {
                crs: 0.72,
                ras: Some(0.41),
                explanation: Some("Geography missing; weighted on credit score.".to_string()),
            }
        );
    }

    #[test]
    fn garbage_becomes_an_unparsed_outcome_with_the_raw_text() {
        let reply = "  I do not know enough about this customer.  ";
        assert_eq!(
            parse_fallback_response(reply),
            FallbackOutcome::Unparsed {
                explanation: "I do not know enough about this customer.".to_string(),
            }
        );
        assert!(matches!(
            parse_fallback_response("} backwards {"),
            FallbackOutcome::Unparsed { .. }
        ));
    }

    #[test]
    fn null_or_out_of_range_scores_are_not_guessed() {
        let reply = r#"{"CRS": null, "RAS": null, "explanation": "insufficient data"}"#;
        assert_eq!(
            parse_fallback_response(reply),
            FallbackOutcome::Unparsed {
                explanation: "insufficient data".to_string(),
            }
        );

        let reply = r#"{"CRS": 85, "explanation": "percent instead of fraction"}"#;
        assert!(matches!(
            parse_fallback_response(reply),
            FallbackOutcome::Unparsed { .. }
        ));
    }

    #[test]
    fn deposit_replies_may_omit_risk() {
        let reply = r#"{"CRS": 0.6, "explanation": "tenure only"}"#;
        match parse_fallback_response(reply) {
            FallbackOutcome::Scored { crs, ras, .. } => {
                assert_eq!(crs, 0.6);
                assert_eq!(ras, None);
            }
            other => panic!("expected a score, got {other:?}"),
        }
    }

    #[test]
    fn prompt_lists_fields_and_asks_for_risk_only_on_loans() {
        let loan = request(FallbackProduct::HouseLoan).prompt();
        assert!(loan.contains("\"RAS\""));
        assert!(loan.contains("- Geography: missing"));
        assert!(loan.contains("- CreditScore: 702"));

        let deposit = request(FallbackProduct::FixedDeposit);
        assert!(!deposit.prompt().contains("\"RAS\""));
        assert_eq!(deposit.missing(), vec!["Geography"]);
    }

    #[test]
    fn completion_envelopes_are_unwrapped() {
        assert_eq!(
            completion_text(r#"{"text": "{\"CRS\": 0.5}"}"#.to_string()),
            "{\"CRS\": 0.5}"
        );
        assert_eq!(completion_text("plain".to_string()), "plain");
    }

    #[test]
    fn unavailable_estimator_always_fails() {
        let error = UnavailableEstimator
            .estimate(&request(FallbackProduct::HouseLoan))
            .expect_err("no endpoint");
        assert!(matches!(error, FallbackError::Unavailable));
    }
}
