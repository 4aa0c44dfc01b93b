use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::pricing::{CustomerProfile, FeatureValue};

/// Placeholder rendered for empty cells in customer views.
pub const NOT_OBTAINED: &str = "Not Obtained";

/// One customer row. Empty cells are kept as `None` so views can report them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRecord {
    pub id: String,
    pub fields: BTreeMap<String, Option<FeatureValue>>,
}

impl CustomerRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, column: &str, value: impl Into<FeatureValue>) -> Self {
        self.fields.insert(column.to_string(), Some(value.into()));
        self
    }

    pub fn with_missing(mut self, column: &str) -> Self {
        self.fields.insert(column.to_string(), None);
        self
    }

    pub fn value(&self, column: &str) -> Option<&FeatureValue> {
        self.fields.get(column).and_then(Option::as_ref)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.value(column).and_then(FeatureValue::numeric)
    }

    /// Present cells only; absent ones are left for downstream defaults.
    pub fn profile(&self) -> CustomerProfile {
        self.fields
            .iter()
            .filter_map(|(column, value)| value.clone().map(|value| (column.clone(), value)))
            .collect()
    }

    fn json_cell(&self, column: &str) -> Value {
        match self.value(column) {
            Some(FeatureValue::Number(number)) => serde_json::Number::from_f64(*number)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(NOT_OBTAINED.to_string())),
            Some(FeatureValue::Text(text)) => Value::String(text.clone()),
            None => Value::String(NOT_OBTAINED.to_string()),
        }
    }

    /// Every column, with empty cells rendered as "Not Obtained".
    pub fn detail_view(&self) -> BTreeMap<String, Value> {
        let mut view: BTreeMap<String, Value> = self
            .fields
            .keys()
            .map(|column| (column.clone(), self.json_cell(column)))
            .collect();
        view.insert("CustomerID".to_string(), Value::String(self.id.clone()));
        view
    }

    pub fn summary_view(&self) -> CustomerSummary {
        CustomerSummary {
            customer_id: self.id.clone(),
            customer_name: self.json_cell("CustomerName"),
            age: self.json_cell("Age"),
            credit_score: self.json_cell("CreditScore"),
            marital_status: self.json_cell("MaritalStatus"),
            education_level: self.json_cell("EducationLevel"),
            annual_income: self.json_cell("AnnualIncome"),
            home_ownership_status: self.json_cell("HomeOwnershipStatus"),
        }
    }
}

/// Minimal customer card shown before quoting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    #[serde(rename = "CustomerName")]
    pub customer_name: Value,
    #[serde(rename = "Age")]
    pub age: Value,
    #[serde(rename = "CreditScore")]
    pub credit_score: Value,
    #[serde(rename = "MaritalStatus")]
    pub marital_status: Value,
    #[serde(rename = "EducationLevel")]
    pub education_level: Value,
    #[serde(rename = "AnnualIncome")]
    pub annual_income: Value,
    #[serde(rename = "HomeOwnershipStatus")]
    pub home_ownership_status: Value,
}
