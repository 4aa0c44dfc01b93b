//! Model inputs assembled from a stored customer row.

use crate::customers::CustomerRecord;
use crate::pricing::{CustomerProfile, FeatureValue};

/// Classifier inputs in training order.
pub const RELATIONSHIP_FEATURES: [&str; 10] = [
    "CreditScore",
    "Geography",
    "Gender",
    "Age",
    "Tenure",
    "Balance",
    "NumOfProducts",
    "HasCrCard",
    "IsActiveMember",
    "EstimatedSalary",
];

/// Regressor inputs in training order. Loan amount and duration come from the request.
pub const RISK_FEATURES: [&str; 33] = [
    "Age",
    "AnnualIncome",
    "CreditScore",
    "EmploymentStatus",
    "EducationLevel",
    "Experience",
    "LoanAmount",
    "LoanDuration",
    "MaritalStatus",
    "NumberOfDependents",
    "HomeOwnershipStatus",
    "MonthlyDebtPayments",
    "CreditCardUtilizationRate",
    "NumberOfOpenCreditLines",
    "NumberOfCreditInquiries",
    "DebtToIncomeRatio",
    "BankruptcyHistory",
    "LoanPurpose",
    "PreviousLoanDefaults",
    "PaymentHistory",
    "LengthOfCreditHistory",
    "SavingsAccountBalance",
    "CheckingAccountBalance",
    "TotalAssets",
    "TotalLiabilities",
    "MonthlyIncome",
    "UtilityBillsPaymentHistory",
    "JobTenure",
    "NetWorth",
    "BaseInterestRate",
    "InterestRate",
    "MonthlyLoanPayment",
    "TotalDebtToIncomeRatio",
];

/// One model's input fields, with `None` for anything the row could not supply.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringInput {
    pub profile: CustomerProfile,
    pub fields: Vec<(String, Option<FeatureValue>)>,
}

impl ScoringInput {
    fn collect(profile: CustomerProfile, features: &[&str]) -> Self {
        let fields = features
            .iter()
            .map(|feature| (feature.to_string(), profile.get(*feature).cloned()))
            .collect();
        Self { profile, fields }
    }

    pub fn missing(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.is_some())
    }
}

/// Fills `Balance` (savings plus checking) and `EstimatedSalary` (annual income) when
/// the profile has their sources but not the fields themselves.
pub fn derive_relationship_fields(profile: &mut CustomerProfile) {
    let number = |profile: &CustomerProfile, name: &str| {
        profile.get(name).and_then(FeatureValue::numeric)
    };

    if !profile.contains_key("Balance") {
        if let (Some(savings), Some(checking)) = (
            number(profile, "SavingsAccountBalance"),
            number(profile, "CheckingAccountBalance"),
        ) {
            profile.insert("Balance".to_string(), FeatureValue::Number(savings + checking));
        }
    }
    if !profile.contains_key("EstimatedSalary") {
        if let Some(income) = profile.get("AnnualIncome").cloned() {
            profile.insert("EstimatedSalary".to_string(), income);
        }
    }
}

pub fn relationship_input(record: &CustomerRecord) -> ScoringInput {
    let mut profile = record.profile();
    derive_relationship_fields(&mut profile);
    ScoringInput::collect(profile, &RELATIONSHIP_FEATURES)
}

pub fn risk_input(record: &CustomerRecord, loan_amount: f64, loan_duration: f64) -> ScoringInput {
    let mut profile = record.profile();
    profile.insert("LoanAmount".to_string(), FeatureValue::Number(loan_amount));
    profile.insert("LoanDuration".to_string(), FeatureValue::Number(loan_duration));
    ScoringInput::collect(profile, &RISK_FEATURES)
}

/// Union of both inputs for the fallback prompt, first occurrence wins.
pub fn combined_fields(inputs: &[&ScoringInput]) -> Vec<(String, Option<FeatureValue>)> {
    let mut fields: Vec<(String, Option<FeatureValue>)> = Vec::new();
    for input in inputs {
        for (name, value) in &input.fields {
            if !fields.iter().any(|(seen, _)| seen == name) {
                fields.push((name.clone(), value.clone()));
            }
        }
    }
    fields
}
