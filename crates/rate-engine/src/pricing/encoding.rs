use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw customer attribute as it arrives from a request body or a CSV cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    /// Strict numeric view: numbers, or text that parses as a number.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(value) => Some(*value),
            FeatureValue::Text(text) => text.trim().parse::<f64>().ok(),
        }
    }

    /// Lenient numeric view used when feeding models: yes/no flags become 1/0 and
    /// anything unreadable becomes 0.
    pub fn as_number(&self) -> f64 {
        if let Some(value) = self.numeric() {
            return value;
        }
        match self {
            FeatureValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "yes" | "true" | "y" => 1.0,
                _ => 0.0,
            },
            FeatureValue::Number(_) => 0.0,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Number(value) => write!(f, "{value}"),
            FeatureValue::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Text(value)
    }
}

/// Raw per-request customer attributes keyed by feature name.
pub type CustomerProfile = BTreeMap<String, FeatureValue>;

/// Label encoder fit once on training data. Classes are sorted; unseen labels map
/// to the first class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = values
            .into_iter()
            .map(|value| value.as_ref().trim().to_string())
            .filter(|value| !value.is_empty())
            .collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn encode(&self, label: &str) -> usize {
        let label = label.trim();
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .unwrap_or(0)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label.trim()))
            .is_ok()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Fixed label-to-code table for ordered categories.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalMap {
    codes: BTreeMap<String, f64>,
    default: f64,
}

impl OrdinalMap {
    pub fn new<I, S>(codes: I, default: f64) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(|(label, code)| (label.into(), code))
                .collect(),
            default,
        }
    }

    pub fn employment() -> Self {
        Self::new(
            [("Unemployed", 0.0), ("Self-Employed", 1.0), ("Employed", 2.0)],
            0.0,
        )
    }

    pub fn education() -> Self {
        Self::new(
            [
                ("High School", 0.0),
                ("Associate", 1.0),
                ("Bachelor", 2.0),
                ("Master", 3.0),
                ("Doctorate", 4.0),
            ],
            0.0,
        )
    }

    pub fn lookup(&self, label: &str) -> Option<f64> {
        self.codes.get(label.trim()).copied()
    }

    pub fn encode(&self, label: &str) -> f64 {
        self.lookup(label).unwrap_or(self.default)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoryEncoder {
    Label(LabelEncoder),
    Ordinal(OrdinalMap),
}

impl CategoryEncoder {
    /// Numbers are assumed to be pre-encoded and pass through untouched.
    pub fn encode(&self, value: &FeatureValue) -> f64 {
        match value {
            FeatureValue::Number(number) => *number,
            FeatureValue::Text(text) => match self {
                CategoryEncoder::Label(encoder) => encoder.encode(text) as f64,
                CategoryEncoder::Ordinal(map) => map.encode(text),
            },
        }
    }
}

/// Encoders for every categorical feature of one model's input space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureEncoder {
    encoders: BTreeMap<String, CategoryEncoder>,
}

impl FeatureEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, feature: impl Into<String>, encoder: CategoryEncoder) -> Self {
        self.insert(feature, encoder);
        self
    }

    pub fn insert(&mut self, feature: impl Into<String>, encoder: CategoryEncoder) {
        self.encoders.insert(feature.into(), encoder);
    }

    pub fn get(&self, feature: &str) -> Option<&CategoryEncoder> {
        self.encoders.get(feature)
    }

    pub fn encode_value(&self, feature: &str, value: &FeatureValue) -> f64 {
        match self.encoders.get(feature) {
            Some(encoder) => encoder.encode(value),
            None => value.as_number(),
        }
    }

    /// Builds a total mapping over `features`; anything absent from `profile` is 0.
    pub fn encode<'a, I>(&self, features: I, profile: &CustomerProfile) -> EncodedProfile
    where
        I: IntoIterator<Item = &'a str>,
    {
        let values = features
            .into_iter()
            .map(|feature| {
                let value = profile
                    .get(feature)
                    .map(|raw| self.encode_value(feature, raw))
                    .unwrap_or(0.0);
                (feature.to_string(), value)
            })
            .collect();
        EncodedProfile { values }
    }
}

/// Numeric view of a profile in a model's encoding space.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EncodedProfile {
    values: BTreeMap<String, f64>,
}

impl EncodedProfile {
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(feature, value)| (feature.into(), value))
                .collect(),
        }
    }

    /// Missing features read as 0.
    pub fn value(&self, feature: &str) -> f64 {
        self.values.get(feature).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_encoder_sorts_classes_and_falls_back_to_first() {
        let encoder = LabelEncoder::fit(["Spain", "France", "Germany", "France", ""]);
        assert_eq!(encoder.classes(), ["France", "Germany", "Spain"]);
        assert_eq!(encoder.encode("Spain"), 2);
        assert_eq!(encoder.encode(" Germany "), 1);
        assert_eq!(encoder.encode("Portugal"), 0);
        assert!(!encoder.contains("Portugal"));
    }

    #[test]
    fn ordinal_maps_use_their_default_for_unknown_labels() {
        let employment = OrdinalMap::employment();
        assert_eq!(employment.encode("Employed"), 2.0);
        assert_eq!(employment.encode("Retired"), 0.0);
        assert_eq!(OrdinalMap::education().encode("Master"), 3.0);
    }

    #[test]
    fn numeric_text_and_flags_are_read_leniently() {
        assert_eq!(FeatureValue::from("712").as_number(), 712.0);
        assert_eq!(FeatureValue::from("Yes").as_number(), 1.0);
        assert_eq!(FeatureValue::from("No").as_number(), 0.0);
        assert_eq!(FeatureValue::from("n/a").as_number(), 0.0);
        assert_eq!(FeatureValue::from("n/a").numeric(), None);
    }

    #[test]
    fn encoded_profile_is_total_over_requested_features() {
        let encoder = FeatureEncoder::new()
            .with(
                "Geography",
                CategoryEncoder::Label(LabelEncoder::fit(["France", "Germany", "Spain"])),
            )
            .with(
                "EmploymentStatus",
                CategoryEncoder::Ordinal(OrdinalMap::employment()),
            );

        let mut profile = CustomerProfile::new();
        profile.insert("Geography".into(), "Germany".into());
        profile.insert("EmploymentStatus".into(), "Self-Employed".into());
        profile.insert("Age".into(), 41.0.into());

        let encoded = encoder.encode(
            ["Geography", "EmploymentStatus", "Age", "Tenure"],
            &profile,
        );
        assert_eq!(encoded.len(), 4);
        assert_eq!(encoded.value("Geography"), 1.0);
        assert_eq!(encoded.value("EmploymentStatus"), 1.0);
        assert_eq!(encoded.value("Age"), 41.0);
        assert_eq!(encoded.value("Tenure"), 0.0);
        assert_eq!(encoded.value("NeverRequested"), 0.0);
    }

    #[test]
    fn untagged_values_deserialize_from_json() {
        let profile: CustomerProfile =
            serde_json::from_str(r#"{"Age": 33, "Gender": "Female"}"#).expect("profile parses");
        assert_eq!(profile["Age"], FeatureValue::Number(33.0));
        assert_eq!(profile["Gender"], FeatureValue::Text("Female".into()));
    }
}
