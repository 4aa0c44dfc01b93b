//! Static artifacts loaded once at startup: fitted encoders and feature ranges from
//! the training CSVs, plus the scorer definitions.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use tracing::info;

use crate::config::PricingConfig;
use crate::models::{LinearRegressor, LinearSpec, LogisticClassifier, ModelError};
use crate::pricing::{CategoryEncoder, FeatureEncoder, LabelEncoder, OrdinalMap, RangeTable};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("training data is malformed: {0}")]
    Csv(#[from] csv::Error),
    #[error("model definitions are malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("training data has no '{column}' column")]
    MissingColumn { column: String },
    #[error("training data has no rows")]
    Empty,
}

/// How the categorical columns of one training set are encoded.
#[derive(Debug, Clone, Default)]
pub struct TrainingSchema {
    label_columns: Vec<String>,
    ordinal_columns: Vec<(String, OrdinalMap)>,
}

impl TrainingSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, column: &str) -> Self {
        self.label_columns.push(column.to_string());
        self
    }

    pub fn with_ordinal(mut self, column: &str, map: OrdinalMap) -> Self {
        self.ordinal_columns.push((column.to_string(), map));
        self
    }

    /// Churn-style data behind the relationship classifier.
    pub fn relationship() -> Self {
        Self::new().with_label("Geography").with_label("Gender")
    }

    /// Loan-applicant data behind the risk regressor.
    pub fn risk() -> Self {
        Self::new()
            .with_ordinal("EmploymentStatus", OrdinalMap::employment())
            .with_ordinal("EducationLevel", OrdinalMap::education())
            .with_label("MaritalStatus")
            .with_label("HomeOwnershipStatus")
            .with_label("LoanPurpose")
    }

    fn is_categorical(&self, column: &str) -> bool {
        self.label_columns.iter().any(|name| name == column)
            || self.ordinal_columns.iter().any(|(name, _)| name == column)
    }
}

/// Encoders and per-feature ranges derived from one training set.
#[derive(Debug, Clone)]
pub struct TrainingArtifacts {
    pub encoder: FeatureEncoder,
    pub ranges: Arc<RangeTable>,
    pub columns: Vec<String>,
}

impl TrainingArtifacts {
    pub fn from_path(path: &Path, schema: &TrainingSchema) -> Result<Self, ArtifactError> {
        let file = File::open(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifacts = Self::from_reader(file, schema)?;
        info!(
            path = %path.display(),
            ranges = artifacts.ranges.len(),
            "training artifacts loaded"
        );
        Ok(artifacts)
    }

    /// Fits label encoders, applies ordinal maps and records min/max for every
    /// categorical column plus every column whose non-empty cells are all numeric.
    pub fn from_reader<R: Read>(reader: R, schema: &TrainingSchema) -> Result<Self, ArtifactError> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|header| header.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let rows = reader.records().collect::<Result<Vec<StringRecord>, _>>()?;
        if rows.is_empty() {
            return Err(ArtifactError::Empty);
        }

        let column_index = |column: &str| {
            columns
                .iter()
                .position(|name| name == column)
                .ok_or_else(|| ArtifactError::MissingColumn {
                    column: column.to_string(),
                })
        };
        let cells = |index: usize| {
            rows.iter()
                .filter_map(move |row| row.get(index))
                .filter(|cell| !cell.is_empty())
        };

        let mut encoder = FeatureEncoder::new();
        let mut ranges = RangeTable::new();

        for column in &schema.label_columns {
            let index = column_index(column)?;
            let labels = LabelEncoder::fit(cells(index));
            for cell in cells(index) {
                ranges.observe(column, labels.encode(cell) as f64);
            }
            encoder.insert(column.clone(), CategoryEncoder::Label(labels));
        }

        for (column, map) in &schema.ordinal_columns {
            let index = column_index(column)?;
            for code in cells(index).filter_map(|cell| map.lookup(cell)) {
                ranges.observe(column, code);
            }
            encoder.insert(column.clone(), CategoryEncoder::Ordinal(map.clone()));
        }

        for (index, column) in columns.iter().enumerate() {
            if schema.is_categorical(column) {
                continue;
            }
            let numbers: Option<Vec<f64>> = cells(index)
                .map(|cell| cell.parse::<f64>().ok())
                .collect();
            for value in numbers.unwrap_or_default() {
                ranges.observe(column, value);
            }
        }

        Ok(Self {
            encoder,
            ranges: Arc::new(ranges),
            columns,
        })
    }
}

/// `models.json`: one linear definition per scorer.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelBundle {
    pub relationship: LinearSpec,
    pub risk: LinearSpec,
}

impl ModelBundle {
    pub fn from_path(path: &Path) -> Result<Self, ArtifactError> {
        let file = File::open(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_reader(io::BufReader::new(file))?)
    }

    pub fn into_models(self) -> Result<(LogisticClassifier, LinearRegressor), ArtifactError> {
        Ok((
            LogisticClassifier::from_spec(self.relationship)?,
            LinearRegressor::from_spec(self.risk)?,
        ))
    }
}

/// Everything the quote service needs from disk.
#[derive(Debug, Clone)]
pub struct PricingArtifacts {
    pub relationship: TrainingArtifacts,
    pub risk: TrainingArtifacts,
    pub classifier: LogisticClassifier,
    pub regressor: LinearRegressor,
}

impl PricingArtifacts {
    pub fn load(config: &PricingConfig) -> Result<Self, ArtifactError> {
        let relationship = TrainingArtifacts::from_path(
            &config.relationship_training_csv,
            &TrainingSchema::relationship(),
        )?;
        let risk = TrainingArtifacts::from_path(&config.risk_training_csv, &TrainingSchema::risk())?;
        let (classifier, regressor) = ModelBundle::from_path(&config.models_json)?.into_models()?;
        Ok(Self {
            relationship,
            risk,
            classifier,
            regressor,
        })
    }
}
