use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use super::record::CustomerRecord;
use super::repository::{CustomerRepository, RepositoryError};
use crate::pricing::FeatureValue;

pub const ID_COLUMN: &str = "CustomerID";

/// Customer file on disk. The file is re-read on every call so edits made while the
/// service runs are picked up.
#[derive(Debug, Clone)]
pub struct CsvCustomerRepository {
    path: PathBuf,
}

impl CsvCustomerRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<CustomerRecord>, RepositoryError> {
        let file = File::open(&self.path).map_err(|err| {
            RepositoryError::Unavailable(format!("{}: {err}", self.path.display()))
        })?;
        let records = read_customers(file)?;
        debug!(path = %self.path.display(), rows = records.len(), "customer file loaded");
        Ok(records)
    }
}

impl CustomerRepository for CsvCustomerRepository {
    fn fetch(&self, id: &str) -> Result<Option<CustomerRecord>, RepositoryError> {
        let wanted = clean_id(id);
        Ok(self
            .load()?
            .into_iter()
            .find(|record| record.id == wanted))
    }

    fn list(&self) -> Result<Vec<CustomerRecord>, RepositoryError> {
        self.load()
    }
}

/// Parses a customer CSV. Rows without an ID are skipped.
pub fn read_customers<R: Read>(reader: R) -> Result<Vec<CustomerRecord>, RepositoryError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|err| RepositoryError::Unavailable(err.to_string()))?
        .iter()
        .map(clean_id)
        .collect();
    let id_index = headers
        .iter()
        .position(|header| header == ID_COLUMN)
        .ok_or_else(|| RepositoryError::Unavailable(format!("missing {ID_COLUMN} column")))?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|err| RepositoryError::Unavailable(err.to_string()))?;
        let id = row.get(id_index).map(clean_id).unwrap_or_default();
        if id.is_empty() {
            continue;
        }

        let mut record = CustomerRecord::new(id);
        for (index, header) in headers.iter().enumerate() {
            if index == id_index || header.is_empty() {
                continue;
            }
            let cell = row.get(index).and_then(parse_cell);
            record.fields.insert(header.clone(), cell);
        }
        records.push(record);
    }
    Ok(records)
}

/// Empty cells are missing; numeric-looking cells become numbers.
pub(crate) fn parse_cell(raw: &str) -> Option<FeatureValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => Some(FeatureValue::Number(number)),
        _ => Some(FeatureValue::Text(trimmed.to_string())),
    }
}

fn clean_id(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}
