use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::record::CustomerRecord;

/// Row-per-customer store queried by ID.
pub trait CustomerRepository: Send + Sync {
    fn fetch(&self, id: &str) -> Result<Option<CustomerRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<CustomerRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("customer not found")]
    NotFound,
    #[error("customer store unavailable: {0}")]
    Unavailable(String),
}

/// Customer store held in memory, keyed by ID.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCustomerRepository {
    records: Arc<Mutex<BTreeMap<String, CustomerRecord>>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = CustomerRecord>,
    {
        let records = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub fn insert(&self, record: CustomerRecord) -> Result<(), RepositoryError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".into()))?;
        guard.insert(record.id.clone(), record);
        Ok(())
    }
}

impl CustomerRepository for InMemoryCustomerRepository {
    fn fetch(&self, id: &str) -> Result<Option<CustomerRecord>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".into()))?;
        Ok(guard.get(id.trim()).cloned())
    }

    fn list(&self) -> Result<Vec<CustomerRecord>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".into()))?;
        Ok(guard.values().cloned().collect())
    }
}
