//! Customer store: records keyed by ID plus the views the HTTP surface renders.

pub mod csv_store;
pub mod record;
pub mod repository;

pub use csv_store::{read_customers, CsvCustomerRepository, ID_COLUMN};
pub use record::{CustomerRecord, CustomerSummary, NOT_OBTAINED};
pub use repository::{CustomerRepository, InMemoryCustomerRepository, RepositoryError};
