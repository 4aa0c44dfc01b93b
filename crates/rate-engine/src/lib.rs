//! Risk-adjusted rate engine for house loans and fixed deposits.
//!
//! The pricing core lives in [`pricing`] and is free of I/O. Trained models, the
//! customer store, and the language-model fallback are consumed through the traits in
//! [`models`] and [`customers`], and [`quotes`] wires them into a service and router.

pub mod artifacts;
pub mod config;
pub mod customers;
pub mod error;
pub mod models;
pub mod pricing;
pub mod quotes;
pub mod telemetry;
