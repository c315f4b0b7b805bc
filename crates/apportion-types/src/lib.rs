//! Apportion Types
//!
//! This crate defines the data model shared by every Apportion crate: the
//! contract rows produced by ingestion, the fixed income entered per
//! salesperson, and the derived allocation results. Keeping them here lets
//! `apportion-calculator` and `apportion-io` depend on each other's outputs
//! without a dependency cycle.

#![deny(missing_docs)]

mod types;
pub use types::{
    AllocationReport, AllocationResult, ContractRecord, FixedIncome, IngestionSummary,
    SalespersonSummary,
};
