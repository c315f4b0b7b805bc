//! The allocation engine for Apportion.
//!
//! This crate distributes a salesperson's fixed income (salary plus stipend)
//! across that salesperson's contracts in proportion to each contract's value,
//! and keeps the per-session bookkeeping the interactive surfaces need: the
//! current contract set and the fixed income entered for every salesperson.

pub mod allocator;
pub mod registry;
pub mod report;
pub mod session;

pub use allocator::{AllocationError, allocate, contract_total};
pub use registry::{FixedIncomeRegistry, RegistryError};
pub use report::{build_report, summarize};
pub use session::Session;

pub use apportion_types::{
    AllocationReport, AllocationResult, ContractRecord, FixedIncome, IngestionSummary,
    SalespersonSummary,
};
