//! Session state for one interactive user.
//!
//! A `Session` owns the contracts of the latest successful upload and the
//! fixed income typed for each salesperson. Surfaces hold one per user and pass
//! it by reference into every operation; there is no process-wide state.

use crate::allocator::AllocationError;
use crate::registry::{FixedIncomeRegistry, RegistryError};
use crate::report::{build_report, summarize};
use apportion_types::{
    AllocationReport, ContractRecord, FixedIncome, IngestionSummary, SalespersonSummary,
};
use std::collections::HashMap;
use tracing::info;

/// Contract positions grouped by salesperson, built once per upload.
#[derive(Debug, Clone, Default)]
struct SalespersonIndex {
    /// Distinct names in order of first appearance.
    order: Vec<String>,
    positions: HashMap<String, Vec<usize>>,
}

impl SalespersonIndex {
    fn build(contracts: &[ContractRecord]) -> Self {
        let mut index = Self::default();
        for (position, record) in contracts.iter().enumerate() {
            match index.positions.get_mut(&record.salesperson) {
                Some(positions) => positions.push(position),
                None => {
                    index.order.push(record.salesperson.clone());
                    index.positions.insert(record.salesperson.clone(), vec![position]);
                }
            }
        }
        index
    }

    fn positions(&self, salesperson: &str) -> &[usize] {
        self.positions.get(salesperson).map(Vec::as_slice).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    contracts: Vec<ContractRecord>,
    index: SalespersonIndex,
    dropped_rows: usize,
    registry: FixedIncomeRegistry,
    retain_fixed_income: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session that keeps fixed income across uploads.
    pub fn new() -> Self {
        Self::with_retention(true)
    }

    /// A session whose fixed income survives `reset` only if `retain_fixed_income` is set.
    pub fn with_retention(retain_fixed_income: bool) -> Self {
        Self {
            contracts: Vec::new(),
            index: SalespersonIndex::default(),
            dropped_rows: 0,
            registry: FixedIncomeRegistry::new(),
            retain_fixed_income,
        }
    }

    /// Replaces the contract set with a freshly ingested one.
    ///
    /// Every salesperson in `contracts` gets a registry entry; entries typed for
    /// the previous upload are kept when the session retains fixed income.
    pub fn load_contracts(&mut self, contracts: Vec<ContractRecord>, dropped_rows: usize) {
        self.reset();
        self.index = SalespersonIndex::build(&contracts);
        self.contracts = contracts;
        self.dropped_rows = dropped_rows;
        self.registry.upsert_salesperson_list(&self.index.order);
        info!(
            contracts = self.contracts.len(),
            dropped_rows,
            salespeople = self.index.order.len(),
            "loaded contract set"
        );
    }

    /// Forgets the current contracts, as on a new upload or a failed one.
    pub fn reset(&mut self) {
        self.contracts.clear();
        self.index = SalespersonIndex::default();
        self.dropped_rows = 0;
        if !self.retain_fixed_income {
            self.registry.clear();
        }
    }

    /// Forgets everything, fixed income included.
    pub fn clear(&mut self) {
        self.reset();
        self.registry.clear();
    }

    pub fn contracts(&self) -> &[ContractRecord] {
        &self.contracts
    }

    pub fn has_contracts(&self) -> bool {
        !self.contracts.is_empty()
    }

    pub fn registry(&self) -> &FixedIncomeRegistry {
        &self.registry
    }

    /// Distinct salespeople of the current contracts, in order of first appearance.
    pub fn salespeople(&self) -> Vec<String> {
        self.index.order.clone()
    }

    /// `salesperson`'s contracts, in upload order.
    pub fn contracts_of(&self, salesperson: &str) -> Vec<ContractRecord> {
        self.index
            .positions(salesperson)
            .iter()
            .map(|&position| self.contracts[position].clone())
            .collect()
    }

    pub fn ingestion_summary(&self) -> IngestionSummary {
        IngestionSummary {
            accepted_rows: self.contracts.len(),
            dropped_rows: self.dropped_rows,
            salespeople: self.salespeople(),
        }
    }

    pub fn fixed_income(&self, salesperson: &str) -> FixedIncome {
        self.registry.get(salesperson)
    }

    pub fn set_fixed_income(
        &mut self,
        salesperson: &str,
        salary: f64,
        stipend: f64,
    ) -> Result<(), RegistryError> {
        self.registry.set(salesperson, salary, stipend)
    }

    pub fn summary(&self, salesperson: &str) -> SalespersonSummary {
        let contracts = self.contracts_of(salesperson);
        summarize(salesperson, &contracts, &self.registry.get(salesperson))
    }

    /// Summaries for every salesperson of the current contracts.
    pub fn summaries(&self) -> Vec<SalespersonSummary> {
        self.index.order.iter().map(|name| self.summary(name)).collect()
    }

    /// Allocation of `salesperson`'s fixed income across their contracts.
    ///
    /// A name without contracts is reported as not allocatable, the same as a
    /// salesperson whose contracts sum to zero.
    pub fn report(&self, salesperson: &str) -> Result<AllocationReport, AllocationError> {
        let contracts = self.contracts_of(salesperson);
        build_report(salesperson, &contracts, &self.registry.get(salesperson))
    }
}
