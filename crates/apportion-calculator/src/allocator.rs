//! Proportional Allocator
//!
//! Distributes a salesperson's combined fixed income across their contracts,
//! weighting each contract by its share of the contract total.
//!
//! proportion = amount / total_amount
//! allocated  = proportion * (salary + stipend)
//!
//! Unlike a plain weighted division, a non-positive total is an error: there is
//! no meaningful share to report, so callers show a notice instead of a table.

use apportion_types::{AllocationResult, ContractRecord, FixedIncome};
use thiserror::Error;

/// Errors raised by the allocation engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    /// The contracts sum to zero (or less), or there are none.
    #[error("cannot allocate fixed income: {contracts} contract(s) with a total of {total}")]
    NotAllocatable { contracts: usize, total: f64 },
}

/// Sum of the contract amounts.
pub fn contract_total(contracts: &[ContractRecord]) -> f64 {
    contracts.iter().map(|c| c.amount).sum()
}

/// Allocates `fixed` across `contracts`, which must all belong to one salesperson.
///
/// The returned results follow the order of `contracts`. Their
/// `allocated_amount`s add up to `fixed.total()` within floating-point error;
/// nothing is rounded here.
pub fn allocate(
    contracts: &[ContractRecord],
    fixed: &FixedIncome,
) -> Result<Vec<AllocationResult>, AllocationError> {
    let total = contract_total(contracts);
    if !total.is_finite() || total <= 0.0 {
        return Err(AllocationError::NotAllocatable { contracts: contracts.len(), total });
    }

    let fixed_total = fixed.total();
    let results = contracts
        .iter()
        .map(|contract| {
            let proportion = contract.amount / total;
            AllocationResult {
                contract_id: contract.contract_id.clone(),
                contract_amount: contract.amount,
                proportion,
                allocated_amount: proportion * fixed_total,
            }
        })
        .collect();

    Ok(results)
}
