//! Per-salesperson totals and allocation reports.

use crate::allocator::{AllocationError, allocate, contract_total};
use apportion_types::{AllocationReport, ContractRecord, FixedIncome, SalespersonSummary};

/// Totals for one salesperson's contracts and fixed income.
pub fn summarize(
    salesperson: &str,
    contracts: &[ContractRecord],
    fixed: &FixedIncome,
) -> SalespersonSummary {
    let contract_total = contract_total(contracts);
    SalespersonSummary {
        salesperson: salesperson.to_string(),
        contract_count: contracts.len(),
        contract_total,
        fixed_income: *fixed,
        grand_total: contract_total + fixed.total(),
    }
}

/// Allocates and summarizes in one go.
///
/// `allocated_sum` is taken from the raw results so it can be compared with
/// the fixed income without going through any formatted text.
pub fn build_report(
    salesperson: &str,
    contracts: &[ContractRecord],
    fixed: &FixedIncome,
) -> Result<AllocationReport, AllocationError> {
    let results = allocate(contracts, fixed)?;
    let allocated_sum = results.iter().map(|r| r.allocated_amount).sum();
    Ok(AllocationReport { summary: summarize(salesperson, contracts, fixed), results, allocated_sum })
}
