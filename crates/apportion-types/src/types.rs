use serde::{Deserialize, Serialize};
use std::fmt;

/// One contract row accepted by ingestion.
///
/// Records are immutable once ingested; a new upload replaces the whole set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractRecord {
    /// Name of the salesperson the contract belongs to.
    pub salesperson: String,
    /// Contract identifier as it appeared in the source file.
    pub contract_id: String,
    /// Monetary value of the contract. Never negative.
    pub amount: f64,
}

impl ContractRecord {
    /// Creates a new record.
    pub fn new(salesperson: impl Into<String>, contract_id: impl Into<String>, amount: f64) -> Self {
        Self { salesperson: salesperson.into(), contract_id: contract_id.into(), amount }
    }
}

/// Salary and stipend entered for one salesperson.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct FixedIncome {
    /// Fixed salary.
    pub salary: f64,
    /// Stipend paid on top of the salary.
    pub stipend: f64,
}

impl FixedIncome {
    /// Creates a new entry.
    pub const fn new(salary: f64, stipend: f64) -> Self {
        Self { salary, stipend }
    }

    /// Combined fixed income, the lump sum distributed across contracts.
    pub fn total(&self) -> f64 {
        self.salary + self.stipend
    }
}

impl fmt::Display for FixedIncome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "salary={} stipend={}", self.salary, self.stipend)
    }
}

/// Share of a salesperson's fixed income attributed to one contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationResult {
    /// Contract identifier.
    pub contract_id: String,
    /// Contract value the proportion was derived from.
    pub contract_amount: f64,
    /// `contract_amount` divided by the salesperson's contract total, in `0..=1`.
    pub proportion: f64,
    /// `proportion` multiplied by the combined fixed income.
    pub allocated_amount: f64,
}

/// Totals shown for a salesperson next to the fixed-income inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalespersonSummary {
    /// Salesperson name.
    pub salesperson: String,
    /// Number of contracts attributed to the salesperson.
    pub contract_count: usize,
    /// Sum of contract amounts.
    pub contract_total: f64,
    /// Fixed income currently registered.
    pub fixed_income: FixedIncome,
    /// `contract_total` plus the combined fixed income.
    pub grand_total: f64,
}

/// Allocation for one salesperson, with the figures needed to verify it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationReport {
    /// Totals for the salesperson.
    pub summary: SalespersonSummary,
    /// One entry per contract, in ingestion order.
    pub results: Vec<AllocationResult>,
    /// Sum of the raw allocated amounts. Equals the combined fixed income.
    pub allocated_sum: f64,
}

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IngestionSummary {
    /// Rows turned into contract records.
    pub accepted_rows: usize,
    /// Rows skipped because a required field was missing or not numeric.
    pub dropped_rows: usize,
    /// Distinct salespeople, in order of first appearance.
    pub salespeople: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_income_total_adds_both_parts() {
        assert_eq!(FixedIncome::new(1000.0, 250.5).total(), 1250.5);
        assert_eq!(FixedIncome::default().total(), 0.0);
    }

    #[test]
    fn contract_record_serializes_with_field_names() {
        let record = ContractRecord::new("ana", "C-1", 10.0);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["salesperson"], "ana");
        assert_eq!(json["contract_id"], "C-1");
        assert_eq!(json["amount"], 10.0);
    }
}
