//! Fixed income entered per salesperson during a session.

use apportion_types::FixedIncome;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// Salary and stipend must be finite and non-negative.
    #[error("invalid {field} for {salesperson}: {value} (must be a non-negative number)")]
    InvalidAmount { salesperson: String, field: &'static str, value: f64 },
}

/// Salesperson name to fixed income.
///
/// Entries are never removed by an upload: a salesperson missing from a new
/// file keeps the values typed earlier and gets them back if they reappear.
#[derive(Debug, Clone, Default)]
pub struct FixedIncomeRegistry {
    entries: BTreeMap<String, FixedIncome>,
}

impl FixedIncomeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures every name has an entry, creating zero-valued ones for new names.
    pub fn upsert_salesperson_list<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            if !self.entries.contains_key(name) {
                debug!(salesperson = name, "registering salesperson with zero fixed income");
                self.entries.insert(name.to_string(), FixedIncome::default());
            }
        }
    }

    /// Overwrites the entry for `name`. Rejected values leave the entry untouched.
    pub fn set(&mut self, name: &str, salary: f64, stipend: f64) -> Result<(), RegistryError> {
        validate(name, "salary", salary)?;
        validate(name, "stipend", stipend)?;
        self.entries.insert(name.to_string(), FixedIncome::new(salary, stipend));
        Ok(())
    }

    /// The entry for `name`, or zero when the name was never registered.
    pub fn get(&self, name: &str) -> FixedIncome {
        self.entries.get(name).copied().unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn validate(salesperson: &str, field: &'static str, value: f64) -> Result<(), RegistryError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RegistryError::InvalidAmount { salesperson: salesperson.to_string(), field, value })
    }
}
