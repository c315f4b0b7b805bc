//! Header normalization and required-column lookup.

use crate::error::IngestionError;
use serde::{Deserialize, Serialize};

/// Accepted header names for each required column, compared after
/// [`normalize_header`]. The first alias is the one reported when a column is
/// missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnAliases {
    #[serde(default = "default_salesperson")]
    pub salesperson: Vec<String>,
    #[serde(default = "default_contract")]
    pub contract: Vec<String>,
    #[serde(default = "default_amount")]
    pub amount: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            salesperson: default_salesperson(),
            contract: default_contract(),
            amount: default_amount(),
        }
    }
}

fn default_salesperson() -> Vec<String> {
    vec!["vendedor".to_string(), "salesperson".to_string()]
}
fn default_contract() -> Vec<String> {
    vec!["contrato".to_string(), "contract".to_string(), "contract_id".to_string()]
}
fn default_amount() -> Vec<String> {
    vec!["valor".to_string(), "amount".to_string(), "value".to_string()]
}

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub salesperson: usize,
    pub contract: usize,
    pub amount: usize,
}

/// Lowercases, trims and replaces inner spaces with `_`.
///
/// `" Contract ID "` becomes `"contract_id"`.
pub fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase().replace(' ', "_")
}

impl ColumnAliases {
    /// Locates the required columns in `headers`, reporting every missing one.
    pub fn resolve(&self, headers: &[String]) -> Result<ColumnIndex, IngestionError> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let find = |aliases: &[String]| {
            aliases.iter().find_map(|alias| {
                let alias = normalize_header(alias);
                normalized.iter().position(|h| *h == alias)
            })
        };

        let salesperson = find(&self.salesperson);
        let contract = find(&self.contract);
        let amount = find(&self.amount);

        match (salesperson, contract, amount) {
            (Some(salesperson), Some(contract), Some(amount)) => {
                Ok(ColumnIndex { salesperson, contract, amount })
            }
            _ => {
                let missing = [
                    (salesperson, &self.salesperson),
                    (contract, &self.contract),
                    (amount, &self.amount),
                ]
                .into_iter()
                .filter(|(found, _)| found.is_none())
                .map(|(_, aliases)| aliases.first().cloned().unwrap_or_default())
                .collect();
                Err(IngestionError::MissingColumns { missing })
            }
        }
    }

    /// Display name of the amount column.
    pub fn amount_label(&self) -> &str {
        self.amount.first().map(String::as_str).unwrap_or("amount")
    }
}
