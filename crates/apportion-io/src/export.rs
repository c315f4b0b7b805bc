//! Delimited-text export of one salesperson's allocation.

use crate::error::{ExportError, IngestionError};
use crate::number::{format_decimal, parse_amount};
use apportion_types::AllocationResult;
use serde::Serialize;

pub const EXPORT_HEADER: [&str; 4] = [
    "Contrato",
    "Valor do Contrato (R$)",
    "Proporção no Total (%)",
    "Valor Ponderado (R$)",
];

/// One exported line, read back with [`read_export`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub contract_id: String,
    pub contract_amount: f64,
    /// Percentage, `60.0` for 60 %.
    pub proportion_percent: f64,
    pub allocated_amount: f64,
}

/// Writes `results` as UTF-8, `;`-separated, decimal-comma text.
pub fn write_export(results: &[AllocationResult]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;
    for result in results {
        let amount = format_decimal(result.contract_amount);
        let percent = format_decimal(result.proportion * 100.0);
        let allocated = format_decimal(result.allocated_amount);
        writer.write_record([
            result.contract_id.as_str(),
            amount.as_str(),
            percent.as_str(),
            allocated.as_str(),
        ])?;
    }
    writer.into_inner().map_err(|err| ExportError::Flush { reason: err.error().to_string() })
}

/// Reads a file produced by [`write_export`].
pub fn read_export(bytes: &[u8]) -> Result<Vec<ExportRow>, IngestionError> {
    let mut reader = csv::ReaderBuilder::new().delimiter(b';').from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let field = |i: usize, name: &str| {
            record.get(i).ok_or_else(|| IngestionError::MalformedRow {
                line,
                reason: format!("missing column '{name}'"),
            })
        };
        let number = |i: usize, name: &str| {
            let raw = field(i, name)?;
            parse_amount(raw).ok_or_else(|| IngestionError::MalformedRow {
                line,
                reason: format!("'{raw}' in column '{name}' is not a number"),
            })
        };

        rows.push(ExportRow {
            contract_id: field(0, EXPORT_HEADER[0])?.to_string(),
            contract_amount: number(1, EXPORT_HEADER[1])?,
            proportion_percent: number(2, EXPORT_HEADER[2])?,
            allocated_amount: number(3, EXPORT_HEADER[3])?,
        });
    }
    Ok(rows)
}

/// `"ana maria"` -> `"ana_maria_contratos_ponderados.csv"`.
///
/// Anything outside ASCII letters, digits, `-` and `_` becomes `_` so the name
/// is safe in a `Content-Disposition` header.
pub fn export_file_name(salesperson: &str) -> String {
    let stem: String = salesperson
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{stem}_contratos_ponderados.csv")
}
