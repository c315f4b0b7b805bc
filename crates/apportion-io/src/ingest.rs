//! Contract ingestion from delimited text and workbooks.
//!
//! Both readers produce a plain table of [`Cell`]s; [`records_from_table`]
//! then applies the same header lookup, numeric coercion and row filtering to
//! either source.

use crate::columns::ColumnAliases;
use crate::error::IngestionError;
use crate::number::parse_amount;
use apportion_types::{ContractRecord, IngestionSummary};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// A single spreadsheet cell, reduced to what ingestion cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Text form used for names and identifiers. Whole numbers lose their
    /// trailing `.0` so a contract number `1001` stays `"1001"`.
    fn as_label(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Cell::Number(f) if f.fract() == 0.0 => Some(format!("{f:.0}")),
            Cell::Number(f) => Some(f.to_string()),
        }
    }

    fn as_amount(&self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => parse_amount(s),
            Cell::Number(f) => f.is_finite().then_some(*f),
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// Supported upload formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `;`-separated UTF-8 text with decimal commas.
    DelimitedText,
    /// Any workbook calamine can open; the first sheet is read.
    Workbook,
}

impl SourceFormat {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(SourceFormat::DelimitedText),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(SourceFormat::Workbook),
            _ => None,
        }
    }
}

/// Contract records of one upload plus what was accepted and dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub records: Vec<ContractRecord>,
    pub summary: IngestionSummary,
}

/// Reads an uploaded file held in memory.
pub fn ingest_bytes(
    file_name: &str,
    bytes: &[u8],
    aliases: &ColumnAliases,
) -> Result<Ingested, IngestionError> {
    let format = SourceFormat::from_file_name(file_name)
        .ok_or_else(|| IngestionError::UnsupportedFormat { file_name: file_name.to_string() })?;
    debug!(file_name, ?format, bytes = bytes.len(), "reading contract file");

    let table = match format {
        SourceFormat::DelimitedText => read_delimited(bytes)?,
        SourceFormat::Workbook => read_workbook(bytes)?,
    };
    let ingested = records_from_table(table, aliases)?;

    info!(
        file_name,
        accepted_rows = ingested.summary.accepted_rows,
        dropped_rows = ingested.summary.dropped_rows,
        salespeople = ingested.summary.salespeople.len(),
        "ingested contract file"
    );
    Ok(ingested)
}

/// Reads a contract file from disk.
pub fn ingest_path(path: &Path, aliases: &ColumnAliases) -> Result<Ingested, IngestionError> {
    let bytes = std::fs::read(path)?;
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    ingest_bytes(file_name, &bytes, aliases)
}

fn read_delimited(bytes: &[u8]) -> Result<Vec<Vec<Cell>>, IngestionError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(rows)
}

fn read_workbook(bytes: &[u8]) -> Result<Vec<Vec<Cell>>, IngestionError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(IngestionError::Empty);
    };
    let range = workbook.worksheet_range(&sheet_name)?;
    debug!(sheet = %sheet_name, rows = range.height(), "reading first worksheet");

    Ok(range.rows().map(|row| row.iter().map(cell_from_data).collect()).collect())
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Cell::Text(dt.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Turns a raw table into contract records.
///
/// The first non-blank row is the header. Data rows lacking a salesperson, a
/// contract id, or a non-negative numeric amount are dropped and counted;
/// blank rows are skipped without being counted. If the amount column holds
/// values but none of them is numeric the whole file is rejected.
pub fn records_from_table(
    table: Vec<Vec<Cell>>,
    aliases: &ColumnAliases,
) -> Result<Ingested, IngestionError> {
    let mut rows = table.into_iter().filter(|row| !row.iter().all(Cell::is_empty));

    let header = rows.next().ok_or(IngestionError::Empty)?;
    let headers: Vec<String> = header.iter().map(|c| c.as_label().unwrap_or_default()).collect();
    let index = aliases.resolve(&headers)?;

    let mut records = Vec::new();
    let mut salespeople: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut dropped_rows = 0;
    let mut amount_cells = 0;
    let mut numeric_amounts = 0;

    for row in rows {
        let cell = |i: usize| row.get(i).unwrap_or(&EMPTY_CELL);

        let amount_cell = cell(index.amount);
        let amount = amount_cell.as_amount();
        if !amount_cell.is_empty() {
            amount_cells += 1;
            if amount.is_some() {
                numeric_amounts += 1;
            }
        }

        let salesperson = cell(index.salesperson).as_label();
        let contract_id = cell(index.contract).as_label();
        match (salesperson, contract_id, amount) {
            (Some(salesperson), Some(contract_id), Some(amount)) if amount >= 0.0 => {
                if seen.insert(salesperson.clone()) {
                    salespeople.push(salesperson.clone());
                }
                records.push(ContractRecord { salesperson, contract_id, amount });
            }
            _ => dropped_rows += 1,
        }
    }

    if amount_cells > 0 && numeric_amounts == 0 {
        return Err(IngestionError::UnparseableAmounts {
            column: aliases.amount_label().to_string(),
        });
    }
    if dropped_rows > 0 {
        warn!(dropped_rows, "dropped rows with missing or non-numeric required fields");
    }

    let summary = IngestionSummary { accepted_rows: records.len(), dropped_rows, salespeople };
    Ok(Ingested { records, summary })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn ingest_csv(content: &str) -> Result<Ingested, IngestionError> {
        ingest_bytes("contratos.csv", content.as_bytes(), &ColumnAliases::default())
    }

    #[test]
    fn picks_format_from_extension() {
        assert_eq!(SourceFormat::from_file_name("a.CSV"), Some(SourceFormat::DelimitedText));
        assert_eq!(SourceFormat::from_file_name("a.xlsx"), Some(SourceFormat::Workbook));
        assert_eq!(SourceFormat::from_file_name("a.ods"), Some(SourceFormat::Workbook));
        assert_eq!(SourceFormat::from_file_name("a.txt"), None);
        assert_eq!(SourceFormat::from_file_name("noextension"), None);
    }

    #[test]
    fn reads_semicolon_separated_comma_decimal_text() {
        let ingested = ingest_csv(
            "\u{feff}Vendedor;Contrato;Valor;Cliente\n\
             ana;A-1;1.500,50;ACME\n\
             bruno;B-1;200;Globex\n\
             ana;A-2;99,5;Initech\n",
        )
        .unwrap();

        assert_eq!(
            ingested.records,
            vec![
                ContractRecord::new("ana", "A-1", 1500.5),
                ContractRecord::new("bruno", "B-1", 200.0),
                ContractRecord::new("ana", "A-2", 99.5),
            ]
        );
        assert_eq!(ingested.summary.salespeople, vec!["ana", "bruno"]);
        assert_eq!(ingested.summary.dropped_rows, 0);
    }

    #[test]
    fn drops_incomplete_rows_and_counts_them() {
        let ingested = ingest_csv(
            "vendedor;contrato;valor\n\
             ana;A-1;100\n\
             ;A-2;100\n\
             ana;;100\n\
             ana;A-3;\n\
             ana;A-4;n/a\n\
             ana;A-5;-10\n\
             \n\
             ana;A-6;50\n",
        )
        .unwrap();

        let ids: Vec<_> = ingested.records.iter().map(|r| r.contract_id.as_str()).collect();
        assert_eq!(ids, vec!["A-1", "A-6"]);
        assert_eq!(ingested.summary.accepted_rows, 2);
        assert_eq!(ingested.summary.dropped_rows, 5);
    }

    #[test]
    fn missing_columns_are_an_error() {
        let err = ingest_csv("vendedor;valor\nana;1\n").unwrap_err();
        assert!(matches!(err, IngestionError::MissingColumns { ref missing } if missing == &["contrato"]));
    }

    #[test]
    fn non_numeric_amount_column_is_an_error() {
        let err = ingest_csv("vendedor;contrato;valor\nana;1;abc\nbruno;2;xyz\n").unwrap_err();
        assert!(matches!(err, IngestionError::UnparseableAmounts { .. }));
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(matches!(ingest_csv(""), Err(IngestionError::Empty)));
        assert!(matches!(ingest_csv("\n\n"), Err(IngestionError::Empty)));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let err = ingest_bytes("contracts.pdf", b"%PDF", &ColumnAliases::default()).unwrap_err();
        assert!(matches!(err, IngestionError::UnsupportedFormat { .. }));
    }

    #[test]
    fn garbage_workbook_is_unreadable() {
        let err = ingest_bytes("contracts.xlsx", b"not a zip archive", &ColumnAliases::default())
            .unwrap_err();
        assert!(matches!(err, IngestionError::Unreadable { .. }));
    }

    #[test]
    fn workbook_cells_keep_numeric_values_and_integer_ids() {
        let table = vec![
            vec![text("Vendedor"), text("Contrato"), text("Valor")],
            vec![text("ana"), Cell::Number(1001.0), Cell::Number(600.0)],
            vec![text("ana"), Cell::Number(1002.5), Cell::Number(400.25)],
            vec![Cell::Empty, Cell::Empty, Cell::Empty],
            vec![text("bruno"), text("X"), Cell::Empty],
        ];
        let ingested = records_from_table(table, &ColumnAliases::default()).unwrap();
        assert_eq!(
            ingested.records,
            vec![
                ContractRecord::new("ana", "1001", 600.0),
                ContractRecord::new("ana", "1002.5", 400.25),
            ]
        );
        assert_eq!(ingested.summary.dropped_rows, 1);
    }

    #[test]
    fn short_rows_count_as_missing_fields() {
        let table = vec![
            vec![text("vendedor"), text("contrato"), text("valor")],
            vec![text("ana"), text("A")],
        ];
        let ingested = records_from_table(table, &ColumnAliases::default()).unwrap();
        assert!(ingested.records.is_empty());
        assert_eq!(ingested.summary.dropped_rows, 1);
    }
}
