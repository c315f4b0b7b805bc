//! Reading contract spreadsheets and writing allocation exports.
//!
//! Ingestion accepts `;`-separated text with decimal commas or a workbook
//! (`.xlsx`, `.xls`, `.ods`), normalizes the headers, finds the salesperson,
//! contract and amount columns, and turns every complete row into a
//! [`ContractRecord`](apportion_types::ContractRecord). Export writes the
//! allocation of one salesperson back out in the same delimited dialect.

pub mod columns;
pub mod error;
pub mod export;
pub mod ingest;
pub mod number;

pub use columns::{ColumnAliases, normalize_header};
pub use error::{ExportError, IngestionError};
pub use export::{ExportRow, export_file_name, read_export, write_export};
pub use ingest::{Cell, Ingested, SourceFormat, ingest_bytes, ingest_path, records_from_table};
pub use number::{format_currency, format_decimal, format_grouped, format_percent, parse_amount, title_case};
