use thiserror::Error;

/// Why an uploaded file could not be turned into contract records.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("unsupported file type '{file_name}': expected .csv, .xlsx, .xlsm, .xls or .ods")]
    UnsupportedFormat { file_name: String },

    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not read file: {reason}")]
    Unreadable { reason: String },

    #[error("the file has no header row")]
    Empty,

    #[error("missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("column '{column}' has no numeric values")]
    UnparseableAmounts { column: String },

    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
}

impl From<csv::Error> for IngestionError {
    fn from(err: csv::Error) -> Self {
        IngestionError::Unreadable { reason: err.to_string() }
    }
}

impl From<calamine::Error> for IngestionError {
    fn from(err: calamine::Error) -> Self {
        IngestionError::Unreadable { reason: err.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush export: {reason}")]
    Flush { reason: String },
}
