use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the failures that can abort ingestion, a
/// reconciliation run, or writing the comparison table.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the delimited-text reader or writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the spreadsheet reader implementation.
    #[error("spreadsheet read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Raised when the worker pool cannot be created.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// A dataset does not satisfy its minimum column contract. Fatal to the
    /// whole run and raised before any row is processed.
    #[error("{dataset} must have at least {required} columns, found {found}")]
    Structural {
        dataset: &'static str,
        required: usize,
        found: usize,
    },

    /// Every row was dropped: the datasets share no product identifiers or
    /// every matching row failed.
    #[error("no data was processed successfully ({attempted} rows attempted)")]
    NoOutput { attempted: usize },

    /// Raised when an input file has an extension we cannot read or write.
    #[error("unsupported file format: {0}. Please use a CSV or XLSX file")]
    UnsupportedFormat(String),

    /// Raised when the run configuration holds unusable values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Failure confined to a single markup row. These never leave the
/// reconciler; they are logged and counted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    /// The row is shorter than the column it needs to read.
    #[error("row {row} has no value in column {column}")]
    MissingField { row: usize, column: usize },

    /// Processing the row panicked.
    #[error("row {row} failed: {message}")]
    Panicked { row: usize, message: String },
}
