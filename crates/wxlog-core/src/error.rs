use polars::error::PolarsError;
use thiserror::Error;

/// Conditions under which no hourly table can be produced. Both are
/// "no data" outcomes that callers are expected to report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("no valid records found")]
    NoValidRecords,

    #[error("none of the {records} valid records carried a parseable FechaISO timestamp")]
    NoValidTimestamps { records: usize },
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OutputError>;
