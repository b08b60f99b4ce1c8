//! Error handling for csvtab
//!
//! This module defines the error type shared by ingestion, the query
//! primitives and the dataset store. Every error is detected synchronously
//! at the offending call and handed back to the caller; nothing here is
//! retried or logged.
//!
//! The module uses thiserror to keep the variants and their messages in one place.

use std::path::PathBuf;

use thiserror::Error;

/// CsvTabError represents all possible errors that can occur in csvtab
#[derive(Error, Debug)]
pub enum CsvTabError {
    /// The input path did not exist when ingestion tried to open it
    #[error("Source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The source produced no header line at all
    #[error("Input is empty: no header line found")]
    EmptyInput,

    /// A referenced column doesn't exist in the schema
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    /// An aggregate function name that isn't one of sum/avg/max/min/count
    #[error("Unsupported aggregation: {0}")]
    UnsupportedAggregation(String),

    /// A non-numeric value reached an arithmetic aggregate
    #[error("Unsupported operand: {0}")]
    UnsupportedOperand(String),

    /// A filter condition that could not be parsed
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    /// Chunked ingestion was asked for batches of zero rows
    #[error("Invalid chunk size: {0} (must be positive)")]
    InvalidChunkSize(usize),

    /// A delimiter that is not a single character
    #[error("Invalid delimiter: '{0}'. Must be a single character.")]
    InvalidDelimiter(String),

    /// A dataset name that the store has never loaded
    #[error("Dataset '{0}' not found")]
    DatasetNotFound(String),

    /// A dataset name given explicitly that the store already holds
    #[error("Dataset '{0}' is already loaded")]
    DatasetExists(String),

    /// Error during file system operations after the source was opened
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while writing delimited output
    #[error("Output error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for operations that can produce a CsvTabError
pub type CsvTabResult<T> = std::result::Result<T, CsvTabError>;
