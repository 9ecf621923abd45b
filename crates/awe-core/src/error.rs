//! Error types for awe-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in awe-core
///
/// Every variant is fatal for a run. Missing input files and missing metric
/// columns are not errors; they are reported through [`crate::RunOutcome`].
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required column is missing from an input table
    #[error("malformed table '{path}': missing required column '{column}'")]
    MalformedTable { path: PathBuf, column: String },

    /// A cell could not be parsed into the type its column requires
    #[error("invalid value in '{path}' at row {row}, column '{column}': '{raw}'")]
    InvalidValue {
        path: PathBuf,
        row: usize,
        column: String,
        raw: String,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
