//! Error types for table loading and saving.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing a table.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input path does not exist.
    #[error("input file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Input exists but could not be opened or read.
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is empty or has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Polars could not parse the content.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Output file or its directory could not be created.
    #[error("failed to create {path}: {source}")]
    FileCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Polars could not serialize the table.
    #[error("failed to write CSV {path}: {message}")]
    CsvWrite { path: PathBuf, message: String },
}

impl IngestError {
    /// True when the input simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }
}

/// Result type for ingest operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("datasets/adult_processed.csv"),
        };
        assert_eq!(
            err.to_string(),
            "input file not found: datasets/adult_processed.csv"
        );
        assert!(err.is_not_found());
    }
}
