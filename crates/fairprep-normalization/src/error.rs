//! Error types for dataset normalization.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

use fairprep_ingest::IngestError;
use fairprep_model::{IssueKind, MappingError};

/// Errors that abort a dataset's pipeline.
///
/// Column-level problems never surface here; they become report issues.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Input path does not exist.
    #[error("input file '{path}' does not exist")]
    MissingInput { path: PathBuf },

    /// Input exists but could not be parsed into a table.
    #[error("failed to load '{path}': {message}")]
    Load { path: PathBuf, message: String },

    /// Output could not be written.
    #[error("failed to save '{path}': {message}")]
    Save { path: PathBuf, message: String },

    /// A table operation failed mid-pipeline.
    #[error("table operation failed: {0}")]
    Polars(#[from] PolarsError),
}

impl NormalizeError {
    pub(crate) fn from_load(path: PathBuf, error: IngestError) -> Self {
        if error.is_not_found() {
            Self::MissingInput { path }
        } else {
            Self::Load {
                path,
                message: error.to_string(),
            }
        }
    }

    pub(crate) fn from_save(path: PathBuf, error: &IngestError) -> Self {
        Self::Save {
            path,
            message: error.to_string(),
        }
    }

    /// Report issue kind for this failure.
    pub fn issue_kind(&self) -> IssueKind {
        match self {
            Self::MissingInput { .. } => IssueKind::MissingInput,
            Self::Load { .. } | Self::Polars(_) => IssueKind::Load,
            Self::Save { .. } => IssueKind::Save,
        }
    }
}

/// Failure to encode one protected-attribute column.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The strategy rejected a cell; the column is left unencoded.
    #[error("{strategy} failed at row {row}: {source}")]
    Mapping {
        row: usize,
        strategy: String,
        #[source]
        source: MappingError,
    },

    #[error("table operation failed: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for normalization operations.
pub type Result<T> = std::result::Result<T, NormalizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_input_from_ingest() {
        let path = PathBuf::from("datasets/compas_processed.csv");
        let err = NormalizeError::from_load(
            path.clone(),
            IngestError::FileNotFound { path: path.clone() },
        );
        assert!(matches!(err, NormalizeError::MissingInput { .. }));
        assert_eq!(err.issue_kind(), IssueKind::MissingInput);
        assert_eq!(
            err.to_string(),
            "input file 'datasets/compas_processed.csv' does not exist"
        );
    }

    #[test]
    fn test_parse_failure_is_load_error() {
        let path = PathBuf::from("bad.csv");
        let err = NormalizeError::from_load(
            path.clone(),
            IngestError::CsvParse {
                path,
                message: "unterminated quote".to_string(),
            },
        );
        assert_eq!(err.issue_kind(), IssueKind::Load);
    }
}
