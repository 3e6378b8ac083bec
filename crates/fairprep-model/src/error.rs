//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or loading dataset configuration.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Registry file could not be read.
    #[error("failed to read registry {path}: {source}")]
    RegistryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Registry file is not valid TOML or does not match the schema.
    #[error("failed to parse registry {path}: {message}")]
    RegistryParse { path: PathBuf, message: String },

    /// Two registry entries share a name.
    #[error("dataset '{name}' is defined more than once")]
    DuplicateDataset { name: String },

    /// Requested dataset is not in the registry.
    #[error("dataset '{name}' not found in registry")]
    UnknownDataset { name: String },

    /// A `RAW=VALUE` label rule could not be parsed.
    #[error("invalid label rule '{input}': expected RAW=INTEGER")]
    InvalidLabelRule { input: String },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
