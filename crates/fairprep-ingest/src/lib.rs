//! Table ingestion for fairness dataset normalization.
//!
//! Tables are Polars `DataFrame`s read from and written to delimited text
//! with a single header row and no index column.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use fairprep_ingest::{read_table, write_table};
//!
//! let mut df = read_table(Path::new("datasets/adult_processed.csv"))?;
//! write_table(&mut df, Path::new("datasets/adult_final.csv"))?;
//! ```

mod csv;
mod error;

pub use csv::{read_table, write_table};
pub use error::{IngestError, Result};
