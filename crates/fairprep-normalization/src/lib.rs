//! Configuration-driven normalization of fairness datasets.
//!
//! A [`DatasetNormalizer`] turns one raw table into the numeric form that
//! binary-label fairness tooling expects: protected attributes as 0/1
//! indicators, the label as small integer classes, and every other column
//! numeric. A [`BatchRunner`] does the same for every entry of a
//! [`fairprep_model::DatasetRegistry`], isolating failures per dataset.

pub mod batch;
pub mod binary_label;
pub mod coerce;
pub mod encoder;
pub mod error;
pub mod label;
pub mod normalizer;

pub use batch::{BatchOutcome, BatchRunner};
pub use binary_label::{BinaryLabelDataset, PreconditionError, PreconditionProblem};
pub use coerce::{
    CoercedColumn, CoercionSummary, coerce_column, coerce_numeric, non_numeric_columns,
};
pub use encoder::{EncodedColumn, encode_attribute, encode_column};
pub use error::{EncodeError, NormalizeError, Result};
pub use label::{LabelRemap, remap_label, remap_label_file};
pub use normalizer::{DatasetNormalizer, NormalizeOutcome};
