//! Binary-label dataset description for disparate-impact repair.
//!
//! [`BinaryLabelDataset::from_normalized`] checks a normalized table against
//! the input contract of the repair transform and collects every violation
//! it finds instead of stopping at the first.

use polars::prelude::DataFrame;
use thiserror::Error;

use fairprep_common::{any_to_f64, any_to_string, is_numeric_dtype};
use fairprep_model::{DatasetConfig, PrivilegedGroup};

/// One violated precondition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionProblem {
    #[error("no label column is configured")]
    NoLabelColumn,

    #[error("label column '{column}' not found")]
    MissingLabelColumn { column: String },

    #[error("dataset has no rows")]
    Empty,

    #[error("column '{column}' has non-numeric type {dtype}")]
    NonNumericColumn { column: String, dtype: String },

    #[error("column '{column}' has {count} missing values")]
    MissingValues { column: String, count: usize },

    #[error("protected attribute '{attribute}' not found")]
    MissingProtectedAttribute { attribute: String },

    #[error("protected attribute '{attribute}' has value '{value}', expected 0 or 1")]
    NonBinaryAttribute { attribute: String, value: String },

    #[error("no privileged groups are configured")]
    NoPrivilegedGroups,

    #[error("privileged group names '{attribute}', which is not a protected attribute")]
    UnknownPrivilegedAttribute { attribute: String },

    #[error("privileged group value {value} for '{attribute}' is not 0 or 1")]
    NonBinaryPrivilegedValue { attribute: String, value: i64 },
}

/// Every reason a table cannot be handed to the repair transform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dataset '{dataset}' is not a valid binary-label dataset ({} problems)", .problems.len())]
pub struct PreconditionError {
    pub dataset: String,
    pub problems: Vec<PreconditionProblem>,
}

/// The repair transform's view of a normalized dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryLabelDataset {
    pub label_names: Vec<String>,
    pub protected_attribute_names: Vec<String>,
    pub privileged_groups: Vec<PrivilegedGroup>,
    pub rows: usize,
}

impl BinaryLabelDataset {
    /// Validate `df` against `config` and describe it.
    pub fn from_normalized(
        df: &DataFrame,
        config: &DatasetConfig,
    ) -> Result<Self, PreconditionError> {
        let mut problems = Vec::new();

        match config.label_column.as_deref() {
            None => problems.push(PreconditionProblem::NoLabelColumn),
            Some(column) if df.column(column).is_err() => {
                problems.push(PreconditionProblem::MissingLabelColumn {
                    column: column.to_string(),
                });
            }
            Some(_) => {}
        }
        if df.height() == 0 {
            problems.push(PreconditionProblem::Empty);
        }

        for column in df.get_columns() {
            if !is_numeric_dtype(column.dtype()) {
                problems.push(PreconditionProblem::NonNumericColumn {
                    column: column.name().to_string(),
                    dtype: column.dtype().to_string(),
                });
            } else if column.null_count() > 0 {
                problems.push(PreconditionProblem::MissingValues {
                    column: column.name().to_string(),
                    count: column.null_count(),
                });
            }
        }

        for attribute in &config.protected_attributes {
            let Ok(column) = df.column(attribute) else {
                problems.push(PreconditionProblem::MissingProtectedAttribute {
                    attribute: attribute.clone(),
                });
                continue;
            };
            let offending = (0..column.len())
                .filter_map(|row| column.get(row).ok())
                .find(|cell| {
                    !matches!(any_to_f64(cell.clone()), Some(v) if v == 0.0 || v == 1.0)
                });
            if let Some(cell) = offending {
                problems.push(PreconditionProblem::NonBinaryAttribute {
                    attribute: attribute.clone(),
                    value: any_to_string(cell),
                });
            }
        }

        if config.privileged_groups.is_empty() {
            problems.push(PreconditionProblem::NoPrivilegedGroups);
        }
        for group in &config.privileged_groups {
            for (attribute, value) in group.iter() {
                if !config.protected_attributes.iter().any(|name| name == attribute) {
                    problems.push(PreconditionProblem::UnknownPrivilegedAttribute {
                        attribute: attribute.to_string(),
                    });
                } else if !matches!(value, 0 | 1) {
                    problems.push(PreconditionProblem::NonBinaryPrivilegedValue {
                        attribute: attribute.to_string(),
                        value,
                    });
                }
            }
        }

        if !problems.is_empty() {
            return Err(PreconditionError {
                dataset: config.name.clone(),
                problems,
            });
        }
        Ok(Self {
            label_names: config.label_column.iter().cloned().collect(),
            protected_attribute_names: config.protected_attributes.clone(),
            privileged_groups: config.privileged_groups.clone(),
            rows: df.height(),
        })
    }

    /// Privileged groups as value tuples ordered like the protected
    /// attribute names. Attributes a group does not mention are left out.
    pub fn privileged_tuples(&self) -> Vec<Vec<(String, i64)>> {
        self.privileged_groups
            .iter()
            .map(|group| {
                self.protected_attribute_names
                    .iter()
                    .filter_map(|name| group.get(name).map(|value| (name.clone(), value)))
                    .collect()
            })
            .collect()
    }
}
