//! Single-dataset normalization pipeline.
//!
//! The pipeline follows these stages in order:
//! 1. **Load**: read the input CSV into a table
//! 2. **Encode**: map each protected attribute to a 0/1 indicator
//! 3. **Label**: remap the label column, dropping unmapped rows
//! 4. **Coerce**: convert every remaining column to numbers, flagging gaps
//! 5. **Save**: write the table as CSV
//!
//! Only load and save failures abort a dataset. Everything else is recorded
//! in the [`TransformationReport`] and the pipeline keeps going.

use polars::prelude::DataFrame;
use tracing::{debug, error, info, info_span, warn};

use fairprep_ingest::{read_table, write_table};
use fairprep_model::{
    AttributeOutcome, CoercionOutcome, DatasetConfig, IssueKind, PipelineStage, ReportIssue,
    TransformationReport,
};

use crate::coerce::coerce_numeric;
use crate::encoder::encode_attribute;
use crate::error::{EncodeError, NormalizeError, Result};
use crate::label::label_stage;

/// Report plus the fatal error, if the dataset did not reach `Saved`.
#[derive(Debug)]
pub struct NormalizeOutcome {
    pub report: TransformationReport,
    pub error: Option<NormalizeError>,
}

impl NormalizeOutcome {
    pub fn is_saved(&self) -> bool {
        self.error.is_none() && self.report.is_saved()
    }

    /// The report on success, the fatal error otherwise.
    pub fn into_result(self) -> Result<TransformationReport> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.report),
        }
    }
}

/// Runs the pipeline for one [`DatasetConfig`].
#[derive(Debug, Clone, Copy)]
pub struct DatasetNormalizer<'a> {
    config: &'a DatasetConfig,
}

impl<'a> DatasetNormalizer<'a> {
    pub fn new(config: &'a DatasetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &'a DatasetConfig {
        self.config
    }

    /// Load, transform, and save. Never panics on bad data.
    pub fn run(&self) -> NormalizeOutcome {
        let span = info_span!("dataset", name = %self.config.name);
        let _guard = span.enter();

        let mut report = TransformationReport::new(self.config);
        let error = match self.run_stages(&mut report) {
            Ok(()) => {
                info!(
                    rows = report.rows_written.unwrap_or_default(),
                    non_numeric = report.non_numeric_after.len(),
                    "dataset normalized"
                );
                None
            }
            Err(error) => {
                error!(error = %error, stage = %report.stage, "dataset failed");
                report.fail(error.issue_kind(), error.to_string());
                Some(error)
            }
        };
        NormalizeOutcome { report, error }
    }

    /// Stages 2 to 4 on an already loaded table.
    pub fn transform(&self, df: &mut DataFrame, report: &mut TransformationReport) -> Result<()> {
        self.log_categorical_columns(df);
        encode_stage(df, self.config, report);
        label_stage(df, self.config, report)?;
        coerce_stage(df, report)
    }

    fn run_stages(&self, report: &mut TransformationReport) -> Result<()> {
        let mut df = load_stage(self.config, report)?;
        self.transform(&mut df, report)?;
        save_stage(&mut df, self.config, report)
    }

    fn log_categorical_columns(&self, df: &DataFrame) {
        for column in &self.config.categorical_columns {
            if df.column(column).is_err() {
                debug!(column = %column, "categorical column not present");
            }
        }
    }
}

// ============================================================================
// Stage 1: Load
// ============================================================================

pub(crate) fn load_stage(
    config: &DatasetConfig,
    report: &mut TransformationReport,
) -> Result<DataFrame> {
    let df = read_table(&config.input_path)
        .map_err(|e| NormalizeError::from_load(config.input_path.clone(), e))?;
    info!(
        path = %config.input_path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded dataset"
    );
    report.rows_loaded = Some(df.height());
    report.stage = PipelineStage::Loaded;
    Ok(df)
}

// ============================================================================
// Stage 2: Encode protected attributes
// ============================================================================

fn encode_stage(df: &mut DataFrame, config: &DatasetConfig, report: &mut TransformationReport) {
    for attribute in &config.protected_attributes {
        if df.column(attribute).is_err() {
            warn!(attribute = %attribute, "protected attribute not found");
            report.push_issue(
                ReportIssue::new(
                    IssueKind::MissingAttribute,
                    format!("protected attribute '{attribute}' not found"),
                )
                .with_column(attribute.as_str()),
            );
            report.record_attribute(attribute.as_str(), AttributeOutcome::Missing);
            continue;
        }

        let Some(mapping) = config.mapping_for(attribute) else {
            error!(attribute = %attribute, "no mapping configured for protected attribute");
            report.push_issue(
                ReportIssue::new(
                    IssueKind::AttributeMapping,
                    format!("protected attribute '{attribute}' has no mapping"),
                )
                .with_column(attribute.as_str()),
            );
            report.record_attribute(attribute.as_str(), AttributeOutcome::Unmapped);
            continue;
        };

        match encode_attribute(df, attribute, mapping) {
            Ok(privileged) => {
                info!(
                    attribute = %attribute,
                    strategy = %mapping,
                    privileged,
                    "encoded protected attribute"
                );
                report.record_attribute(
                    attribute.as_str(),
                    AttributeOutcome::Encoded { privileged },
                );
            }
            Err(err) => {
                let value = match &err {
                    EncodeError::Mapping { source, .. } => source.value().to_string(),
                    EncodeError::Polars(_) => String::new(),
                };
                error!(
                    attribute = %attribute,
                    strategy = %mapping,
                    value = %value,
                    error = %err,
                    "failed to encode protected attribute"
                );
                report.push_issue(
                    ReportIssue::new(IssueKind::AttributeMapping, err.to_string())
                        .with_column(attribute.as_str()),
                );
                report.record_attribute(
                    attribute.as_str(),
                    AttributeOutcome::Failed {
                        value,
                        reason: err.to_string(),
                    },
                );
            }
        }
    }
    info!(
        encoded = report.encoded_attributes().len(),
        configured = config.protected_attributes.len(),
        "protected attributes processed"
    );
    report.stage = PipelineStage::AttributesEncoded;
}

// ============================================================================
// Stage 4: Numeric coercion
// ============================================================================

fn coerce_stage(df: &mut DataFrame, report: &mut TransformationReport) -> Result<()> {
    let summary = coerce_numeric(df)?;
    for coercion in &summary.coercions {
        if let CoercionOutcome::Incomplete {
            unconvertible,
            missing,
            ..
        } = coercion.outcome
        {
            warn!(
                column = %coercion.column,
                unconvertible,
                missing,
                "column still non-numeric after conversion"
            );
            report.push_issue(
                ReportIssue::new(
                    IssueKind::NonNumericData,
                    format!(
                        "column '{}' has {} empty values after conversion",
                        coercion.column,
                        unconvertible + missing
                    ),
                )
                .with_column(coercion.column.as_str())
                .with_count(unconvertible + missing),
            );
        }
    }
    if summary.non_numeric_after.is_empty() {
        info!(converted = summary.coercions.len(), "all columns numeric");
    } else {
        error!(columns = ?summary.non_numeric_after, "non-numeric columns remain");
    }

    report.non_numeric_before = summary.non_numeric_before;
    report.coercions = summary.coercions;
    report.non_numeric_after = summary.non_numeric_after;
    report.stage = PipelineStage::NumericValidated;
    Ok(())
}

// ============================================================================
// Stage 5: Save
// ============================================================================

pub(crate) fn save_stage(
    df: &mut DataFrame,
    config: &DatasetConfig,
    report: &mut TransformationReport,
) -> Result<()> {
    write_table(df, &config.output_path)
        .map_err(|e| NormalizeError::from_save(config.output_path.clone(), &e))?;
    info!(
        path = %config.output_path.display(),
        rows = df.height(),
        "saved dataset"
    );
    report.rows_written = Some(df.height());
    report.stage = PipelineStage::Saved;
    Ok(())
}
