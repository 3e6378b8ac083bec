//! Label column remapping.
//!
//! Rows whose label has no mapping entry are dropped.

use std::collections::BTreeSet;
use std::path::Path;

use polars::prelude::{DataFrame, NamedFrom, PolarsResult, Series};
use tracing::{debug, error, info, info_span, warn};

use fairprep_common::any_to_string;
use fairprep_model::{
    DatasetConfig, IssueKind, LabelMapping, LabelOutcome, PipelineStage, ReportIssue,
    TransformationReport,
};

use crate::error::Result;
use crate::normalizer::{load_stage, save_stage};

/// What the remap did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRemap {
    pub dropped_rows: usize,
    /// Distinct raw values that had no mapping entry.
    pub unmapped_values: BTreeSet<String>,
}

/// Remap `column` in place, dropping rows with unmapped labels.
///
/// The column ends up `Int64` with no nulls.
pub fn remap_label(
    df: &mut DataFrame,
    column: &str,
    mapping: &LabelMapping,
) -> PolarsResult<LabelRemap> {
    let source = df.column(column)?;
    let mut classes: Vec<Option<i64>> = Vec::with_capacity(source.len());
    let mut unmapped_values = BTreeSet::new();
    for row in 0..source.len() {
        let raw = any_to_string(source.get(row)?);
        let class = mapping.get(&raw);
        if class.is_none() {
            unmapped_values.insert(raw);
        }
        classes.push(class);
    }

    let keep: Vec<bool> = classes.iter().map(Option::is_some).collect();
    let dropped_rows = keep.iter().filter(|kept| !**kept).count();
    df.with_column(Series::new(column.into(), classes))?;
    if dropped_rows > 0 {
        let mask = Series::new("keep".into(), keep);
        *df = df.filter(mask.bool()?)?;
    }

    Ok(LabelRemap {
        dropped_rows,
        unmapped_values,
    })
}

/// Stage 3: remap the configured label column, if any.
///
/// A missing label column is a warning and skips the stage.
pub(crate) fn label_stage(
    df: &mut DataFrame,
    config: &DatasetConfig,
    report: &mut TransformationReport,
) -> Result<()> {
    if config.label_mapping.is_empty() {
        debug!("no label mapping configured");
        report.label = LabelOutcome::NotConfigured;
        report.stage = PipelineStage::LabelMapped;
        return Ok(());
    }

    let column = config.label_column.as_deref().unwrap_or_default();
    if column.is_empty() || df.column(column).is_err() {
        warn!(column, "label column not found, skipping label mapping");
        report.push_issue(
            ReportIssue::new(
                IssueKind::MissingLabelColumn,
                format!("label column '{column}' not found"),
            )
            .with_column(column),
        );
        report.label = LabelOutcome::ColumnMissing {
            column: column.to_string(),
        };
        report.stage = PipelineStage::LabelMapped;
        return Ok(());
    }

    let remap = remap_label(df, column, &config.label_mapping)?;
    if remap.dropped_rows > 0 {
        let values: Vec<&str> = remap.unmapped_values.iter().map(String::as_str).collect();
        warn!(
            column,
            dropped_rows = remap.dropped_rows,
            unmapped = ?values,
            "dropped rows with unmapped labels"
        );
        report.push_issue(
            ReportIssue::new(
                IssueKind::LabelMapping,
                format!("unmapped label values: {}", values.join(", ")),
            )
            .with_column(column)
            .with_count(remap.dropped_rows),
        );
    }
    info!(column, rows = df.height(), "mapped label column");
    report.label = LabelOutcome::Mapped {
        column: column.to_string(),
        dropped_rows: remap.dropped_rows,
    };
    report.stage = PipelineStage::LabelMapped;
    Ok(())
}

/// Load a table, remap only its label column, and save it.
///
/// Attribute encoding and numeric coercion are not run.
pub fn remap_label_file(
    input: &Path,
    output: &Path,
    column: &str,
    mapping: &LabelMapping,
) -> (TransformationReport, Result<()>) {
    let config = DatasetConfig::new("labels", input, output)
        .with_label_column(column)
        .with_label_mapping(mapping.clone());
    let mut report = TransformationReport::new(&config);
    let span = info_span!("map_labels", input = %input.display(), column);
    let _guard = span.enter();

    let result = remap_label_stages(&config, &mut report);
    if let Err(error) = &result {
        error!(error = %error, "label mapping failed");
        report.fail(error.issue_kind(), error.to_string());
    }
    (report, result)
}

fn remap_label_stages(config: &DatasetConfig, report: &mut TransformationReport) -> Result<()> {
    let mut df = load_stage(config, report)?;
    label_stage(&mut df, config, report)?;
    save_stage(&mut df, config, report)
}


#[cfg(test)]
mod file_tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_remap_label_file_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("german.csv");
        let output = dir.path().join("out/german_mapped.csv");
        fs::write(&input, "Risk,duration\n1,6\n2,48\n1,12\n").unwrap();

        let mapping = LabelMapping::new().with_rule("1", 0).with_rule("2", 1);
        let (report, result) = remap_label_file(&input, &output, "Risk", &mapping);

        assert!(result.is_ok());
        assert!(report.is_saved());
        assert_eq!(report.rows_written, Some(3));
        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written, "Risk,duration\n0,6\n1,48\n0,12\n");
    }

    #[test]
    fn test_remap_label_file_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.csv");
        let (report, result) = remap_label_file(
            &dir.path().join("absent.csv"),
            &output,
            "Risk",
            &LabelMapping::new().with_rule("1", 0),
        );
        assert!(result.is_err());
        assert!(report.has_issue(IssueKind::MissingInput));
        assert!(!output.exists());
    }
}
