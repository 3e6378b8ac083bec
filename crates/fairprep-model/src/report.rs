//! Outcome of normalizing one dataset.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::DatasetConfig;

/// Pipeline state for one dataset.
///
/// `Saved` is the only successful terminal state. `Failed` is entered when
/// the input cannot be loaded or the output cannot be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    NotLoaded,
    Loaded,
    AttributesEncoded,
    LabelMapped,
    NumericValidated,
    Saved,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotLoaded => "not loaded",
            Self::Loaded => "loaded",
            Self::AttributesEncoded => "attributes encoded",
            Self::LabelMapped => "label mapped",
            Self::NumericValidated => "numeric validated",
            Self::Saved => "saved",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// What went wrong, in the vocabulary of the error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingInput,
    Load,
    MissingAttribute,
    AttributeMapping,
    MissingLabelColumn,
    LabelMapping,
    NonNumericData,
    Save,
    /// The pipeline panicked; caught at the dataset boundary.
    Internal,
}

impl IssueKind {
    pub fn severity(self) -> IssueSeverity {
        match self {
            Self::MissingAttribute | Self::MissingLabelColumn | Self::LabelMapping => {
                IssueSeverity::Warning
            }
            _ => IssueSeverity::Error,
        }
    }
}

/// One report line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportIssue {
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub message: String,
    pub column: Option<String>,
    pub count: Option<u64>,
}

impl ReportIssue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            message: message.into(),
            column: None,
            count: None,
        }
    }

    #[must_use]
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count as u64);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttributeOutcome {
    /// Column replaced by integer codes; `privileged` counts rows coded 1.
    Encoded { privileged: usize },
    /// Column not present in the table.
    Missing,
    /// No mapping configured for the attribute.
    Unmapped,
    /// The strategy failed on `value`; the column is left as loaded.
    Failed { value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeReport {
    pub column: String,
    pub outcome: AttributeOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LabelOutcome {
    /// Empty label mapping, stage skipped.
    #[default]
    NotConfigured,
    /// Label column absent, stage skipped.
    ColumnMissing { column: String },
    /// Label remapped; `dropped_rows` had no mapping entry.
    Mapped { column: String, dropped_rows: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CoercionOutcome {
    /// Every cell converted.
    Converted { dtype: String },
    /// Some cells are null after conversion. `unconvertible` held text that
    /// did not parse, `missing` were already empty.
    Incomplete {
        dtype: String,
        unconvertible: usize,
        missing: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCoercion {
    pub column: String,
    pub outcome: CoercionOutcome,
}

impl ColumnCoercion {
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, CoercionOutcome::Converted { .. })
    }
}

/// How a dataset run ended, for summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetStatus {
    /// Output written and every column numeric.
    Clean,
    /// Output written with data-quality errors.
    Written,
    /// Input missing; nothing to do.
    Skipped,
    /// Load or save failed.
    Failed,
}

impl fmt::Display for DatasetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Clean => "clean",
            Self::Written => "written",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Accumulated outcome of one dataset's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationReport {
    pub dataset: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub stage: PipelineStage,
    pub rows_loaded: Option<usize>,
    pub rows_written: Option<usize>,
    pub attributes: Vec<AttributeReport>,
    pub label: LabelOutcome,
    pub non_numeric_before: Vec<String>,
    pub coercions: Vec<ColumnCoercion>,
    pub non_numeric_after: Vec<String>,
    pub issues: Vec<ReportIssue>,
    pub failure: Option<String>,
}

impl TransformationReport {
    pub fn new(config: &DatasetConfig) -> Self {
        Self {
            dataset: config.name.clone(),
            input_path: config.input_path.clone(),
            output_path: config.output_path.clone(),
            stage: PipelineStage::NotLoaded,
            rows_loaded: None,
            rows_written: None,
            attributes: Vec::new(),
            label: LabelOutcome::default(),
            non_numeric_before: Vec::new(),
            coercions: Vec::new(),
            non_numeric_after: Vec::new(),
            issues: Vec::new(),
            failure: None,
        }
    }

    pub fn push_issue(&mut self, issue: ReportIssue) {
        self.issues.push(issue);
    }

    pub fn record_attribute(&mut self, column: impl Into<String>, outcome: AttributeOutcome) {
        self.attributes.push(AttributeReport {
            column: column.into(),
            outcome,
        });
    }

    /// Enter `Failed` with the fatal error's message.
    pub fn fail(&mut self, kind: IssueKind, message: impl Into<String>) {
        let message = message.into();
        self.issues.push(ReportIssue::new(kind, message.clone()));
        self.failure = Some(message);
        self.stage = PipelineStage::Failed;
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == IssueSeverity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == IssueSeverity::Warning)
            .count()
    }

    pub fn has_issue(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|issue| issue.kind == kind)
    }

    pub fn encoded_attributes(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|attribute| matches!(attribute.outcome, AttributeOutcome::Encoded { .. }))
            .map(|attribute| attribute.column.as_str())
            .collect()
    }

    pub fn dropped_label_rows(&self) -> usize {
        match self.label {
            LabelOutcome::Mapped { dropped_rows, .. } => dropped_rows,
            _ => 0,
        }
    }

    pub fn is_saved(&self) -> bool {
        self.stage == PipelineStage::Saved
    }

    pub fn is_all_numeric(&self) -> bool {
        self.non_numeric_after.is_empty()
    }

    pub fn status(&self) -> DatasetStatus {
        match self.stage {
            PipelineStage::Saved if self.is_all_numeric() => DatasetStatus::Clean,
            PipelineStage::Saved => DatasetStatus::Written,
            PipelineStage::Failed if self.has_issue(IssueKind::MissingInput) => {
                DatasetStatus::Skipped
            }
            _ => DatasetStatus::Failed,
        }
    }
}
