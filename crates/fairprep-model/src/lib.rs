//! Configuration and report types for fairness dataset normalization.

pub mod config;
pub mod error;
pub mod mapping;
pub mod registry;
pub mod report;

pub use config::{ConfigProblem, DatasetConfig, PrivilegedGroup};
pub use error::{ModelError, Result};
pub use mapping::{AttributeMapping, LabelMapping, MappingError};
pub use registry::DatasetRegistry;
pub use report::{
    AttributeOutcome, AttributeReport, CoercionOutcome, ColumnCoercion, DatasetStatus,
    IssueKind, IssueSeverity, LabelOutcome, PipelineStage, ReportIssue, TransformationReport,
};
