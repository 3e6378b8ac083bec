//! Registry-wide batch runs.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use rayon::prelude::*;
use tracing::{Span, error, info, info_span, warn};

use fairprep_model::{
    DatasetConfig, DatasetRegistry, DatasetStatus, IssueKind, TransformationReport,
};

use crate::normalizer::DatasetNormalizer;

/// One report per registry entry, in registry order.
///
/// There is no aggregate pass/fail: each dataset stands on its own.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub reports: Vec<TransformationReport>,
}

impl BatchOutcome {
    pub fn get(&self, name: &str) -> Option<&TransformationReport> {
        self.reports.iter().find(|report| report.dataset == name)
    }

    pub fn count(&self, status: DatasetStatus) -> usize {
        self.reports
            .iter()
            .filter(|report| report.status() == status)
            .count()
    }

    pub fn saved_count(&self) -> usize {
        self.reports.iter().filter(|report| report.is_saved()).count()
    }
}

/// Runs every dataset of an immutable registry, isolating failures.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    registry: DatasetRegistry,
    parallel: bool,
}

impl BatchRunner {
    pub fn new(registry: DatasetRegistry) -> Self {
        Self {
            registry,
            parallel: false,
        }
    }

    /// Run datasets on the rayon pool instead of one after another.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    pub fn run(&self) -> BatchOutcome {
        let span = info_span!("batch", datasets = self.registry.len(), parallel = self.parallel);
        let _guard = span.enter();

        let reports = if self.parallel {
            self.run_parallel()
        } else {
            self.registry.iter().map(run_isolated).collect()
        };
        let outcome = BatchOutcome { reports };

        info!(
            saved = outcome.saved_count(),
            skipped = outcome.count(DatasetStatus::Skipped),
            failed = outcome.count(DatasetStatus::Failed),
            "all datasets processed"
        );
        outcome
    }

    fn run_parallel(&self) -> Vec<TransformationReport> {
        let parent = Span::current();
        let configs: Vec<&DatasetConfig> = self.registry.iter().collect();
        // indexed collect keeps registry order
        configs
            .into_par_iter()
            .map(|config| parent.in_scope(|| run_isolated(config)))
            .collect()
    }
}

/// Run one dataset; no error or panic escapes.
fn run_isolated(config: &DatasetConfig) -> TransformationReport {
    if !config.input_path.exists() {
        warn!(
            dataset = %config.name,
            path = %config.input_path.display(),
            "input file not found, skipping dataset"
        );
        let mut report = TransformationReport::new(config);
        report.fail(
            IssueKind::MissingInput,
            format!("input file '{}' does not exist", config.input_path.display()),
        );
        return report;
    }

    match catch_unwind(AssertUnwindSafe(|| DatasetNormalizer::new(config).run())) {
        Ok(outcome) => {
            if let Some(err) = &outcome.error {
                error!(dataset = %config.name, error = %err, "error processing dataset");
            }
            outcome.report
        }
        Err(payload) => panicked(config, payload.as_ref()),
    }
}

fn panicked(config: &DatasetConfig, payload: &(dyn Any + Send)) -> TransformationReport {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    error!(dataset = %config.name, panic = %message, "dataset processing panicked");
    let mut report = TransformationReport::new(config);
    report.fail(IssueKind::Internal, format!("processing panicked: {message}"));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairprep_model::PipelineStage;

    #[test]
    fn test_missing_input_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatasetConfig::new(
            "compas",
            dir.path().join("compas.csv"),
            dir.path().join("compas_final.csv"),
        );
        let outcome = BatchRunner::new(DatasetRegistry::new(vec![config]).unwrap()).run();

        let report = outcome.get("compas").unwrap();
        assert_eq!(report.status(), DatasetStatus::Skipped);
        assert_eq!(report.stage, PipelineStage::Failed);
        assert!(!dir.path().join("compas_final.csv").exists());
    }

    #[test]
    fn test_panic_payload_becomes_report() {
        let config = DatasetConfig::new("adult", "a.csv", "b.csv");
        let payload: Box<dyn Any + Send> = Box::new("boom");
        let report = panicked(&config, payload.as_ref());
        assert!(report.has_issue(IssueKind::Internal));
        assert_eq!(report.status(), DatasetStatus::Failed);
        assert_eq!(report.failure.as_deref(), Some("processing panicked: boom"));
    }
}
