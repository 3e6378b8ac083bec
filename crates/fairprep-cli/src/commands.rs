use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span, warn};

use fairprep_ingest::read_table;
use fairprep_model::{DatasetConfig, DatasetRegistry, LabelMapping, TransformationReport};
use fairprep_normalization::{
    BatchOutcome, BatchRunner, BinaryLabelDataset, DatasetNormalizer, NormalizeOutcome,
    PreconditionError, remap_label_file,
};

use crate::cli::{BatchArgs, CheckArgs, DatasetsArgs, MapLabelsArgs, NormalizeArgs};
use crate::summary::apply_table_style;

/// The registry at `path`, or the built-in one.
pub fn load_registry(path: Option<&Path>) -> Result<DatasetRegistry> {
    match path {
        Some(path) => DatasetRegistry::load(path)
            .with_context(|| format!("load registry {}", path.display())),
        None => Ok(DatasetRegistry::builtin()),
    }
}

/// Dataset rules from the registry (if `--dataset` is given) with command
/// line overrides applied on top.
pub fn normalize_config(args: &NormalizeArgs) -> Result<DatasetConfig> {
    let mut config = match &args.dataset {
        Some(name) => load_registry(args.registry.as_deref())?
            .require(name)?
            .clone()
            .with_paths(&args.input, &args.output),
        None => {
            let name = args
                .input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "dataset".to_string());
            DatasetConfig::new(name, &args.input, &args.output)
        }
    };

    if let Some(column) = &args.label_column {
        config.label_column = Some(column.clone());
    }
    if !args.map.is_empty() {
        config.label_mapping = args.map.iter().cloned().collect::<LabelMapping>();
    }
    for (attribute, mapping) in &args.protected {
        if !config.protected_attributes.contains(attribute) {
            config.protected_attributes.push(attribute.clone());
        }
        config
            .attribute_mappings
            .insert(attribute.clone(), mapping.clone());
    }

    for problem in config.validate() {
        warn!(dataset = %config.name, "{problem}");
    }
    Ok(config)
}

pub fn run_normalize(args: &NormalizeArgs) -> Result<NormalizeOutcome> {
    let config = normalize_config(args)?;
    Ok(DatasetNormalizer::new(&config).run())
}

pub fn run_batch(args: &BatchArgs) -> Result<BatchOutcome> {
    let registry = load_registry(args.registry.as_deref())?;
    info!(datasets = registry.len(), "starting batch");
    Ok(BatchRunner::new(registry).with_parallel(args.parallel).run())
}

pub fn run_map_labels(args: &MapLabelsArgs) -> NormalizeOutcome {
    let mapping = if args.map.is_empty() {
        LabelMapping::new().with_rule("1", 0).with_rule("2", 1)
    } else {
        args.map.iter().cloned().collect()
    };
    let (report, result) = remap_label_file(&args.input, &args.output, &args.column, &mapping);
    NormalizeOutcome {
        report,
        error: result.err(),
    }
}

/// Outcome of the binary-label precondition check.
pub type CheckResult = std::result::Result<BinaryLabelDataset, PreconditionError>;

pub fn run_check(args: &CheckArgs) -> Result<CheckResult> {
    let registry = load_registry(args.registry.as_deref())?;
    let config = registry.require(&args.dataset)?;
    let span = info_span!("check", dataset = %config.name);
    let _guard = span.enter();

    let df = read_table(&args.input)
        .with_context(|| format!("read {}", args.input.display()))?;
    info!(rows = df.height(), columns = df.width(), "loaded normalized dataset");
    Ok(BinaryLabelDataset::from_normalized(&df, config))
}

pub fn run_datasets(args: &DatasetsArgs) -> Result<()> {
    let registry = load_registry(args.registry.as_deref())?;
    if args.dump {
        print!("{}", registry.to_toml().context("serialize registry")?);
        return Ok(());
    }
    println!("{}", datasets_table(&registry));
    Ok(())
}

pub fn datasets_table(registry: &DatasetRegistry) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Dataset", "Input", "Output", "Label", "Protected"]);
    apply_table_style(&mut table);
    for config in registry.iter() {
        table.add_row(vec![
            config.name.clone(),
            config.input_path.display().to_string(),
            config.output_path.display().to_string(),
            config.label_column.clone().unwrap_or_else(|| "-".to_string()),
            config.protected_attributes.join(", "),
        ]);
    }
    table
}

/// Write reports as a pretty-printed JSON array.
pub fn write_reports(path: &Path, reports: &[TransformationReport]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, reports)
        .with_context(|| format!("write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    info!(path = %path.display(), reports = reports.len(), "wrote transformation report");
    Ok(())
}
