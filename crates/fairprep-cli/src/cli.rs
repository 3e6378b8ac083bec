//! CLI argument definitions for fairprep.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

use fairprep_model::{AttributeMapping, LabelMapping};

#[derive(Parser)]
#[command(
    name = "fairprep",
    version,
    about = "Normalize fairness datasets into numeric binary-label form",
    long_about = "Normalize tabular datasets for fairness-aware machine learning.\n\n\
                  Protected attributes become 0/1 indicators, labels become integer\n\
                  classes, and every other column is coerced to numbers."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Write transformation reports as JSON.
    #[arg(long = "report", value_name = "FILE", global = true)]
    pub report: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize a single dataset.
    Normalize(NormalizeArgs),

    /// Normalize every dataset in a registry.
    Batch(BatchArgs),

    /// Remap only the label column of a dataset.
    MapLabels(MapLabelsArgs),

    /// Check that a normalized dataset is ready for disparate-impact repair.
    Check(CheckArgs),

    /// List the datasets in a registry.
    Datasets(DatasetsArgs),
}

#[derive(Args)]
pub struct NormalizeArgs {
    /// Input CSV file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output CSV file.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Start from this registry dataset's rules (built-in registry unless --registry is given).
    #[arg(long = "dataset", value_name = "NAME")]
    pub dataset: Option<String>,

    /// Registry file to look up --dataset in.
    #[arg(long = "registry", value_name = "FILE", requires = "dataset")]
    pub registry: Option<PathBuf>,

    /// Label column to remap.
    #[arg(long = "label-column", value_name = "COLUMN")]
    pub label_column: Option<String>,

    /// Label rule, repeatable (e.g. --map 1=0 --map 2=1).
    #[arg(long = "map", value_name = "RAW=VALUE", value_parser = parse_label_rule)]
    pub map: Vec<(String, i64)>,

    /// Protected attribute, repeatable. `ATTR` expects 0/1 values already;
    /// `ATTR=a,b` codes 1 for cells equal to a or b, ignoring case.
    #[arg(long = "protected", value_name = "ATTR[=VALUES]", value_parser = parse_protected)]
    pub protected: Vec<(String, AttributeMapping)>,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Registry file (built-in adult/compas/german registry if omitted).
    #[arg(long = "registry", value_name = "FILE")]
    pub registry: Option<PathBuf>,

    /// Process datasets concurrently.
    #[arg(long = "parallel")]
    pub parallel: bool,
}

#[derive(Args)]
pub struct MapLabelsArgs {
    /// Input CSV file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output CSV file.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Label column to remap.
    #[arg(long = "column", value_name = "COLUMN", default_value = "Risk")]
    pub column: String,

    /// Label rule, repeatable (default: 1=0, 2=1).
    #[arg(long = "map", value_name = "RAW=VALUE", value_parser = parse_label_rule)]
    pub map: Vec<(String, i64)>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Normalized CSV file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Registry file (built-in registry if omitted).
    #[arg(long = "registry", value_name = "FILE")]
    pub registry: Option<PathBuf>,

    /// Registry dataset whose label and protected attributes apply.
    #[arg(long = "dataset", value_name = "NAME")]
    pub dataset: String,
}

#[derive(Args)]
pub struct DatasetsArgs {
    /// Registry file (built-in registry if omitted).
    #[arg(long = "registry", value_name = "FILE")]
    pub registry: Option<PathBuf>,

    /// Print the registry as TOML instead of a table.
    #[arg(long = "dump")]
    pub dump: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_label_rule(input: &str) -> Result<(String, i64), String> {
    LabelMapping::parse_rule(input).map_err(|error| error.to_string())
}

fn parse_protected(input: &str) -> Result<(String, AttributeMapping), String> {
    let (name, values) = match input.split_once('=') {
        Some((name, values)) => (name.trim(), Some(values)),
        None => (input.trim(), None),
    };
    if name.is_empty() {
        return Err(format!("invalid protected attribute '{input}': missing name"));
    }
    let mapping = match values {
        None => AttributeMapping::Binary,
        Some(values) => {
            let values: Vec<&str> = values
                .split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .collect();
            if values.is_empty() {
                return Err(format!(
                    "invalid protected attribute '{input}': no privileged values"
                ));
            }
            AttributeMapping::one_of(values)
        }
    };
    Ok((name.to_string(), mapping))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_protected() {
        assert_eq!(
            parse_protected("sex=male, m").unwrap(),
            ("sex".to_string(), AttributeMapping::one_of(["male", "m"]))
        );
        assert_eq!(
            parse_protected("race").unwrap(),
            ("race".to_string(), AttributeMapping::Binary)
        );
        assert!(parse_protected("=male").is_err());
        assert!(parse_protected("sex=").is_err());
    }

    #[test]
    fn test_normalize_arguments() {
        let cli = Cli::try_parse_from([
            "fairprep",
            "normalize",
            "in.csv",
            "out.csv",
            "--label-column",
            "Risk",
            "--map",
            "1=0",
            "--map",
            "2=1",
            "--protected",
            "sex=male",
        ])
        .unwrap();
        let Command::Normalize(args) = cli.command else {
            panic!("expected normalize");
        };
        assert_eq!(args.map, vec![("1".to_string(), 0), ("2".to_string(), 1)]);
        assert_eq!(args.protected.len(), 1);
        assert_eq!(args.label_column.as_deref(), Some("Risk"));
    }

    #[test]
    fn test_registry_requires_dataset() {
        let result = Cli::try_parse_from([
            "fairprep",
            "normalize",
            "in.csv",
            "out.csv",
            "--registry",
            "registry.toml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fairprep",
            "batch",
            "--parallel",
            "--log-format",
            "json",
            "--report",
            "reports.json",
        ])
        .unwrap();
        assert!(matches!(cli.log_format, LogFormatArg::Json));
        assert_eq!(cli.report, Some(PathBuf::from("reports.json")));
    }
}
