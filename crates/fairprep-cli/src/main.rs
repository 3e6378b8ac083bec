//! fairprep CLI.

use std::path::Path;

use clap::Parser;

use fairprep_cli::cli::{Cli, Command};
use fairprep_cli::commands::{
    run_batch, run_check, run_datasets, run_map_labels, run_normalize, write_reports,
};
use fairprep_cli::logging::{LogConfig, init_logging};
use fairprep_cli::summary::{print_check, print_summary};
use fairprep_model::TransformationReport;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&LogConfig::from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let report_path = cli.report.as_deref();
    let exit_code = match &cli.command {
        Command::Normalize(args) => match run_normalize(args) {
            Ok(outcome) => {
                finish(report_path, std::slice::from_ref(&outcome.report));
                if let Some(error) = &outcome.error {
                    eprintln!("error: {error}");
                    1
                } else {
                    0
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        // per-dataset failures never change the exit code
        Command::Batch(args) => match run_batch(args) {
            Ok(outcome) => {
                finish(report_path, &outcome.reports);
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::MapLabels(args) => {
            let outcome = run_map_labels(args);
            finish(report_path, std::slice::from_ref(&outcome.report));
            if let Some(error) = &outcome.error {
                eprintln!("error: {error}");
                1
            } else {
                0
            }
        }
        Command::Check(args) => match run_check(args) {
            Ok(result) => {
                print_check(&result);
                i32::from(result.is_err())
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Datasets(args) => match run_datasets(args) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

fn finish(report_path: Option<&Path>, reports: &[TransformationReport]) {
    print_summary(reports);
    if let Some(path) = report_path
        && let Err(error) = write_reports(path, reports)
    {
        eprintln!("error: {error:#}");
    }
}
