//! Command entry points driven through parsed arguments.

use std::fs;
use std::path::Path;

use clap::Parser;
use tempfile::TempDir;

use fairprep_cli::cli::{Cli, Command};
use fairprep_cli::commands::{
    datasets_table, load_registry, normalize_config, run_batch, run_check, run_map_labels,
    run_normalize, write_reports,
};
use fairprep_model::{AttributeMapping, DatasetStatus, TransformationReport};
use fairprep_normalization::PreconditionProblem;

fn parse(args: &[&str]) -> Command {
    let mut argv = vec!["fairprep"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap().command
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

const REGISTRY: &str = r#"
[[dataset]]
name = "adult"
input_path = "unused.csv"
output_path = "unused_final.csv"
label_column = "income"
label_mapping = { ">50K" = 1, "<=50K" = 0 }
protected_attributes = ["sex"]

[dataset.attribute_mappings]
sex = { strategy = "one_of", values = ["male", "m"] }

[[dataset.privileged_groups]]
sex = 1
"#;

#[test]
fn test_normalize_with_registry_rules() {
    let dir = TempDir::new().unwrap();
    let registry = dir.path().join("registry.toml");
    let input = dir.path().join("adult.csv");
    let output = dir.path().join("adult_final.csv");
    fs::write(&registry, REGISTRY).unwrap();
    fs::write(&input, "sex,income,age\nMale,>50K,39\nFemale,<=50K,50\n").unwrap();

    let Command::Normalize(args) = parse(&[
        "normalize",
        path_str(&input),
        path_str(&output),
        "--registry",
        path_str(&registry),
        "--dataset",
        "adult",
    ]) else {
        panic!("expected normalize");
    };
    let outcome = run_normalize(&args).unwrap();

    assert!(outcome.is_saved());
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "sex,income,age\n1,1,39\n0,0,50\n"
    );

    let Command::Check(args) = parse(&[
        "check",
        path_str(&output),
        "--registry",
        path_str(&registry),
        "--dataset",
        "adult",
    ]) else {
        panic!("expected check");
    };
    let dataset = run_check(&args).unwrap().unwrap();
    assert_eq!(dataset.label_names, vec!["income"]);
    assert_eq!(dataset.rows, 2);
}

#[test]
fn test_command_line_rules_override_registry() {
    let Command::Normalize(args) = parse(&[
        "normalize",
        "in.csv",
        "out.csv",
        "--dataset",
        "german",
        "--label-column",
        "credit_risk",
        "--map",
        "good=0",
        "--protected",
        "foreign=yes",
    ]) else {
        panic!("expected normalize");
    };
    let config = normalize_config(&args).unwrap();

    assert_eq!(config.input_path, Path::new("in.csv"));
    assert_eq!(config.label_column.as_deref(), Some("credit_risk"));
    assert_eq!(config.label_mapping.get("good"), Some(0));
    assert_eq!(config.label_mapping.get("1"), None);
    assert_eq!(
        config.mapping_for("foreign"),
        Some(&AttributeMapping::one_of(["yes"]))
    );
    assert_eq!(config.protected_attributes.len(), 2);
}

#[test]
fn test_normalize_missing_input_is_error() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.csv");
    let Command::Normalize(args) = parse(&[
        "normalize",
        path_str(&dir.path().join("absent.csv")),
        path_str(&output),
    ]) else {
        panic!("expected normalize");
    };

    let outcome = run_normalize(&args).unwrap();

    assert!(outcome.error.is_some());
    assert_eq!(outcome.report.status(), DatasetStatus::Skipped);
    assert!(!output.exists());
}

#[test]
fn test_map_labels_defaults_to_risk() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("german.csv");
    let output = dir.path().join("german_mapped.csv");
    fs::write(&input, "duration,Risk\n6,1\n48,2\n").unwrap();

    let Command::MapLabels(args) = parse(&["map-labels", path_str(&input), path_str(&output)])
    else {
        panic!("expected map-labels");
    };
    let outcome = run_map_labels(&args);

    assert!(outcome.is_saved());
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "duration,Risk\n6,0\n48,1\n"
    );
}

#[test]
fn test_check_reports_text_columns() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("german.csv");
    fs::write(
        &input,
        "Risk,Personal_status_and_sex_Marital_Status_Male,purpose\n0,1,car\n",
    )
    .unwrap();

    let Command::Check(args) = parse(&["check", path_str(&input), "--dataset", "german"]) else {
        panic!("expected check");
    };
    let error = run_check(&args).unwrap().unwrap_err();

    assert!(error.problems.iter().any(|problem| matches!(
        problem,
        PreconditionProblem::NonNumericColumn { column, .. } if column == "purpose"
    )));
}

#[test]
fn test_batch_with_missing_inputs_still_succeeds() {
    let dir = TempDir::new().unwrap();
    let registry = dir.path().join("registry.toml");
    fs::write(
        &registry,
        format!(
            "[[dataset]]\nname = \"a\"\ninput_path = \"{}\"\noutput_path = \"{}\"\n",
            path_str(&dir.path().join("a.csv")),
            path_str(&dir.path().join("a_out.csv")),
        ),
    )
    .unwrap();

    let Command::Batch(args) = parse(&["batch", "--registry", path_str(&registry)]) else {
        panic!("expected batch");
    };
    let outcome = run_batch(&args).unwrap();

    assert_eq!(outcome.reports.len(), 1);
    assert_eq!(outcome.reports[0].status(), DatasetStatus::Skipped);
}

#[test]
fn test_reports_written_as_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reports.json");
    let registry = load_registry(None).unwrap();
    let reports: Vec<TransformationReport> =
        registry.iter().map(TransformationReport::new).collect();

    write_reports(&path, &reports).unwrap();

    let parsed: Vec<TransformationReport> =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, reports);
}

#[test]
fn test_datasets_table_lists_builtin_registry() {
    let rendered = datasets_table(&load_registry(None).unwrap()).to_string();
    for name in ["adult", "compas", "german"] {
        assert!(rendered.contains(name), "{name} missing");
    }
}
