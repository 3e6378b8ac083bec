//! Terminal summaries of transformation reports.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use fairprep_model::{DatasetStatus, IssueSeverity, ReportIssue, TransformationReport};
use fairprep_normalization::{BinaryLabelDataset, PreconditionError};

pub fn print_summary(reports: &[TransformationReport]) {
    println!("{}", summary_table(reports));
    if let Some(table) = issue_table(reports) {
        println!("{table}");
    }
}

/// One row per dataset plus a total row.
pub fn summary_table(reports: &[TransformationReport]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Status"),
        header_cell("Rows in"),
        header_cell("Rows out"),
        header_cell("Encoded"),
        header_cell("Dropped labels"),
        header_cell("Non-numeric"),
    ]);
    apply_summary_table_style(&mut table);
    for index in [2, 3, 5] {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 1, CellAlignment::Center);

    let mut rows_in = 0usize;
    let mut rows_out = 0usize;
    let mut dropped = 0usize;
    for report in reports {
        rows_in += report.rows_loaded.unwrap_or_default();
        rows_out += report.rows_written.unwrap_or_default();
        dropped += report.dropped_label_rows();
        let encoded = report.encoded_attributes();
        table.add_row(vec![
            Cell::new(&report.dataset).add_attribute(Attribute::Bold),
            status_cell(report.status()),
            optional_cell(report.rows_loaded),
            optional_cell(report.rows_written),
            list_cell(&encoded),
            count_cell(report.dropped_label_rows(), Color::Yellow),
            non_numeric_cell(&report.non_numeric_after),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell(format!("{} datasets", reports.len())),
        Cell::new(rows_in).add_attribute(Attribute::Bold),
        Cell::new(rows_out).add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(dropped, Color::Yellow).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    table
}

/// Issues across all reports, errors first. `None` when there are none.
pub fn issue_table(reports: &[TransformationReport]) -> Option<Table> {
    let mut issues: Vec<(&str, &ReportIssue)> = reports
        .iter()
        .flat_map(|report| {
            report
                .issues
                .iter()
                .map(move |issue| (report.dataset.as_str(), issue))
        })
        .collect();
    if issues.is_empty() {
        return None;
    }
    issues.sort_by_key(|(dataset, issue)| (severity_rank(issue.severity), *dataset));

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Severity"),
        header_cell("Column"),
        header_cell("Count"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    for (dataset, issue) in issues {
        table.add_row(vec![
            Cell::new(dataset),
            severity_cell(issue.severity),
            Cell::new(issue.column.as_deref().unwrap_or("-")),
            issue.count.map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(&issue.message),
        ]);
    }
    Some(table)
}

/// Print the outcome of a binary-label precondition check.
pub fn print_check(result: &Result<BinaryLabelDataset, PreconditionError>) {
    match result {
        Ok(dataset) => {
            println!("Binary-label dataset OK ({} rows)", dataset.rows);
            let mut table = Table::new();
            apply_table_style(&mut table);
            table.set_header(vec![header_cell("Role"), header_cell("Columns")]);
            table.add_row(vec![
                Cell::new("label"),
                Cell::new(dataset.label_names.join(", ")),
            ]);
            table.add_row(vec![
                Cell::new("protected"),
                Cell::new(dataset.protected_attribute_names.join(", ")),
            ]);
            for group in dataset.privileged_tuples() {
                let values: Vec<String> = group
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect();
                table.add_row(vec![Cell::new("privileged"), Cell::new(values.join(", "))]);
            }
            println!("{table}");
        }
        Err(error) => {
            eprintln!("{error}");
            for problem in &error.problems {
                eprintln!("- {problem}");
            }
        }
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn optional_cell(value: Option<usize>) -> Cell {
    value.map_or_else(|| dim_cell("-"), Cell::new)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn list_cell<S: AsRef<str>>(items: &[S]) -> Cell {
    if items.is_empty() {
        return dim_cell("-");
    }
    let joined: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    Cell::new(joined.join(", "))
}

fn non_numeric_cell(columns: &[String]) -> Cell {
    if columns.is_empty() {
        dim_cell("-")
    } else {
        list_cell(columns).fg(Color::Red)
    }
}

fn status_cell(status: DatasetStatus) -> Cell {
    let color = match status {
        DatasetStatus::Clean => Color::Green,
        DatasetStatus::Written => Color::Yellow,
        DatasetStatus::Skipped => Color::DarkGrey,
        DatasetStatus::Failed => Color::Red,
    };
    Cell::new(status).fg(color).add_attribute(Attribute::Bold)
}

fn severity_cell(severity: IssueSeverity) -> Cell {
    let (label, color) = match severity {
        IssueSeverity::Error => ("error", Color::Red),
        IssueSeverity::Warning => ("warning", Color::Yellow),
    };
    Cell::new(label).fg(color)
}

fn severity_rank(severity: IssueSeverity) -> u8 {
    match severity {
        IssueSeverity::Error => 0,
        IssueSeverity::Warning => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairprep_model::{AttributeOutcome, DatasetConfig, IssueKind, PipelineStage};

    fn saved_report() -> TransformationReport {
        let mut report =
            TransformationReport::new(&DatasetConfig::new("adult", "in.csv", "out.csv"));
        report.rows_loaded = Some(10);
        report.rows_written = Some(9);
        report.record_attribute("sex", AttributeOutcome::Encoded { privileged: 4 });
        report.stage = PipelineStage::Saved;
        report
    }

    fn skipped_report() -> TransformationReport {
        let mut report =
            TransformationReport::new(&DatasetConfig::new("compas", "in.csv", "out.csv"));
        report.fail(IssueKind::MissingInput, "input file 'in.csv' does not exist");
        report
    }

    #[test]
    fn test_summary_lists_every_dataset() {
        let rendered = summary_table(&[saved_report(), skipped_report()]).to_string();
        assert!(rendered.contains("adult"));
        assert!(rendered.contains("compas"));
        assert!(rendered.contains("clean"));
        assert!(rendered.contains("skipped"));
        assert!(rendered.contains("TOTAL"));
    }

    #[test]
    fn test_issue_table_only_when_issues_exist() {
        assert!(issue_table(&[saved_report()]).is_none());
        let rendered = issue_table(&[saved_report(), skipped_report()])
            .unwrap()
            .to_string();
        assert!(rendered.contains("does not exist"));
    }
}
