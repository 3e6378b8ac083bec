//! Numeric coercion of the remaining columns.
//!
//! Every cell converts to a number or to null, never to an error. Columns
//! that end up with nulls are flagged but kept; rows are never dropped here.

use polars::prelude::{Column, DataFrame, NamedFrom, PolarsResult, Series};

use fairprep_common::{any_to_f64, any_to_string, is_numeric_dtype, strip_quotes};
use fairprep_model::{CoercionOutcome, ColumnCoercion};

const INT64: &str = "Int64";
const FLOAT64: &str = "Float64";

/// A converted column and how complete the conversion was.
#[derive(Debug)]
pub struct CoercedColumn {
    pub series: Series,
    pub outcome: CoercionOutcome,
}

/// Result of the coercion pass over a whole table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoercionSummary {
    /// Columns that were not numeric before the pass, in table order.
    pub non_numeric_before: Vec<String>,
    pub coercions: Vec<ColumnCoercion>,
    /// Flagged columns plus any column whose dtype is still not numeric.
    pub non_numeric_after: Vec<String>,
}

/// Names of columns whose dtype is not integer or float.
pub fn non_numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|column| !is_numeric_dtype(column.dtype()))
        .map(|column| column.name().to_string())
        .collect()
}

fn is_missing_text(text: &str) -> bool {
    let text = strip_quotes(text);
    text.is_empty() || text.eq_ignore_ascii_case("nan")
}

/// Convert one column to numbers.
///
/// The result is `Int64` when every cell is present and integral, otherwise
/// `Float64` with nulls where conversion failed.
pub fn coerce_column(column: &Column) -> PolarsResult<CoercedColumn> {
    let mut values: Vec<Option<f64>> = Vec::with_capacity(column.len());
    let mut unconvertible = 0usize;
    let mut missing = 0usize;
    for row in 0..column.len() {
        let cell = column.get(row)?;
        let value = any_to_f64(cell.clone());
        if value.is_none() {
            if is_missing_text(&any_to_string(cell)) {
                missing += 1;
            } else {
                unconvertible += 1;
            }
        }
        values.push(value);
    }

    let name = column.name().clone();
    let integral: Option<Vec<i64>> = values
        .iter()
        .map(|value| {
            value
                .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
                .map(|v| v as i64)
        })
        .collect();

    let (series, dtype) = match integral {
        Some(ints) => (Series::new(name, ints), INT64),
        None => (Series::new(name, values), FLOAT64),
    };
    let outcome = if unconvertible == 0 && missing == 0 {
        CoercionOutcome::Converted {
            dtype: dtype.to_string(),
        }
    } else {
        CoercionOutcome::Incomplete {
            dtype: dtype.to_string(),
            unconvertible,
            missing,
        }
    };
    Ok(CoercedColumn { series, outcome })
}

/// Coerce every non-numeric column of `df` in place, then re-scan.
pub fn coerce_numeric(df: &mut DataFrame) -> PolarsResult<CoercionSummary> {
    let non_numeric_before = non_numeric_columns(df);
    let mut coercions = Vec::with_capacity(non_numeric_before.len());
    for name in &non_numeric_before {
        let coerced = coerce_column(df.column(name)?)?;
        df.with_column(coerced.series)?;
        coercions.push(ColumnCoercion {
            column: name.clone(),
            outcome: coerced.outcome,
        });
    }

    let mut non_numeric_after: Vec<String> = coercions
        .iter()
        .filter(|coercion| !coercion.is_complete())
        .map(|coercion| coercion.column.clone())
        .collect();
    for name in non_numeric_columns(df) {
        if !non_numeric_after.contains(&name) {
            non_numeric_after.push(name);
        }
    }

    Ok(CoercionSummary {
        non_numeric_before,
        coercions,
        non_numeric_after,
    })
}
