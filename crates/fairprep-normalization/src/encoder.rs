//! Protected-attribute encoding.
//!
//! Each cell is mapped independently through the configured strategy. A
//! column is either encoded completely or left exactly as loaded: if any
//! cell fails, nothing is written back.

use polars::prelude::{Column, DataFrame, NamedFrom, Series};

use fairprep_common::any_to_string;
use fairprep_model::AttributeMapping;

use crate::error::EncodeError;

/// A successfully encoded column.
#[derive(Debug)]
pub struct EncodedColumn {
    pub series: Series,
    /// Rows coded 1.
    pub privileged: usize,
}

/// Map every cell of `column`, failing on the first rejected value.
pub fn encode_column(
    column: &Column,
    mapping: &AttributeMapping,
) -> Result<EncodedColumn, EncodeError> {
    let mut codes = Vec::with_capacity(column.len());
    for row in 0..column.len() {
        let raw = any_to_string(column.get(row)?);
        let code = mapping.apply(&raw).map_err(|source| EncodeError::Mapping {
            row,
            strategy: mapping.to_string(),
            source,
        })?;
        codes.push(code);
    }
    let privileged = codes.iter().filter(|code| **code == 1).count();
    Ok(EncodedColumn {
        series: Series::new(column.name().clone(), codes),
        privileged,
    })
}

/// Encode `name` in place. On error the table is untouched.
pub fn encode_attribute(
    df: &mut DataFrame,
    name: &str,
    mapping: &AttributeMapping,
) -> Result<usize, EncodeError> {
    let encoded = encode_column(df.column(name)?, mapping)?;
    df.with_column(encoded.series)?;
    Ok(encoded.privileged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairprep_model::MappingError;
    use polars::prelude::{AnyValue, DataType, IntoColumn};

    fn frame(name: &str, values: &[&str]) -> DataFrame {
        let series = Series::new(
            name.into(),
            values.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
        );
        DataFrame::new(vec![series.into_column()]).unwrap()
    }

    #[test]
    fn test_encode_sex_column() {
        let mut df = frame("sex", &["Male", "Female", "m", "F"]);
        let privileged =
            encode_attribute(&mut df, "sex", &AttributeMapping::one_of(["male", "m"])).unwrap();

        let column = df.column("sex").unwrap();
        assert_eq!(column.dtype(), &DataType::Int64);
        let values: Vec<AnyValue<'_>> = (0..4).map(|i| column.get(i).unwrap()).collect();
        assert_eq!(
            values,
            vec![
                AnyValue::Int64(1),
                AnyValue::Int64(0),
                AnyValue::Int64(1),
                AnyValue::Int64(0)
            ]
        );
        assert_eq!(privileged, 2);
    }

    #[test]
    fn test_numeric_source_column() {
        let series = Series::new("male".into(), vec![Some(1i64), Some(0), None, Some(1)]);
        let mut df = DataFrame::new(vec![series.into_column()]).unwrap();
        let privileged =
            encode_attribute(&mut df, "male", &AttributeMapping::numeric_equals(1.0)).unwrap();
        assert_eq!(privileged, 2);
        assert_eq!(df.column("male").unwrap().null_count(), 0);
    }

    #[test]
    fn test_failure_leaves_column_untouched() {
        let mut df = frame("sex", &["1", "0", "2"]);
        let err = encode_attribute(&mut df, "sex", &AttributeMapping::Binary).unwrap_err();

        match err {
            EncodeError::Mapping { row, source, .. } => {
                assert_eq!(row, 2);
                assert_eq!(
                    source,
                    MappingError::NotBinary {
                        value: "2".to_string()
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(df.column("sex").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_missing_column_is_polars_error() {
        let mut df = frame("race", &["White"]);
        let err = encode_attribute(&mut df, "sex", &AttributeMapping::Binary).unwrap_err();
        assert!(matches!(err, EncodeError::Polars(_)));
    }
}
