//! Property tests for attribute encoding and numeric coercion.

use polars::prelude::{AnyValue, IntoColumn, NamedFrom, Series};
use proptest::prelude::*;

use fairprep_model::{AttributeMapping, CoercionOutcome};
use fairprep_normalization::{coerce_column, encode_column};

fn cell() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        "[ a-zA-Z]{0,8}".prop_map(Some),
        "-?[0-9]{1,6}(\\.[0-9]{1,3})?".prop_map(Some),
        Just(Some("nan".to_string())),
        Just(Some("\"42\"".to_string())),
        Just(Some("1,234".to_string())),
    ]
}

proptest! {
    #[test]
    fn encoding_matches_mapping_cell_by_cell(cells in prop::collection::vec(cell(), 0..40)) {
        let mapping = AttributeMapping::one_of(["male", "m", "1"]);
        let column = Series::new("sex".into(), cells.clone()).into_column();

        let encoded = encode_column(&column, &mapping).unwrap();

        prop_assert_eq!(encoded.series.len(), cells.len());
        for (row, raw) in cells.iter().enumerate() {
            let expected = mapping.apply(raw.as_deref().unwrap_or_default()).unwrap();
            prop_assert!(expected == 0 || expected == 1);
            prop_assert_eq!(encoded.series.get(row).unwrap(), AnyValue::Int64(expected));
        }
    }

    #[test]
    fn coercion_is_total_per_cell(cells in prop::collection::vec(cell(), 0..40)) {
        let column = Series::new("value".into(), cells.clone()).into_column();

        let coerced = coerce_column(&column).unwrap();

        prop_assert_eq!(coerced.series.len(), cells.len());
        match coerced.outcome {
            CoercionOutcome::Converted { .. } => prop_assert_eq!(coerced.series.null_count(), 0),
            CoercionOutcome::Incomplete { unconvertible, missing, .. } => {
                prop_assert_eq!(coerced.series.null_count(), unconvertible + missing);
                prop_assert!(unconvertible + missing > 0);
            }
        }
    }
}
