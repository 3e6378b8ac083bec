//! Value-mapping strategies for protected attributes and labels.
//!
//! Protected attributes are encoded by a named strategy rather than by
//! arbitrary code, so a registry stays serializable and every encoding is
//! reproducible from configuration alone.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fairprep_common::{parse_numeric, strip_quotes};

use crate::error::{ModelError, Result};

/// Failure of a strategy on a single cell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// `binary` strategy saw something other than 0 or 1.
    #[error("value '{value}' is not 0 or 1")]
    NotBinary { value: String },

    /// `lookup` strategy has no entry and no default for the value.
    #[error("value '{value}' has no lookup entry")]
    Unmapped { value: String },
}

impl MappingError {
    /// The rejected cell text.
    pub fn value(&self) -> &str {
        match self {
            Self::NotBinary { value } | Self::Unmapped { value } => value,
        }
    }
}

/// How a protected attribute's raw cells become integer group indicators.
///
/// Cells are seen as trimmed text; a missing cell is the empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum AttributeMapping {
    /// 1 when the text equals `value` ignoring ASCII case, else 0.
    EqualsIgnoreCase { value: String },

    /// 1 when the text is one of `values` ignoring ASCII case, else 0.
    OneOf { values: Vec<String> },

    /// 1 when the text parses as a number equal to `value`, else 0.
    NumericEquals { value: f64 },

    /// Keeps cells that are already 0 or 1; anything else fails.
    Binary,

    /// Explicit table of raw text to integer code.
    Lookup {
        table: BTreeMap<String, i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<i64>,
    },
}

impl AttributeMapping {
    pub fn equals_ignore_case(value: impl Into<String>) -> Self {
        Self::EqualsIgnoreCase {
            value: value.into(),
        }
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn numeric_equals(value: f64) -> Self {
        Self::NumericEquals { value }
    }

    /// Map one raw cell.
    pub fn apply(&self, raw: &str) -> std::result::Result<i64, MappingError> {
        let text = strip_quotes(raw);
        match self {
            Self::EqualsIgnoreCase { value } => {
                Ok(i64::from(text.eq_ignore_ascii_case(value.trim())))
            }
            Self::OneOf { values } => Ok(i64::from(
                values
                    .iter()
                    .any(|candidate| text.eq_ignore_ascii_case(candidate.trim())),
            )),
            Self::NumericEquals { value } => {
                Ok(i64::from(parse_numeric(text).is_some_and(|v| v == *value)))
            }
            Self::Binary => match parse_numeric(text) {
                Some(v) if v == 0.0 => Ok(0),
                Some(v) if v == 1.0 => Ok(1),
                _ => Err(MappingError::NotBinary {
                    value: text.to_string(),
                }),
            },
            Self::Lookup { table, default } => table
                .get(text)
                .copied()
                .or(*default)
                .ok_or_else(|| MappingError::Unmapped {
                    value: text.to_string(),
                }),
        }
    }

    /// Whether every output of this strategy is 0 or 1.
    pub fn is_binary(&self) -> bool {
        match self {
            Self::Lookup { table, default } => table
                .values()
                .chain(default.iter())
                .all(|code| matches!(*code, 0 | 1)),
            _ => true,
        }
    }
}

impl fmt::Display for AttributeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EqualsIgnoreCase { value } => write!(f, "equals_ignore_case({value})"),
            Self::OneOf { values } => write!(f, "one_of({})", values.join(", ")),
            Self::NumericEquals { value } => write!(f, "numeric_equals({value})"),
            Self::Binary => f.write_str("binary"),
            Self::Lookup { table, default } => {
                write!(f, "lookup({} entries", table.len())?;
                if let Some(default) = default {
                    write!(f, ", default {default}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Raw label value to integer class.
///
/// Keys are matched against the rendered cell text, so an integral float
/// label `2.0` matches the key `"2"`. An empty mapping means no remap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMapping(BTreeMap<String, i64>);

impl LabelMapping {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rule(mut self, raw: impl Into<String>, class: i64) -> Self {
        self.insert(raw, class);
        self
    }

    pub fn insert(&mut self, raw: impl Into<String>, class: i64) {
        self.0.insert(raw.into().trim().to_string(), class);
    }

    pub fn get(&self, raw: &str) -> Option<i64> {
        self.0.get(strip_quotes(raw)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(raw, class)| (raw.as_str(), *class))
    }

    /// Parse a `RAW=CLASS` rule as given on the command line.
    pub fn parse_rule(input: &str) -> Result<(String, i64)> {
        let invalid = || ModelError::InvalidLabelRule {
            input: input.to_string(),
        };
        let (raw, class) = input.split_once('=').ok_or_else(invalid)?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(invalid());
        }
        let class = class.trim().parse::<i64>().map_err(|_| invalid())?;
        Ok((raw.to_string(), class))
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for LabelMapping {
    fn from_iter<T: IntoIterator<Item = (K, i64)>>(iter: T) -> Self {
        let mut mapping = Self::new();
        for (raw, class) in iter {
            mapping.insert(raw, class);
        }
        mapping
    }
}
