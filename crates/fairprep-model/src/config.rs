//! Per-dataset transformation rules.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mapping::{AttributeMapping, LabelMapping};

/// One privileged group: a concrete value for each named protected attribute.
///
/// `sex = 1, race = 1` means rows with both indicators set are jointly
/// privileged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivilegedGroup(BTreeMap<String, i64>);

impl PrivilegedGroup {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, attribute: impl Into<String>, value: i64) -> Self {
        self.0.insert(attribute.into(), value);
        self
    }

    pub fn get(&self, attribute: &str) -> Option<i64> {
        self.0.get(attribute).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values ordered like `attributes`; `None` if any attribute is missing.
    pub fn as_tuple(&self, attributes: &[String]) -> Option<Vec<i64>> {
        attributes.iter().map(|name| self.get(name)).collect()
    }
}

/// Static description of how to normalize one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_column: Option<String>,
    #[serde(default, skip_serializing_if = "LabelMapping::is_empty")]
    pub label_mapping: LabelMapping,
    #[serde(default)]
    pub protected_attributes: Vec<String>,
    #[serde(default)]
    pub attribute_mappings: BTreeMap<String, AttributeMapping>,
    /// Documentation only; never transformed or enforced.
    #[serde(default)]
    pub categorical_columns: Vec<String>,
    #[serde(default)]
    pub privileged_groups: Vec<PrivilegedGroup>,
}

/// A configuration inconsistency, reported rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigProblem {
    #[error("protected attribute '{attribute}' has no mapping")]
    MissingAttributeMapping { attribute: String },

    #[error("mapping for '{attribute}' is not a protected attribute")]
    UnusedAttributeMapping { attribute: String },

    #[error("mapping for '{attribute}' can produce values outside 0/1")]
    NonBinaryAttributeMapping { attribute: String },

    #[error("label mapping is configured but no label column is set")]
    LabelMappingWithoutColumn,

    #[error("privileged group names '{attribute}', which is not a protected attribute")]
    UnknownPrivilegedAttribute { attribute: String },

    #[error("privileged group value {value} for '{attribute}' is not 0 or 1")]
    NonBinaryPrivilegedValue { attribute: String, value: i64 },
}

impl DatasetConfig {
    pub fn new(
        name: impl Into<String>,
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            input_path: input_path.into(),
            output_path: output_path.into(),
            label_column: None,
            label_mapping: LabelMapping::default(),
            protected_attributes: Vec::new(),
            attribute_mappings: BTreeMap::new(),
            categorical_columns: Vec::new(),
            privileged_groups: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_label_mapping(mut self, mapping: LabelMapping) -> Self {
        self.label_mapping = mapping;
        self
    }

    /// Add a protected attribute together with its mapping.
    #[must_use]
    pub fn with_protected_attribute(
        mut self,
        attribute: impl Into<String>,
        mapping: AttributeMapping,
    ) -> Self {
        let attribute = attribute.into();
        self.protected_attributes.push(attribute.clone());
        self.attribute_mappings.insert(attribute, mapping);
        self
    }

    /// Add a protected attribute with no mapping (reported at run time).
    #[must_use]
    pub fn with_unmapped_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.protected_attributes.push(attribute.into());
        self
    }

    #[must_use]
    pub fn with_categorical_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categorical_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_privileged_group(mut self, group: PrivilegedGroup) -> Self {
        self.privileged_groups.push(group);
        self
    }

    /// Same rules, different files.
    #[must_use]
    pub fn with_paths(mut self, input: &Path, output: &Path) -> Self {
        self.input_path = input.to_path_buf();
        self.output_path = output.to_path_buf();
        self
    }

    pub fn mapping_for(&self, attribute: &str) -> Option<&AttributeMapping> {
        self.attribute_mappings.get(attribute)
    }

    /// Collect configuration inconsistencies.
    ///
    /// None of these stop a run: a protected attribute without a mapping is
    /// skipped and reported when the dataset is processed.
    pub fn validate(&self) -> Vec<ConfigProblem> {
        let mut problems = Vec::new();
        for attribute in &self.protected_attributes {
            match self.attribute_mappings.get(attribute) {
                None => problems.push(ConfigProblem::MissingAttributeMapping {
                    attribute: attribute.clone(),
                }),
                Some(mapping) if !mapping.is_binary() => {
                    problems.push(ConfigProblem::NonBinaryAttributeMapping {
                        attribute: attribute.clone(),
                    });
                }
                Some(_) => {}
            }
        }
        for attribute in self.attribute_mappings.keys() {
            if !self.protected_attributes.contains(attribute) {
                problems.push(ConfigProblem::UnusedAttributeMapping {
                    attribute: attribute.clone(),
                });
            }
        }
        if !self.label_mapping.is_empty() && self.label_column.is_none() {
            problems.push(ConfigProblem::LabelMappingWithoutColumn);
        }
        for group in &self.privileged_groups {
            for (attribute, value) in group.iter() {
                if !self.protected_attributes.iter().any(|name| name == attribute) {
                    problems.push(ConfigProblem::UnknownPrivilegedAttribute {
                        attribute: attribute.to_string(),
                    });
                } else if !matches!(value, 0 | 1) {
                    problems.push(ConfigProblem::NonBinaryPrivilegedValue {
                        attribute: attribute.to_string(),
                        value,
                    });
                }
            }
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adult_like() -> DatasetConfig {
        DatasetConfig::new("adult", "in.csv", "out.csv")
            .with_label_column("income")
            .with_protected_attribute("sex", AttributeMapping::one_of(["male", "m"]))
            .with_protected_attribute("race", AttributeMapping::equals_ignore_case("white"))
            .with_privileged_group(PrivilegedGroup::new().with("sex", 1).with("race", 1))
    }

    #[test]
    fn test_valid_config_has_no_problems() {
        assert!(adult_like().validate().is_empty());
    }

    #[test]
    fn test_missing_mapping_is_reported() {
        let config = adult_like().with_unmapped_attribute("age");
        assert_eq!(
            config.validate(),
            vec![ConfigProblem::MissingAttributeMapping {
                attribute: "age".to_string()
            }]
        );
    }

    #[test]
    fn test_privileged_group_problems() {
        let config = adult_like()
            .with_privileged_group(PrivilegedGroup::new().with("sex", 2).with("zip", 1));
        let problems = config.validate();
        assert!(problems.contains(&ConfigProblem::NonBinaryPrivilegedValue {
            attribute: "sex".to_string(),
            value: 2
        }));
        assert!(problems.contains(&ConfigProblem::UnknownPrivilegedAttribute {
            attribute: "zip".to_string()
        }));
    }

    #[test]
    fn test_label_mapping_without_column() {
        let config = DatasetConfig::new("german", "in.csv", "out.csv")
            .with_label_mapping(LabelMapping::new().with_rule("1", 0));
        assert_eq!(
            config.validate(),
            vec![ConfigProblem::LabelMappingWithoutColumn]
        );
    }

    #[test]
    fn test_privileged_tuple_follows_attribute_order() {
        let group = PrivilegedGroup::new().with("sex", 1).with("race", 0);
        let order = vec!["race".to_string(), "sex".to_string()];
        assert_eq!(group.as_tuple(&order), Some(vec![0, 1]));
        assert_eq!(group.as_tuple(&["age".to_string()]), None);
    }
}
