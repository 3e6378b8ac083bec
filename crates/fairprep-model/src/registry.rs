//! Ordered registry of dataset configurations for a batch run.
//!
//! Registry files are TOML with one `[[dataset]]` table per entry, kept in
//! file order:
//!
//! ```toml
//! [[dataset]]
//! name = "adult"
//! input_path = "datasets/adult_processed.csv"
//! output_path = "datasets/adult_final.csv"
//! label_column = "income"
//! protected_attributes = ["sex", "race"]
//!
//! [dataset.attribute_mappings]
//! sex = { strategy = "one_of", values = ["male", "m"] }
//! race = { strategy = "equals_ignore_case", value = "white" }
//!
//! [[dataset.privileged_groups]]
//! sex = 1
//! race = 1
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{DatasetConfig, PrivilegedGroup};
use crate::error::{ModelError, Result};
use crate::mapping::AttributeMapping;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default, rename = "dataset")]
    datasets: Vec<DatasetConfig>,
}

/// Immutable, ordered set of named dataset configurations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetRegistry {
    datasets: Vec<DatasetConfig>,
}

impl DatasetRegistry {
    /// Build a registry, rejecting duplicate names.
    pub fn new(datasets: Vec<DatasetConfig>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for dataset in &datasets {
            if !seen.insert(dataset.name.as_str()) {
                return Err(ModelError::DuplicateDataset {
                    name: dataset.name.clone(),
                });
            }
        }
        Ok(Self { datasets })
    }

    /// Load a registry from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::RegistryRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse registry TOML; `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let file: RegistryFile =
            toml::from_str(content).map_err(|error| ModelError::RegistryParse {
                path: origin.to_path_buf(),
                message: error.to_string(),
            })?;
        Self::new(file.datasets)
    }

    /// Serialize back to registry TOML.
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(&RegistryFile {
            datasets: self.datasets.clone(),
        })
    }

    /// The three fairness benchmarks prepared under `datasets/`.
    pub fn builtin() -> Self {
        let sex = AttributeMapping::one_of(["male", "m"]);
        let race = AttributeMapping::equals_ignore_case("white");
        let jointly_privileged = PrivilegedGroup::new().with("sex", 1).with("race", 1);

        let adult = DatasetConfig::new(
            "adult",
            "datasets/adult_processed.csv",
            "datasets/adult_final.csv",
        )
        .with_label_column("income")
        .with_protected_attribute("sex", sex.clone())
        .with_protected_attribute("race", race.clone())
        .with_categorical_columns([
            "workclass",
            "education",
            "marital-status",
            "occupation",
            "relationship",
            "native-country",
        ])
        .with_privileged_group(jointly_privileged.clone());

        let compas = DatasetConfig::new(
            "compas",
            "datasets/compas_processed.csv",
            "datasets/compas_final.csv",
        )
        .with_label_column("two_year_recid")
        .with_protected_attribute("sex", sex)
        .with_protected_attribute("race", race)
        .with_categorical_columns([
            "age_cat_age_cat_Greater than 45",
            "age_cat_age_cat_Less than 25",
            "c_charge_degree_c_charge_degree_M",
            "c_charge_desc_c_charge_desc_Accessory After the Fact",
            "c_charge_desc_c_charge_desc_Agg Abuse Elderlly/Disabled Adult",
            "c_charge_desc_c_charge_desc_Agg Assault Law Enforc Officer",
        ])
        .with_privileged_group(jointly_privileged);

        let male = "Personal_status_and_sex_Marital_Status_Male";
        let german = DatasetConfig::new(
            "german",
            "datasets/german_processed_encoded.csv",
            "datasets/german_final.csv",
        )
        .with_label_column("Risk")
        .with_protected_attribute(male, AttributeMapping::numeric_equals(1.0))
        .with_privileged_group(PrivilegedGroup::new().with(male, 1));

        Self {
            datasets: vec![adult, compas, german],
        }
    }

    pub fn get(&self, name: &str) -> Option<&DatasetConfig> {
        self.datasets.iter().find(|dataset| dataset.name == name)
    }

    /// Look up a dataset, failing with [`ModelError::UnknownDataset`].
    pub fn require(&self, name: &str) -> Result<&DatasetConfig> {
        self.get(name).ok_or_else(|| ModelError::UnknownDataset {
            name: name.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatasetConfig> {
        self.datasets.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.datasets.iter().map(|dataset| dataset.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_order_and_validity() {
        let registry = DatasetRegistry::builtin();
        assert_eq!(registry.names(), vec!["adult", "compas", "german"]);
        for dataset in registry.iter() {
            assert!(dataset.validate().is_empty(), "{}", dataset.name);
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let a = DatasetConfig::new("adult", "a.csv", "b.csv");
        let result = DatasetRegistry::new(vec![a.clone(), a]);
        assert!(matches!(
            result,
            Err(ModelError::DuplicateDataset { name }) if name == "adult"
        ));
    }

    #[test]
    fn test_require_unknown() {
        let registry = DatasetRegistry::builtin();
        assert!(registry.require("german").is_ok());
        assert!(matches!(
            registry.require("credit"),
            Err(ModelError::UnknownDataset { .. })
        ));
    }
}
