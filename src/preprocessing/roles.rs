//! Explicit column-role configuration

use crate::error::{CurveError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// How the continuous (standardized) feature columns are chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuousColumns {
    /// Every feature column is continuous; no categorical features
    AllFeatures,
    /// Every feature column not listed as categorical
    Remaining,
    /// Exactly these columns; every other feature must be categorical
    Named(Vec<String>),
}

/// Role assignment for the columns of a dataset header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRoles {
    /// Label column (always categorical)
    pub label: String,
    /// Categorical columns; may include the label
    #[serde(default)]
    pub categorical: Vec<String>,
    pub continuous: ContinuousColumns,
}

/// Column roles validated against a concrete header
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoles {
    /// Position of the label in the header
    pub label_index: usize,
    /// Feature column names, in header order (label removed)
    pub feature_names: Vec<String>,
    /// Indices into `feature_names` of columns to standardize
    pub continuous: Vec<usize>,
    /// Indices into `feature_names` of categorical features
    pub categorical: Vec<usize>,
}

impl ColumnRoles {
    pub fn new(label: impl Into<String>, continuous: ContinuousColumns) -> Self {
        Self {
            label: label.into(),
            categorical: Vec::new(),
            continuous,
        }
    }

    pub fn with_categorical<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.categorical = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Validate against `header` and compute feature-index roles.
    ///
    /// A missing label is a data error; every other mismatch between the
    /// roles and the header is a configuration error.
    pub fn resolve(&self, header: &[String]) -> Result<ResolvedRoles> {
        let label_index = header
            .iter()
            .position(|h| *h == self.label)
            .ok_or_else(|| CurveError::FeatureNotFound(self.label.clone()))?;

        let header_set: HashSet<&str> = header.iter().map(String::as_str).collect();
        if header_set.len() != header.len() {
            return Err(CurveError::DataError("dataset header has duplicate column names".to_string()));
        }

        let categorical: HashSet<&str> = unique_names(&self.categorical, "categorical")?;
        for name in &categorical {
            if !header_set.contains(name) {
                return Err(CurveError::ConfigError(format!(
                    "categorical column '{}' not found in dataset header",
                    name
                )));
            }
        }

        let feature_names: Vec<String> = header
            .iter()
            .filter(|h| **h != self.label)
            .cloned()
            .collect();

        let is_continuous: Vec<bool> = match &self.continuous {
            ContinuousColumns::AllFeatures => {
                if let Some(name) = categorical.iter().find(|n| **n != self.label) {
                    return Err(CurveError::ConfigError(format!(
                        "column '{}' is categorical but all features are declared continuous",
                        name
                    )));
                }
                vec![true; feature_names.len()]
            }
            ContinuousColumns::Remaining => feature_names
                .iter()
                .map(|f| !categorical.contains(f.as_str()))
                .collect(),
            ContinuousColumns::Named(names) => {
                let continuous = unique_names(names, "continuous")?;
                for name in &continuous {
                    if *name == self.label {
                        return Err(CurveError::ConfigError(format!(
                            "label column '{}' cannot be continuous",
                            name
                        )));
                    }
                    if !header_set.contains(name) {
                        return Err(CurveError::ConfigError(format!(
                            "continuous column '{}' not found in dataset header",
                            name
                        )));
                    }
                    if categorical.contains(name) {
                        return Err(CurveError::ConfigError(format!(
                            "column '{}' is listed as both categorical and continuous",
                            name
                        )));
                    }
                }
                if let Some(name) = feature_names
                    .iter()
                    .find(|f| !continuous.contains(f.as_str()) && !categorical.contains(f.as_str()))
                {
                    return Err(CurveError::ConfigError(format!(
                        "feature column '{}' has no role",
                        name
                    )));
                }
                feature_names
                    .iter()
                    .map(|f| continuous.contains(f.as_str()))
                    .collect()
            }
        };

        let (continuous, categorical): (Vec<usize>, Vec<usize>) =
            (0..feature_names.len()).partition(|&i| is_continuous[i]);

        Ok(ResolvedRoles {
            label_index,
            feature_names,
            continuous,
            categorical,
        })
    }
}

fn unique_names<'a>(names: &'a [String], role: &str) -> Result<HashSet<&'a str>> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(CurveError::ConfigError(format!(
                "{} column '{}' listed twice",
                role, name
            )));
        }
    }
    Ok(seen)
}
