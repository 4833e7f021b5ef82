//! Built-in evaluation tasks
//!
//! A task binds a dataset file and its column roles to a classifier
//! family, its search space and the metrics reported on the test holdout.

mod cancer_diagnosis;
mod sepsis_mortality;

use crate::evaluation::{LossKind, Metric};
use crate::optimizer::SearchSpace;
use crate::preprocessing::ColumnRoles;
use crate::training::ClassifierFactory;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use cancer_diagnosis::cancer_diagnosis;
pub use sepsis_mortality::sepsis_mortality;

/// Everything the evaluator needs to know about one benchmark
pub struct EvaluationTask {
    /// Task name; also the results subdirectory
    pub name: String,
    pub factory: Box<dyn ClassifierFactory>,
    pub search_space: SearchSpace,
    /// Loss minimized during model selection
    pub loss: LossKind,
    /// Metrics reported for the refit model, in output order
    pub metrics: Vec<Metric>,
    pub roles: ColumnRoles,
    /// File name inside the data directory
    pub dataset_file: String,
}

impl EvaluationTask {
    pub fn method_name(&self) -> &str {
        self.factory.method_name()
    }

    /// Output file stem: `<task>_<method>_baseline_<timestamp>`
    pub fn output_stem(&self, timestamp: &str) -> String {
        format!("{}_{}_baseline_{}", self.name, self.method_name(), timestamp)
    }

    pub fn with_search_space(mut self, search_space: SearchSpace) -> Self {
        self.search_space = search_space;
        self
    }

    pub fn with_roles(mut self, roles: ColumnRoles) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_dataset_file(mut self, file: impl Into<String>) -> Self {
        self.dataset_file = file.into();
        self
    }
}

impl fmt::Debug for EvaluationTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationTask")
            .field("name", &self.name)
            .field("method", &self.method_name())
            .field("search_space", &self.search_space)
            .field("loss", &self.loss)
            .field("metrics", &self.metrics)
            .field("roles", &self.roles)
            .field("dataset_file", &self.dataset_file)
            .finish()
    }
}

/// Names of the built-in tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskName {
    CancerDiagnosis,
    SepsisMortality,
}

impl TaskName {
    pub fn all() -> [TaskName; 2] {
        [TaskName::CancerDiagnosis, TaskName::SepsisMortality]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskName::CancerDiagnosis => "cancer_diagnosis",
            TaskName::SepsisMortality => "sepsis_mortality",
        }
    }

    pub fn task(&self) -> EvaluationTask {
        match self {
            TaskName::CancerDiagnosis => cancer_diagnosis(),
            TaskName::SepsisMortality => sepsis_mortality(),
        }
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_names_match_output_layout() {
        for name in TaskName::all() {
            let task = name.task();
            assert_eq!(task.name, name.as_str());
            assert!(task.output_stem("20240101-120000").starts_with(&format!("{}_", name)));
            assert!(task.search_space.validate().is_ok());
            assert!(!task.metrics.is_empty());
        }
    }

    #[test]
    fn test_output_stem() {
        let task = TaskName::SepsisMortality.task();
        assert_eq!(
            task.output_stem("20240101-120000"),
            "sepsis_mortality_random_forest_baseline_20240101-120000"
        );
    }
}
