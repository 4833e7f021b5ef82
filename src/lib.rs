//! Kolosal Curves - Learning-curve benchmarks for tabular classifiers
//!
//! This crate measures how classifier performance scales with training-set
//! size using a nested cross-validation protocol:
//! - Repeated random test holdouts
//! - Nested training subsamples drawn from the remaining rows
//! - Inner k-fold grid search on each subsample
//! - Refit of the winning configuration, scored once on the holdout
//!
//! # Modules
//!
//! ## Core
//! - [`evaluation`] - Outer protocol, inner selection, metrics and results
//! - [`training`] - Classifiers and the k-fold splitter
//! - [`optimizer`] - Hyperparameter grids
//! - [`preprocessing`] - Train-only scaling and column roles
//!
//! ## Data
//! - [`dataset`] - Feature matrix and encoded labels
//! - [`tasks`] - Built-in benchmark tasks
//! - [`utils`] - CSV and JSON I/O
//!
//! ## Services
//! - [`config`] - Protocol parameters
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;
pub mod config;

// Core modules
pub mod dataset;
pub mod evaluation;
pub mod optimizer;
pub mod preprocessing;
pub mod training;

// Benchmarks and I/O
pub mod tasks;
pub mod utils;

// Services
pub mod cli;

pub use error::{CurveError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{CurveError, ErrorCategory, EvalContext, Result, ResultExt};

    // Configuration
    pub use crate::config::EvaluationConfig;

    // Data
    pub use crate::dataset::Dataset;
    pub use crate::preprocessing::{ColumnRoles, ContinuousColumns, StandardScaler};
    pub use crate::utils::{DataLoader, DataSaver};

    // Search space
    pub use crate::optimizer::{Configuration, ParamValue, SearchSpace};

    // Training
    pub use crate::training::{
        Classifier, ClassifierFactory, KFold, LogisticRegression, LogisticRegressionFactory,
        RandomForest, RandomForestFactory,
    };

    // Evaluation
    pub use crate::evaluation::{
        Evaluator, EvaluationRecord, LossKind, Metric, ResultAccumulator, ResultTable,
    };

    // Tasks
    pub use crate::tasks::{EvaluationTask, TaskName};
}
