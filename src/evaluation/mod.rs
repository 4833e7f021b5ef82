//! Nested cross-validation evaluation
//!
//! - [`protocol`] - Outer repetitions and learning-curve sweep
//! - [`selection`] - Inner k-fold grid search
//! - [`metrics`] - Cross-entropy and micro F1
//! - [`results`] - Ordered result records
//! - [`sampling`] - Holdout and subsample draws

pub mod metrics;
pub mod protocol;
pub mod results;
pub mod sampling;
pub mod selection;

pub use metrics::{cross_entropy, f1_micro, one_hot, LossKind, Metric};
pub use protocol::Evaluator;
pub use results::{EvaluationRecord, ResultAccumulator, ResultTable, SummaryRow};
pub use sampling::{draw_holdout, draw_subsample, subsample_fractions, HoldoutSplit};
pub use selection::{select_hyperparameters, CvScore, Selection, SelectionContext};
