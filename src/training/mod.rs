//! Model training module
//!
//! Provides the classifiers evaluated by the harness and the fold splitter
//! used during model selection:
//! - Multinomial logistic regression
//! - Decision trees and Random Forests
//! - Shuffled k-fold cross-validation

mod models;
pub mod cross_validation;
pub mod linear_models;
pub mod decision_tree;
pub mod random_forest;

pub use models::{Classifier, ClassifierFactory};
pub use cross_validation::{CVResults, CVSplit, KFold};
pub use linear_models::{LogisticRegression, LogisticRegressionFactory};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use random_forest::{MaxFeatures, RandomForest, RandomForestFactory};
