//! Hyperparameter grid definition
//!
//! Provides the search space used by model selection:
//! - Ordered parameter → candidate-value mapping ([`SearchSpace`])
//! - Lazy Cartesian-product enumeration ([`Combinations`])

mod search_space;
pub mod grid;

pub use grid::Combinations;
pub use search_space::{Configuration, ParamValue, SearchSpace};
