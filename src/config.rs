//! Protocol configuration

use crate::error::{CurveError, Result};
use serde::{Deserialize, Serialize};

/// Parameters of the nested evaluation protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Folds used for inner model selection
    pub k_inner: usize,

    /// Outer repetitions, each with a fresh test holdout
    pub k_outer: usize,

    /// Seed for the shared generator, the fold shuffle and the classifiers
    pub seed: u64,

    /// Number of learning-curve points per repetition
    pub num_subsamples: usize,

    /// Share of rows held out for testing in each repetition
    pub test_fraction: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            k_inner: 5,
            k_outer: 10,
            seed: 42,
            num_subsamples: 10,
            test_fraction: 0.1,
        }
    }
}

impl EvaluationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_k_inner(mut self, k: usize) -> Self {
        self.k_inner = k;
        self
    }

    pub fn with_k_outer(mut self, k: usize) -> Self {
        self.k_outer = k;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_num_subsamples(mut self, n: usize) -> Self {
        self.num_subsamples = n;
        self
    }

    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    /// Check parameter ranges before any data is touched
    pub fn validate(&self) -> Result<()> {
        let invalid = |name: &str, value: String, reason: &str| CurveError::InvalidParameter {
            name: name.to_string(),
            value,
            reason: reason.to_string(),
        };

        if self.k_inner < 2 {
            return Err(invalid("k_inner", self.k_inner.to_string(), "must be at least 2"));
        }
        if self.k_outer < 1 {
            return Err(invalid("k_outer", self.k_outer.to_string(), "must be at least 1"));
        }
        if self.num_subsamples < 1 {
            return Err(invalid(
                "num_subsamples",
                self.num_subsamples.to_string(),
                "must be at least 1",
            ));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(invalid(
                "test_fraction",
                self.test_fraction.to_string(),
                "must lie strictly between 0 and 1",
            ));
        }
        Ok(())
    }
}
