//! Without-replacement row draws from the shared generator

use crate::error::{CurveError, Result};
use rand::seq::index::sample;
use rand::Rng;

/// A test holdout and its complementary development pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldoutSplit {
    /// Test rows, in draw order
    pub test: Vec<usize>,
    /// Remaining rows, ascending
    pub development: Vec<usize>,
}

/// Draw `floor(test_fraction · n_rows)` test rows from `0..n_rows`.
///
/// Consumes exactly one draw from `rng`.
pub fn draw_holdout<R: Rng + ?Sized>(rng: &mut R, n_rows: usize, test_fraction: f64) -> Result<HoldoutSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(CurveError::InvalidParameter {
            name: "test_fraction".to_string(),
            value: test_fraction.to_string(),
            reason: "must lie strictly between 0 and 1".to_string(),
        });
    }

    let n_test = (test_fraction * n_rows as f64).floor() as usize;
    if n_test == 0 || n_test >= n_rows {
        return Err(CurveError::DataError(format!(
            "{} rows leave a test holdout of {} rows at fraction {}",
            n_rows, n_test, test_fraction
        )));
    }

    let test = sample(rng, n_rows, n_test).into_vec();

    let mut in_test = vec![false; n_rows];
    for &i in &test {
        in_test[i] = true;
    }
    let development = (0..n_rows).filter(|&i| !in_test[i]).collect();

    Ok(HoldoutSplit { test, development })
}

/// Draw `floor(fraction · pool.len())` rows of `pool` without replacement.
///
/// Returned rows are pool entries (dataset row indices) in draw order.
pub fn draw_subsample<R: Rng + ?Sized>(rng: &mut R, pool: &[usize], fraction: f64) -> Result<Vec<usize>> {
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(CurveError::InvalidParameter {
            name: "fraction".to_string(),
            value: fraction.to_string(),
            reason: "must lie in (0, 1]".to_string(),
        });
    }

    let n = (fraction * pool.len() as f64).floor() as usize;
    if n == 0 {
        return Err(CurveError::DataError(format!(
            "fraction {} of {} development rows is empty",
            fraction,
            pool.len()
        )));
    }

    Ok(sample(rng, pool.len(), n).into_iter().map(|i| pool[i]).collect())
}

/// Subsample fractions `i / num_subsamples` for `i = 1..=num_subsamples`
pub fn subsample_fractions(num_subsamples: usize) -> Vec<f64> {
    (1..=num_subsamples)
        .map(|i| i as f64 / num_subsamples as f64)
        .collect()
}
