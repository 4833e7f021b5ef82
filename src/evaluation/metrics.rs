//! Held-out scoring metrics

use crate::error::{CurveError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Probability clipping bound applied before taking logarithms
pub const PROBA_EPSILON: f64 = 1e-7;

/// Which cross-entropy form a task is scored with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    /// Two classes; the last probability column is P(positive)
    Binary,
    /// Any number of classes, sparse labels
    Categorical,
}

/// A metric reported for the refit model on the test holdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    CrossEntropy(LossKind),
    F1Micro,
}

impl Metric {
    /// Name written to the `metric` column of the results
    pub fn name(&self) -> &'static str {
        match self {
            Metric::CrossEntropy(_) => "cross_entropy",
            Metric::F1Micro => "f1",
        }
    }

    pub fn compute(&self, y_true: &Array1<usize>, proba: &Array2<f64>, n_classes: usize) -> Result<f64> {
        match self {
            Metric::CrossEntropy(kind) => cross_entropy(*kind, y_true, proba),
            Metric::F1Micro => f1_micro(&one_hot(y_true, n_classes)?, proba, n_classes),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn check_rows(y_len: usize, proba: &Array2<f64>) -> Result<()> {
    if y_len != proba.nrows() {
        return Err(CurveError::ShapeError {
            expected: format!("{} probability rows", y_len),
            actual: format!("{} probability rows", proba.nrows()),
        });
    }
    if y_len == 0 {
        return Err(CurveError::DataError("cannot score zero rows".to_string()));
    }
    Ok(())
}

#[inline]
fn clip(p: f64) -> f64 {
    p.clamp(PROBA_EPSILON, 1.0 - PROBA_EPSILON)
}

/// Mean cross-entropy of `proba` against class-index labels.
///
/// Probabilities are clipped to `[1e-7, 1 - 1e-7]`, so the result is
/// finite and non-negative for any finite input.
pub fn cross_entropy(kind: LossKind, y_true: &Array1<usize>, proba: &Array2<f64>) -> Result<f64> {
    check_rows(y_true.len(), proba)?;
    let n = y_true.len() as f64;

    match kind {
        LossKind::Binary => {
            let last = proba.ncols().checked_sub(1).ok_or_else(|| {
                CurveError::DataError("binary cross-entropy needs a probability column".to_string())
            })?;
            let mut total = 0.0;
            for (i, &y) in y_true.iter().enumerate() {
                let p = clip(proba[[i, last]]);
                total += match y {
                    0 => -(1.0 - p).ln(),
                    1 => -p.ln(),
                    other => {
                        return Err(CurveError::DataError(format!(
                            "binary cross-entropy got label {}",
                            other
                        )))
                    }
                };
            }
            Ok(total / n)
        }
        LossKind::Categorical => {
            let mut total = 0.0;
            for (i, &y) in y_true.iter().enumerate() {
                if y >= proba.ncols() {
                    return Err(CurveError::DataError(format!(
                        "label {} has no probability column ({} columns)",
                        y,
                        proba.ncols()
                    )));
                }
                total -= clip(proba[[i, y]]).ln();
            }
            Ok(total / n)
        }
    }
}

/// Micro-averaged F1 over one-hot targets.
///
/// Every class whose probability equals its row's maximum counts as a
/// positive prediction; true/false positives and false negatives are pooled
/// over all classes. Zero denominators give 0.
pub fn f1_micro(y_true: &Array2<f64>, proba: &Array2<f64>, n_classes: usize) -> Result<f64> {
    check_rows(y_true.nrows(), proba)?;
    if y_true.ncols() != n_classes || proba.ncols() != n_classes {
        return Err(CurveError::ShapeError {
            expected: format!("{} columns", n_classes),
            actual: format!("targets {}, probabilities {}", y_true.ncols(), proba.ncols()),
        });
    }

    let (mut tp, mut fp, mut fn_) = (0.0f64, 0.0f64, 0.0f64);
    for (truth, row) in y_true.rows().into_iter().zip(proba.rows()) {
        let max = row.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        for (&t, &p) in truth.iter().zip(row.iter()) {
            let predicted = p == max;
            let actual = t > 0.5;
            match (predicted, actual) {
                (true, true) => tp += 1.0,
                (true, false) => fp += 1.0,
                (false, true) => fn_ += 1.0,
                (false, false) => {}
            }
        }
    }

    let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
    let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
    if precision + recall > 0.0 {
        Ok(2.0 * precision * recall / (precision + recall))
    } else {
        Ok(0.0)
    }
}

/// One-hot encode class indices
pub fn one_hot(labels: &Array1<usize>, n_classes: usize) -> Result<Array2<f64>> {
    let mut encoded = Array2::<f64>::zeros((labels.len(), n_classes));
    for (i, &label) in labels.iter().enumerate() {
        if label >= n_classes {
            return Err(CurveError::DataError(format!(
                "label {} out of range for {} classes",
                label, n_classes
            )));
        }
        encoded[[i, label]] = 1.0;
    }
    Ok(encoded)
}
