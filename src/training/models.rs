//! Classifier traits and hyperparameter decoding helpers

use crate::error::{CurveError, Result};
use crate::optimizer::{Configuration, ParamValue};
use ndarray::{Array1, Array2};

/// A probabilistic classifier over class indices `0..n_classes`
pub trait Classifier: Send + Sync {
    /// Fit the model to training data.
    ///
    /// `n_classes` is the class count of the whole task, which may exceed
    /// the number of classes present in `y` for a small training fold.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<()>;

    /// Predict class probabilities, one column per task class
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;
}

/// Builds fresh classifiers of one family from grid configurations
pub trait ClassifierFactory: Send + Sync {
    /// Method name reported in result records
    fn method_name(&self) -> &str;

    /// Build an unfitted classifier for `config`, seeded with `seed`
    fn build(&self, config: &Configuration, seed: u64) -> Result<Box<dyn Classifier>>;
}

/// Validate shapes shared by every classifier's `fit`
pub(crate) fn check_fit_inputs(x: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(CurveError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    if x.nrows() == 0 {
        return Err(CurveError::DataError("cannot fit on zero rows".to_string()));
    }
    if n_classes < 2 {
        return Err(CurveError::DataError(format!(
            "need at least 2 classes, got {}",
            n_classes
        )));
    }
    if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
        return Err(CurveError::DataError(format!(
            "label {} out of range for {} classes",
            bad, n_classes
        )));
    }
    Ok(())
}

/// Reject configuration keys a classifier family does not understand
pub(crate) fn check_known_params(config: &Configuration, known: &[&str]) -> Result<()> {
    for (name, value) in config.iter() {
        if !known.contains(&name) {
            return Err(CurveError::InvalidParameter {
                name: name.to_string(),
                value: value.to_string(),
                reason: format!("unknown parameter, expected one of {:?}", known),
            });
        }
    }
    Ok(())
}

fn invalid(name: &str, value: &ParamValue, reason: &str) -> CurveError {
    CurveError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub(crate) fn param_f64(config: &Configuration, name: &str, default: f64) -> Result<f64> {
    match config.get(name) {
        None => Ok(default),
        Some(v) => v.as_f64().ok_or_else(|| invalid(name, v, "expected a number")),
    }
}

pub(crate) fn param_usize(config: &Configuration, name: &str, default: usize) -> Result<usize> {
    match config.get(name) {
        None => Ok(default),
        Some(v) => v.as_usize().ok_or_else(|| invalid(name, v, "expected a non-negative integer")),
    }
}

/// Integer parameter where an explicit `none` means "unbounded"
pub(crate) fn param_opt_usize(config: &Configuration, name: &str, default: Option<usize>) -> Result<Option<usize>> {
    match config.get(name) {
        None => Ok(default),
        Some(ParamValue::None) => Ok(None),
        Some(v) => v
            .as_usize()
            .map(Some)
            .ok_or_else(|| invalid(name, v, "expected a non-negative integer or none")),
    }
}

pub(crate) fn param_bool(config: &Configuration, name: &str, default: bool) -> Result<bool> {
    match config.get(name) {
        None => Ok(default),
        Some(v) => v.as_bool().ok_or_else(|| invalid(name, v, "expected true or false")),
    }
}

/// String choice parameter restricted to `choices`
pub(crate) fn param_choice<'a>(
    config: &'a Configuration,
    name: &str,
    default: &'a str,
    choices: &[&str],
) -> Result<&'a str> {
    match config.get(name) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            Some(s) if choices.contains(&s) => Ok(s),
            _ => Err(invalid(name, v, &format!("expected one of {:?}", choices))),
        },
    }
}
