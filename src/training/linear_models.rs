//! Multinomial logistic regression

use crate::error::{CurveError, Result};
use crate::optimizer::Configuration;
use super::models::{
    check_fit_inputs, check_known_params, param_bool, param_choice, param_f64, param_usize,
    Classifier, ClassifierFactory,
};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// L2-regularized softmax regression fit by full-batch gradient descent.
///
/// Minimizes `mean(cross_entropy) + ||W||² / (2·C·n)`, the per-sample form
/// of the `C`-weighted objective. The intercept is not penalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted weights, shape (n_features, n_classes)
    pub coefficients: Option<Array2<f64>>,
    /// Fitted intercepts, one per class
    pub intercept: Option<Array1<f64>>,
    /// Whether to fit intercept
    pub fit_intercept: bool,
    /// Inverse regularization strength; `None` disables the penalty
    pub c: Option<f64>,
    /// Maximum iterations
    pub max_iter: usize,
    /// Convergence tolerance on the largest gradient component
    pub tol: f64,
    /// Iterations used by the last fit
    pub n_iter: usize,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create a new logistic regression model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            fit_intercept: true,
            c: Some(1.0),
            max_iter: 100,
            tol: 1e-4,
            n_iter: 0,
        }
    }

    /// Set inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = Some(c);
        self
    }

    /// Disable the L2 penalty
    pub fn without_penalty(mut self) -> Self {
        self.c = None;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Row-wise softmax, stabilized by subtracting each row's maximum
    fn softmax(mut logits: Array2<f64>) -> Array2<f64> {
        for mut row in logits.axis_iter_mut(Axis(0)) {
            let max = row.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            row.mapv_inplace(|v| v / sum);
        }
        logits
    }

    fn logits(&self, x: &Array2<f64>, weights: &Array2<f64>, bias: &Array1<f64>) -> Array2<f64> {
        x.dot(weights) + bias
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<()> {
        check_fit_inputs(x, y, n_classes)?;

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let n = n_samples as f64;

        let lambda = match self.c {
            Some(c) if c > 0.0 => 1.0 / (c * n),
            Some(c) => {
                return Err(CurveError::InvalidParameter {
                    name: "C".to_string(),
                    value: c.to_string(),
                    reason: "must be positive".to_string(),
                })
            }
            None => 0.0,
        };

        let mut targets = Array2::<f64>::zeros((n_samples, n_classes));
        for (i, &class) in y.iter().enumerate() {
            targets[[i, class]] = 1.0;
        }

        // Softmax Hessian is bounded by half the mean squared row norm
        let intercept_term = if self.fit_intercept { 1.0 } else { 0.0 };
        let mean_sq_norm = x.rows().into_iter().map(|r| r.dot(&r)).sum::<f64>() / n + intercept_term;
        let lipschitz = 0.5 * mean_sq_norm + lambda;
        let lr = if lipschitz > 0.0 { 1.0 / lipschitz } else { 1.0 };

        let mut weights = Array2::<f64>::zeros((n_features, n_classes));
        let mut bias = Array1::<f64>::zeros(n_classes);
        self.n_iter = 0;

        for iter in 0..self.max_iter {
            let proba = Self::softmax(self.logits(x, &weights, &bias));
            let errors = proba - &targets;

            let dw = x.t().dot(&errors) / n + &weights * lambda;
            let db = if self.fit_intercept {
                errors.sum_axis(Axis(0)) / n
            } else {
                Array1::zeros(n_classes)
            };

            self.n_iter = iter + 1;

            let grad_max = dw
                .iter()
                .chain(db.iter())
                .fold(0.0f64, |acc, g| acc.max(g.abs()));
            if grad_max < self.tol {
                break;
            }

            weights.scaled_add(-lr, &dw);
            bias.scaled_add(-lr, &db);
        }

        if weights.iter().chain(bias.iter()).any(|v| !v.is_finite()) {
            return Err(CurveError::ConvergenceError { iterations: self.n_iter });
        }

        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (weights, bias) = match (&self.coefficients, &self.intercept) {
            (Some(w), Some(b)) => (w, b),
            _ => return Err(CurveError::ModelNotFitted),
        };

        if x.ncols() != weights.nrows() {
            return Err(CurveError::ShapeError {
                expected: format!("{} features", weights.nrows()),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok(Self::softmax(self.logits(x, weights, bias)))
    }
}

/// Builds [`LogisticRegression`] models.
///
/// Grid parameters: `C` (float, default 1.0), `penalty` (`"l2"` or
/// `"none"`), `max_iter` (int, default 100), `tol` (float, default 1e-4),
/// `fit_intercept` (bool, default true).
#[derive(Debug, Clone, Default)]
pub struct LogisticRegressionFactory;

impl LogisticRegressionFactory {
    const PARAMS: [&'static str; 5] = ["C", "penalty", "max_iter", "tol", "fit_intercept"];
}

impl ClassifierFactory for LogisticRegressionFactory {
    fn method_name(&self) -> &str {
        "logistic_regression"
    }

    fn build(&self, config: &Configuration, _seed: u64) -> Result<Box<dyn Classifier>> {
        check_known_params(config, &Self::PARAMS)?;

        let mut model = LogisticRegression::new()
            .with_max_iter(param_usize(config, "max_iter", 100)?)
            .with_tol(param_f64(config, "tol", 1e-4)?)
            .with_fit_intercept(param_bool(config, "fit_intercept", true)?);

        model = match param_choice(config, "penalty", "l2", &["l2", "none"])? {
            "none" => model.without_penalty(),
            _ => model.with_c(param_f64(config, "C", 1.0)?),
        };

        if model.max_iter == 0 {
            return Err(CurveError::InvalidParameter {
                name: "max_iter".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Box::new(model))
    }
}
