//! Leakage-safe standard scaling

use crate::error::{CurveError, Result};
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fits z-score standardization on designated columns of one partition.
///
/// The transform only ever sees the rows it is fit on. Callers fit on a
/// training partition and reuse the returned [`ScalingTransform`] for the
/// matching validation or test rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardScaler;

/// Per-column statistics learned from a single training partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingTransform {
    columns: Vec<usize>,
    means: Vec<f64>,
    scales: Vec<f64>,
    n_features: usize,
}

impl StandardScaler {
    /// Compute mean and population standard deviation (ddof = 0) of each
    /// listed column over the rows of `x`.
    ///
    /// A column with zero variance gets scale 1.0 and is only centered.
    pub fn fit(x: ArrayView2<f64>, columns: &[usize]) -> Result<ScalingTransform> {
        let n_rows = x.nrows();
        let n_features = x.ncols();

        if n_rows == 0 {
            return Err(CurveError::DataError(
                "cannot fit scaler on an empty partition".to_string(),
            ));
        }

        let mut means = Vec::with_capacity(columns.len());
        let mut scales = Vec::with_capacity(columns.len());

        for &col in columns {
            if col >= n_features {
                return Err(CurveError::DataError(format!(
                    "scaling column {} out of range for {} features",
                    col, n_features
                )));
            }

            let values = x.index_axis(Axis(1), col);
            let mean = values.sum() / n_rows as f64;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n_rows as f64;
            let std = var.sqrt();

            if !mean.is_finite() || !std.is_finite() {
                return Err(CurveError::DegenerateFeature {
                    column: col,
                    reason: "non-finite values in fit partition".to_string(),
                });
            }

            // Rounding leaves a constant column with a tiny non-zero deviation
            let scale = if std <= 10.0 * f64::EPSILON * mean.abs().max(1.0) {
                debug!(column = col, "zero-variance column, using unit scale");
                1.0
            } else {
                std
            };

            means.push(mean);
            scales.push(scale);
        }

        Ok(ScalingTransform {
            columns: columns.to_vec(),
            means,
            scales,
            n_features,
        })
    }

    /// Fit on `x` and return both the transform and the scaled copy
    pub fn fit_transform(x: ArrayView2<f64>, columns: &[usize]) -> Result<(ScalingTransform, Array2<f64>)> {
        let transform = Self::fit(x, columns)?;
        let scaled = transform.transform(x)?;
        Ok((transform, scaled))
    }
}

impl ScalingTransform {
    /// Return a scaled copy of `x`; columns not fit are copied unchanged
    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features {
            return Err(CurveError::ShapeError {
                expected: format!("{} columns", self.n_features),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let mut out = x.to_owned();
        for ((&col, &mean), &scale) in self.columns.iter().zip(&self.means).zip(&self.scales) {
            out.index_axis_mut(Axis(1), col)
                .mapv_inplace(|v| (v - mean) / scale);
        }
        Ok(out)
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }
}
