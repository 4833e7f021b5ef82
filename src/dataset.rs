//! In-memory tabular dataset with class-index labels

use crate::error::{CurveError, Result};
use crate::preprocessing::ColumnRoles;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use tracing::debug;

/// Feature matrix plus encoded labels for one evaluation task.
///
/// Labels are stored as indices into `classes`, which holds the original
/// label values in ascending order.
#[derive(Debug, Clone)]
pub struct Dataset {
    features: Array2<f64>,
    labels: Array1<usize>,
    classes: Vec<f64>,
    feature_names: Vec<String>,
    label_name: String,
    continuous: Vec<usize>,
}

impl Dataset {
    /// Build from already-numeric parts; `continuous` indexes feature columns
    pub fn from_parts(
        features: Array2<f64>,
        raw_labels: &[f64],
        feature_names: Vec<String>,
        label_name: impl Into<String>,
        continuous: Vec<usize>,
    ) -> Result<Self> {
        if features.nrows() != raw_labels.len() {
            return Err(CurveError::ShapeError {
                expected: format!("{} labels", features.nrows()),
                actual: format!("{} labels", raw_labels.len()),
            });
        }
        if features.ncols() != feature_names.len() {
            return Err(CurveError::ShapeError {
                expected: format!("{} feature names", features.ncols()),
                actual: format!("{} feature names", feature_names.len()),
            });
        }
        if let Some(&bad) = continuous.iter().find(|&&c| c >= features.ncols()) {
            return Err(CurveError::DataError(format!(
                "continuous column {} out of range for {} features",
                bad,
                features.ncols()
            )));
        }

        let label_name = label_name.into();
        let (labels, classes) = encode_labels(raw_labels, &label_name)?;

        Ok(Self {
            features,
            labels,
            classes,
            feature_names,
            label_name,
            continuous,
        })
    }

    /// Extract features and labels from a loaded frame using `roles`
    pub fn from_dataframe(df: &DataFrame, roles: &ColumnRoles) -> Result<Self> {
        let header: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        let resolved = roles.resolve(&header)?;

        let n_rows = df.height();
        let col_data: Vec<Vec<f64>> = resolved
            .feature_names
            .iter()
            .map(|name| numeric_column(df, name))
            .collect::<Result<Vec<_>>>()?;
        let features = Array2::from_shape_fn((n_rows, col_data.len()), |(r, c)| col_data[c][r]);

        let raw_labels = numeric_column(df, &roles.label)?;

        debug!(
            rows = n_rows,
            features = resolved.feature_names.len(),
            continuous = resolved.continuous.len(),
            "Dataset extracted"
        );

        Self::from_parts(
            features,
            &raw_labels,
            resolved.feature_names,
            roles.label.clone(),
            resolved.continuous,
        )
    }

    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn labels(&self) -> &Array1<usize> {
        &self.labels
    }

    /// Original label values, indexed by class index
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn label_name(&self) -> &str {
        &self.label_name
    }

    /// Feature indices of the columns to standardize
    pub fn continuous(&self) -> &[usize] {
        &self.continuous
    }

    /// Copy out the given rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> (Array2<f64>, Array1<usize>) {
        (
            self.features.select(Axis(0), rows),
            self.labels.select(Axis(0), rows),
        )
    }
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| CurveError::FeatureNotFound(name.to_string()))?;
    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| CurveError::DataError(format!("column '{}' is not numeric: {}", name, e)))?;

    // A failed cast to f64 surfaces as new nulls, so one check covers both
    if series.null_count() > 0 {
        return Err(CurveError::DataError(format!(
            "column '{}' has {} missing or non-numeric values",
            name,
            series.null_count()
        )));
    }

    Ok(series.f64()?.into_no_null_iter().collect())
}

fn encode_labels(raw: &[f64], label_name: &str) -> Result<(Array1<usize>, Vec<f64>)> {
    if raw.iter().any(|v| !v.is_finite()) {
        return Err(CurveError::DataError(format!(
            "label column '{}' has non-finite values",
            label_name
        )));
    }

    let mut classes = raw.to_vec();
    classes.sort_by(f64::total_cmp);
    classes.dedup();

    let labels = raw
        .iter()
        .map(|v| {
            classes
                .binary_search_by(|c| c.total_cmp(v))
                .map_err(|_| CurveError::DataError(format!("label value {} not encodable", v)))
        })
        .collect::<Result<Vec<usize>>>()?;

    Ok((Array1::from_vec(labels), classes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::ContinuousColumns;
    use ndarray::array;

    #[test]
    fn test_from_dataframe() {
        let df = df! {
            "age" => [50.0, 61.0, 47.0, 70.0],
            "smoking" => [0i64, 1, 1, 0],
            "disease" => [2i64, 0, 2, 1],
        }
        .unwrap();

        let roles = ColumnRoles::new("disease", ContinuousColumns::Remaining)
            .with_categorical(["smoking", "disease"]);
        let ds = Dataset::from_dataframe(&df, &roles).unwrap();

        assert_eq!(ds.n_rows(), 4);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.feature_names(), &["age".to_string(), "smoking".to_string()]);
        assert_eq!(ds.continuous(), &[0]);
        assert_eq!(ds.classes(), &[0.0, 1.0, 2.0]);
        assert_eq!(ds.labels(), &array![2, 0, 2, 1]);
        assert_eq!(ds.features()[[1, 0]], 61.0);
    }

    #[test]
    fn test_missing_values_rejected() {
        let df = df! {
            "x" => [Some(1.0), None, Some(3.0)],
            "y" => [0i64, 1, 0],
        }
        .unwrap();

        let roles = ColumnRoles::new("y", ContinuousColumns::AllFeatures);
        let err = Dataset::from_dataframe(&df, &roles).unwrap_err();
        assert!(matches!(err, CurveError::DataError(_)));
    }

    #[test]
    fn test_labels_encoded_in_sorted_order() {
        let ds = Dataset::from_parts(
            array![[1.0], [2.0], [3.0]],
            &[5.0, -1.0, 5.0],
            vec!["x".to_string()],
            "y",
            vec![0],
        )
        .unwrap();

        assert_eq!(ds.classes(), &[-1.0, 5.0]);
        assert_eq!(ds.labels(), &array![1, 0, 1]);

        let (x, y) = ds.select_rows(&[2, 0]);
        assert_eq!(x, array![[3.0], [1.0]]);
        assert_eq!(y, array![1, 1]);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = Dataset::from_parts(array![[1.0]], &[0.0, 1.0], vec!["x".into()], "y", vec![]);
        assert!(err.is_err());
    }
}
