//! Random Forest implementation

use crate::error::{CurveError, Result};
use crate::optimizer::{Configuration, ParamValue};
use super::decision_tree::{Criterion, DecisionTree};
use super::models::{
    check_fit_inputs, check_known_params, param_bool, param_choice, param_opt_usize, param_usize,
    Classifier, ClassifierFactory,
};
use ndarray::{Array1, Array2};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random Forest classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Individual trees
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum depth per tree
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split
    pub max_features: MaxFeatures,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Random state
    pub random_state: u64,
    n_classes: usize,
}

/// Strategy for max features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// Square root of n_features, rounded down
    Sqrt,
    /// Log2 of n_features, rounded down
    Log2,
    /// Fraction of n_features
    Fraction(f64),
    /// Fixed number
    Fixed(usize),
    /// All features
    All,
}

impl MaxFeatures {
    /// Decode a grid value: `none` means all features
    fn from_param(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::None => Some(MaxFeatures::All),
            ParamValue::Str(s) => match s.as_str() {
                "sqrt" | "auto" => Some(MaxFeatures::Sqrt),
                "log2" => Some(MaxFeatures::Log2),
                _ => None,
            },
            ParamValue::Int(n) if *n >= 1 => Some(MaxFeatures::Fixed(*n as usize)),
            ParamValue::Float(f) if *f > 0.0 && *f <= 1.0 => Some(MaxFeatures::Fraction(*f)),
            _ => None,
        }
    }

    fn resolve(&self, n_features: usize) -> usize {
        let n = n_features as f64;
        match *self {
            MaxFeatures::Sqrt => n.sqrt().floor() as usize,
            MaxFeatures::Log2 => n.log2().floor() as usize,
            MaxFeatures::Fraction(f) => (n * f).floor() as usize,
            MaxFeatures::Fixed(k) => k.min(n_features),
            MaxFeatures::All => n_features,
        }
        .max(1)
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RandomForest {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            criterion: Criterion::Gini,
            random_state: 42,
            n_classes: 0,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set max features strategy
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<()> {
        check_fit_inputs(x, y, n_classes)?;
        if self.n_estimators == 0 {
            return Err(CurveError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let n_samples = x.nrows();
        let max_features = self.max_features.resolve(x.ncols());

        // Per-tree generators come from the forest seed and tree position
        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| -> Result<DecisionTree> {
                let seed = self.random_state.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let sample_indices: Vec<usize> = if self.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                let mut tree = DecisionTree::new()
                    .with_max_depth(self.max_depth)
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf)
                    .with_max_features(Some(max_features))
                    .with_criterion(self.criterion)
                    .with_random_state(rng.next_u64());

                tree.fit_indices(x, y, &sample_indices, n_classes)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        self.trees = trees;
        self.n_classes = n_classes;
        Ok(())
    }

    /// Mean of the trees' leaf class distributions
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(CurveError::ModelNotFitted);
        }

        let per_tree: Vec<Array2<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict_proba(x))
            .collect::<Result<Vec<_>>>()?;

        let mut proba = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for p in &per_tree {
            proba += p;
        }
        proba /= self.trees.len() as f64;
        Ok(proba)
    }
}

/// Builds [`RandomForest`] models.
///
/// Grid parameters: `n_estimators` (default 100), `max_depth` (int or
/// `none`), `max_features` (`none` for all features, `"sqrt"`, `"log2"`,
/// an int count or a float fraction), `min_samples_split`,
/// `min_samples_leaf`, `bootstrap` and `criterion` (`"gini"` or `"entropy"`).
/// The forest seed is the run seed.
#[derive(Debug, Clone, Default)]
pub struct RandomForestFactory;

impl RandomForestFactory {
    const PARAMS: [&'static str; 7] = [
        "n_estimators",
        "max_depth",
        "max_features",
        "min_samples_split",
        "min_samples_leaf",
        "bootstrap",
        "criterion",
    ];
}

impl ClassifierFactory for RandomForestFactory {
    fn method_name(&self) -> &str {
        "random_forest"
    }

    fn build(&self, config: &Configuration, seed: u64) -> Result<Box<dyn Classifier>> {
        check_known_params(config, &Self::PARAMS)?;

        let max_features = match config.get("max_features") {
            None => MaxFeatures::Sqrt,
            Some(v) => MaxFeatures::from_param(v).ok_or_else(|| CurveError::InvalidParameter {
                name: "max_features".to_string(),
                value: v.to_string(),
                reason: "expected none, \"sqrt\", \"log2\", a positive int or a fraction in (0, 1]"
                    .to_string(),
            })?,
        };

        let criterion = match param_choice(config, "criterion", "gini", &["gini", "entropy"])? {
            "entropy" => Criterion::Entropy,
            _ => Criterion::Gini,
        };

        let n_estimators = param_usize(config, "n_estimators", 100)?;
        if n_estimators == 0 {
            return Err(CurveError::InvalidParameter {
                name: "n_estimators".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let model = RandomForest::new(n_estimators)
            .with_max_depth(param_opt_usize(config, "max_depth", None)?)
            .with_min_samples_split(param_usize(config, "min_samples_split", 2)?.max(2))
            .with_min_samples_leaf(param_usize(config, "min_samples_leaf", 1)?.max(1))
            .with_max_features(max_features)
            .with_bootstrap(param_bool(config, "bootstrap", true)?)
            .with_criterion(criterion)
            .with_random_state(seed);

        Ok(Box::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_clusters() -> (Array2<f64>, Array1<usize>) {
        let x = array![
            [1.0, 1.0],
            [1.5, 1.2],
            [1.2, 0.8],
            [0.8, 1.1],
            [5.0, 5.0],
            [5.5, 5.2],
            [5.2, 4.8],
            [4.8, 5.1],
        ];
        let y = array![0, 0, 0, 0, 1, 1, 1, 1];
        (x, y)
    }

    #[test]
    fn test_forest_probabilities() {
        let (x, y) = two_clusters();
        let mut rf = RandomForest::new(20).with_random_state(42);
        rf.fit(&x, &y, 2).unwrap();
        assert_eq!(rf.n_trees(), 20);

        let proba = rf.predict_proba(&array![[1.1, 1.0], [5.1, 5.0]]).unwrap();
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
        assert!(proba[[0, 0]] > 0.5);
        assert!(proba[[1, 1]] > 0.5);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = two_clusters();
        let fit = |seed| {
            let mut rf = RandomForest::new(10).with_random_state(seed);
            rf.fit(&x, &y, 2).unwrap();
            rf.predict_proba(&x).unwrap()
        };
        assert_eq!(fit(3), fit(3));
    }

    #[test]
    fn test_max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(15), 3);
        assert_eq!(MaxFeatures::Log2.resolve(1), 1);
        assert_eq!(MaxFeatures::All.resolve(7), 7);
        assert_eq!(MaxFeatures::Fixed(10).resolve(4), 4);
        assert_eq!(MaxFeatures::Fraction(0.5).resolve(9), 4);
    }

    #[test]
    fn test_factory_grid_values() {
        let factory = RandomForestFactory;
        assert_eq!(factory.method_name(), "random_forest");

        let config = Configuration::new(vec![
            ("n_estimators".to_string(), ParamValue::Int(30)),
            ("max_depth".to_string(), ParamValue::Int(3)),
            ("max_features".to_string(), ParamValue::None),
        ]);
        let mut model = factory.build(&config, 7).unwrap();
        let (x, y) = two_clusters();
        model.fit(&x, &y, 3).unwrap();
        assert_eq!(model.predict_proba(&x).unwrap().ncols(), 3);

        let bad = Configuration::new(vec![("max_features".to_string(), ParamValue::Str("half".to_string()))]);
        assert!(factory.build(&bad, 7).is_err());
    }
}
