//! Classification tree with class-distribution leaves

use crate::error::{CurveError, Result};
use super::models::check_fit_inputs;
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node holding the class distribution of its training rows
    Leaf {
        distribution: Vec<f64>,
        n_samples: usize,
    },
    /// Internal node; rows with `x[feature_idx] <= threshold` go left
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Criterion {
    /// Gini impurity
    Gini,
    /// Shannon entropy
    Entropy,
}

impl Criterion {
    fn impurity(&self, counts: &[usize], total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let n = total as f64;
        match self {
            Criterion::Gini => {
                1.0 - counts
                    .iter()
                    .map(|&c| (c as f64 / n).powi(2))
                    .sum::<f64>()
            }
            Criterion::Entropy => -counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.ln()
                })
                .sum::<f64>(),
        }
    }
}

/// Decision tree classifier.
///
/// When `max_features` is below the feature count, each node draws its own
/// candidate feature subset from a generator seeded with `random_state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split
    pub max_features: Option<usize>,
    pub criterion: Criterion,
    pub random_state: u64,
    n_features: usize,
    n_classes: usize,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            criterion: Criterion::Gini,
            random_state: 0,
            n_features: 0,
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

    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set criterion
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fit on the rows of `x` listed in `indices`; rows may repeat
    pub fn fit_indices(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<usize>,
        indices: &[usize],
        n_classes: usize,
    ) -> Result<()> {
        check_fit_inputs(x, y, n_classes)?;
        if indices.is_empty() || x.ncols() == 0 {
            return Err(CurveError::DataError(format!(
                "cannot fit a tree on {} rows and {} features",
                indices.len(),
                x.ncols()
            )));
        }

        self.n_features = x.ncols();
        self.n_classes = n_classes;

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        self.root = Some(self.build_tree(x, y, indices, 0, &mut rng));
        Ok(())
    }

    /// Fit on every row of `x`
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<()> {
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.fit_indices(x, y, &indices, n_classes)
    }

    fn class_counts(&self, y: &Array1<usize>, rows: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in rows {
            counts[y[i]] += 1;
        }
        counts
    }

    fn leaf(counts: &[usize], n_samples: usize) -> TreeNode {
        let n = n_samples as f64;
        TreeNode::Leaf {
            distribution: counts.iter().map(|&c| c as f64 / n).collect(),
            n_samples,
        }
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<usize>,
        rows: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n_samples = rows.len();
        let counts = self.class_counts(y, rows);
        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || is_pure;

        if should_stop {
            return Self::leaf(&counts, n_samples);
        }

        let Some(best) = self.find_best_split(x, y, rows, &counts, rng) else {
            return Self::leaf(&counts, n_samples);
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&i| x[[i, best.feature_idx]] <= best.threshold);

        let left = Box::new(self.build_tree(x, y, &left_rows, depth + 1, rng));
        let right = Box::new(self.build_tree(x, y, &right_rows, depth + 1, rng));

        TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left,
            right,
            n_samples,
        }
    }

    fn candidate_features(&self, rng: &mut ChaCha8Rng) -> Vec<usize> {
        let k = self.max_features.unwrap_or(self.n_features).clamp(1, self.n_features);
        if k >= self.n_features {
            (0..self.n_features).collect()
        } else {
            sample(rng, self.n_features, k).into_vec()
        }
    }

    /// Sorted sweep per candidate feature with incremental class counts
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<usize>,
        rows: &[usize],
        parent_counts: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n = rows.len();
        let parent_impurity = self.criterion.impurity(parent_counts, n);
        let mut best: Option<SplitCandidate> = None;

        let mut order: Vec<usize> = rows.to_vec();
        for feature_idx in self.candidate_features(rng) {
            order.sort_by(|&a, &b| x[[a, feature_idx]].total_cmp(&x[[b, feature_idx]]));

            let mut left_counts = vec![0usize; self.n_classes];
            let mut right_counts = parent_counts.to_vec();

            for pos in 0..n - 1 {
                let row = order[pos];
                left_counts[y[row]] += 1;
                right_counts[y[row]] -= 1;

                let value = x[[row, feature_idx]];
                let next = x[[order[pos + 1], feature_idx]];
                if value == next {
                    continue;
                }

                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let weighted = (n_left as f64 * self.criterion.impurity(&left_counts, n_left)
                    + n_right as f64 * self.criterion.impurity(&right_counts, n_right))
                    / n as f64;
                let gain = parent_impurity - weighted;

                if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                    let mut threshold = value + (next - value) / 2.0;
                    // Midpoint can round up to `next` for adjacent floats
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }

    fn leaf_distribution<'a>(&self, root: &'a TreeNode, row: ArrayView1<f64>) -> &'a [f64] {
        let mut node = root;
        loop {
            match node {
                TreeNode::Leaf { distribution, .. } => return distribution,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    node = if row[*feature_idx] <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Leaf class distributions for each row, one column per class
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let root = self.root.as_ref().ok_or(CurveError::ModelNotFitted)?;

        if x.ncols() != self.n_features {
            return Err(CurveError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        let mut proba = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for (i, row) in x.rows().into_iter().enumerate() {
            let dist = self.leaf_distribution(root, row);
            for (j, &p) in dist.iter().enumerate() {
                proba[[i, j]] = p;
            }
        }
        Ok(proba)
    }

    /// Depth of the fitted tree; a single leaf has depth 0
    pub fn depth(&self) -> usize {
        fn node_depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
            }
        }
        self.root.as_ref().map_or(0, node_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_separable_classes() {
        let x = array![[1.0, 5.0], [2.0, 4.0], [3.0, 6.0], [10.0, 5.0], [11.0, 4.0], [12.0, 6.0]];
        let y = array![0, 0, 0, 1, 1, 1];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y, 2).unwrap();

        let proba = tree.predict_proba(&x).unwrap();
        for i in 0..3 {
            assert_eq!(proba.row(i).to_vec(), vec![1.0, 0.0]);
            assert_eq!(proba.row(i + 3).to_vec(), vec![0.0, 1.0]);
        }
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_depth_limit_keeps_mixed_leaves() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = array![0, 1, 0, 1, 0, 1];

        let mut tree = DecisionTree::new().with_max_depth(Some(0));
        tree.fit(&x, &y, 3).unwrap();

        let proba = tree.predict_proba(&array![[3.5]]).unwrap();
        assert_eq!(proba.row(0).to_vec(), vec![0.5, 0.5, 0.0]);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_fit_indices_with_repeats() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = array![0, 0, 1, 1];

        let mut tree = DecisionTree::new().with_max_depth(Some(0));
        tree.fit_indices(&x, &y, &[0, 0, 0, 3], 2).unwrap();

        let proba = tree.predict_proba(&array![[1.5]]).unwrap();
        assert!((proba[[0, 0]] - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_feature_subsampling_is_seeded() {
        let x = array![
            [0.0, 1.0, 2.0],
            [1.0, 0.0, 3.0],
            [2.0, 3.0, 0.0],
            [3.0, 2.0, 1.0],
            [4.0, 5.0, 5.0],
            [5.0, 4.0, 4.0],
        ];
        let y = array![0, 1, 0, 1, 0, 1];

        let fit = |seed| {
            let mut tree = DecisionTree::new().with_max_features(Some(1)).with_random_state(seed);
            tree.fit(&x, &y, 2).unwrap();
            tree.predict_proba(&x).unwrap()
        };
        assert_eq!(fit(7), fit(7));
    }

    #[test]
    fn test_predict_before_fit() {
        let tree = DecisionTree::new();
        assert!(matches!(tree.predict_proba(&array![[1.0]]), Err(CurveError::ModelNotFitted)));
    }
}
