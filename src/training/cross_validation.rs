//! K-fold cross-validation splits

use crate::error::{CurveError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A single train/validation split over row positions
#[derive(Debug, Clone)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Shuffled k-fold splitter.
///
/// Rows are shuffled once with a generator seeded from `random_state` and
/// cut into `n_splits` contiguous blocks; the first `n % n_splits` blocks
/// hold one extra row. The shuffle does not touch any caller-owned
/// generator, so the same seed and row count always give the same folds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KFold {
    pub n_splits: usize,
    pub shuffle: bool,
    pub random_state: u64,
}

impl KFold {
    pub fn new(n_splits: usize, random_state: u64) -> Self {
        Self {
            n_splits,
            shuffle: true,
            random_state,
        }
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Generate train/validation splits for `n_samples` rows
    pub fn split(&self, n_samples: usize) -> Result<Vec<CVSplit>> {
        let n_splits = self.n_splits;
        if n_splits < 2 {
            return Err(CurveError::InvalidParameter {
                name: "k_inner".to_string(),
                value: n_splits.to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        if n_samples < n_splits {
            return Err(CurveError::DataError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, n_splits
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();

        if self.shuffle {
            let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
            indices.shuffle(&mut rng);
        }

        let fold_sizes: Vec<usize> = (0..n_splits)
            .map(|i| {
                let base = n_samples / n_splits;
                let remainder = n_samples % n_splits;
                if i < remainder { base + 1 } else { base }
            })
            .collect();

        let mut splits = Vec::with_capacity(n_splits);
        let mut current = 0;

        for (fold_idx, &fold_size) in fold_sizes.iter().enumerate() {
            let test_indices: Vec<usize> = indices[current..current + fold_size].to_vec();
            let train_indices: Vec<usize> = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();

            splits.push(CVSplit {
                train_indices,
                test_indices,
                fold_idx,
            });

            current += fold_size;
        }

        Ok(splits)
    }
}

/// Cross-validation scores of one configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CVResults {
    /// Scores for each fold
    pub scores: Vec<f64>,
    /// Mean score across folds
    pub mean_score: f64,
    /// Standard deviation of scores
    pub std_score: f64,
    /// Number of folds
    pub n_folds: usize,
}

impl CVResults {
    /// Create CV results from fold scores
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n_folds = scores.len();
        let mean_score = scores.iter().sum::<f64>() / n_folds as f64;
        let variance = scores.iter().map(|s| (s - mean_score).powi(2)).sum::<f64>() / n_folds as f64;
        let std_score = variance.sqrt();

        Self {
            scores,
            mean_score,
            std_score,
            n_folds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_partition(splits: &[CVSplit], n_samples: usize) {
        let mut all_test: Vec<usize> = splits.iter().flat_map(|s| s.test_indices.clone()).collect();
        all_test.sort_unstable();
        assert_eq!(all_test, (0..n_samples).collect::<Vec<_>>());

        for split in splits {
            assert_eq!(split.train_indices.len() + split.test_indices.len(), n_samples);
            for idx in &split.test_indices {
                assert!(!split.train_indices.contains(idx));
            }
        }

        let sizes: Vec<usize> = splits.iter().map(|s| s.test_indices.len()).collect();
        let max = *sizes.iter().max().unwrap();
        let min = *sizes.iter().min().unwrap();
        assert!(max - min <= 1, "fold sizes {:?}", sizes);
    }

    #[test]
    fn test_k_fold_unshuffled() {
        let cv = KFold::new(5, 0).with_shuffle(false);
        let splits = cv.split(100).unwrap();

        assert_eq!(splits.len(), 5);
        for split in &splits {
            assert_eq!(split.test_indices.len(), 20);
            assert_eq!(split.train_indices.len(), 80);
        }
        assert_eq!(splits[0].test_indices, (0..20).collect::<Vec<_>>());
        check_partition(&splits, 100);
    }

    #[test]
    fn test_k_fold_partition_properties() {
        for k in 2..7 {
            for n in k..40 {
                let splits = KFold::new(k, 42).split(n).unwrap();
                assert_eq!(splits.len(), k);
                check_partition(&splits, n);
            }
        }
    }

    #[test]
    fn test_uneven_sizes_front_loaded() {
        let splits = KFold::new(3, 7).split(10).unwrap();
        let sizes: Vec<usize> = splits.iter().map(|s| s.test_indices.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
    }

    #[test]
    fn test_seeded_shuffle_is_deterministic() {
        let a = KFold::new(4, 42).split(50).unwrap();
        let b = KFold::new(4, 42).split(50).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.test_indices, y.test_indices);
        }

        let c = KFold::new(4, 43).split(50).unwrap();
        assert!(a.iter().zip(&c).any(|(x, y)| x.test_indices != y.test_indices));
    }

    #[test]
    fn test_invalid_requests() {
        let err = KFold::new(1, 0).split(10).unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Configuration);

        let err = KFold::new(5, 0).split(4).unwrap_err();
        assert_eq!(err.category(), crate::error::ErrorCategory::Data);
    }

    #[test]
    fn test_cv_results() {
        let results = CVResults::from_scores(vec![1.0, 2.0, 3.0]);
        assert_eq!(results.n_folds, 3);
        assert!((results.mean_score - 2.0).abs() < 1e-12);
        assert!((results.std_score - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }
}
