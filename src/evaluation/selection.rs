//! Inner k-fold grid search

use crate::error::{CurveError, EvalContext, Result, ResultExt};
use crate::evaluation::metrics::{cross_entropy, LossKind};
use crate::optimizer::{Configuration, SearchSpace};
use crate::preprocessing::StandardScaler;
use crate::training::{CVResults, ClassifierFactory, KFold};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything model selection needs besides the training rows
#[derive(Clone, Copy)]
pub struct SelectionContext<'a> {
    pub k_inner: usize,
    pub search_space: &'a SearchSpace,
    pub factory: &'a dyn ClassifierFactory,
    pub loss: LossKind,
    /// Feature indices to standardize
    pub continuous: &'a [usize],
    pub n_classes: usize,
    /// Seeds both the fold shuffle and the classifiers
    pub seed: u64,
}

/// Cross-validated loss of one configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvScore {
    pub configuration: Configuration,
    pub cv: CVResults,
}

impl CvScore {
    pub fn mean_loss(&self) -> f64 {
        self.cv.mean_score
    }
}

/// Outcome of one grid search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    /// Winning configuration
    pub configuration: Configuration,
    /// Its mean validation cross-entropy
    pub mean_loss: f64,
    /// Every configuration's score, in grid order
    pub scores: Vec<CvScore>,
}

/// Scale with statistics from `x_train` only, fit a fresh classifier and
/// predict class probabilities for `x_eval`
#[allow(clippy::too_many_arguments)]
pub(crate) fn fit_and_predict(
    factory: &dyn ClassifierFactory,
    configuration: &Configuration,
    seed: u64,
    x_train: &Array2<f64>,
    y_train: &Array1<usize>,
    x_eval: &Array2<f64>,
    continuous: &[usize],
    n_classes: usize,
) -> Result<Array2<f64>> {
    let (transform, x_train_scaled) = StandardScaler::fit_transform(x_train.view(), continuous)?;
    let x_eval_scaled = transform.transform(x_eval.view())?;

    let mut model = factory.build(configuration, seed)?;
    model.fit(&x_train_scaled, y_train, n_classes)?;
    model.predict_proba(&x_eval_scaled)
}

/// Pick the configuration with the lowest mean k-fold cross-entropy.
///
/// Folds come from a generator seeded with `ctx.seed`, so every call with
/// the same row count sees the same fold assignment. Ties keep the
/// configuration enumerated first, and a non-finite mean never beats a
/// finite one.
pub fn select_hyperparameters(
    x: &Array2<f64>,
    y: &Array1<usize>,
    ctx: &SelectionContext<'_>,
) -> Result<Selection> {
    if x.nrows() != y.len() {
        return Err(CurveError::ShapeError {
            expected: format!("{} labels", x.nrows()),
            actual: format!("{} labels", y.len()),
        });
    }

    let splits = KFold::new(ctx.k_inner, ctx.seed).split(x.nrows())?;
    let combinations = ctx.search_space.combinations()?;

    let mut scores: Vec<CvScore> = Vec::with_capacity(combinations.len());
    let mut best: Option<usize> = None;

    for configuration in combinations {
        let mut fold_losses = Vec::with_capacity(splits.len());

        for split in &splits {
            let x_train = x.select(Axis(0), &split.train_indices);
            let y_train = y.select(Axis(0), &split.train_indices);
            let x_val = x.select(Axis(0), &split.test_indices);
            let y_val = y.select(Axis(0), &split.test_indices);

            let loss = fit_and_predict(
                ctx.factory,
                &configuration,
                ctx.seed,
                &x_train,
                &y_train,
                &x_val,
                ctx.continuous,
                ctx.n_classes,
            )
            .and_then(|proba| cross_entropy(ctx.loss, &y_val, &proba))
            .in_context(|| {
                EvalContext::new()
                    .fold(split.fold_idx)
                    .configuration(configuration.to_string())
            })?;

            fold_losses.push(loss);
        }

        let cv = CVResults::from_scores(fold_losses);
        debug!(
            configuration = %configuration,
            mean_loss = cv.mean_score,
            std_loss = cv.std_score,
            "Configuration scored"
        );

        let candidate = cv.mean_score;
        let improves = match best {
            None => true,
            Some(b) => {
                let incumbent = scores[b].mean_loss();
                candidate.is_finite() && (!incumbent.is_finite() || candidate < incumbent)
            }
        };
        if improves {
            best = Some(scores.len());
        }

        scores.push(CvScore { configuration, cv });
    }

    let best = best.ok_or_else(|| CurveError::ConfigError("search space yielded no configurations".to_string()))?;
    Ok(Selection {
        configuration: scores[best].configuration.clone(),
        mean_loss: scores[best].mean_loss(),
        scores,
    })
}
