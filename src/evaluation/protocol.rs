//! Outer evaluation loop: repeated holdouts and learning-curve sweeps

use crate::config::EvaluationConfig;
use crate::dataset::Dataset;
use crate::error::{CurveError, EvalContext, Result, ResultExt};
use crate::evaluation::metrics::{LossKind, Metric};
use crate::evaluation::results::{EvaluationRecord, ResultAccumulator, ResultTable};
use crate::evaluation::sampling::{draw_holdout, draw_subsample, subsample_fractions};
use crate::evaluation::selection::{fit_and_predict, select_hyperparameters, SelectionContext};
use crate::tasks::EvaluationTask;
use ndarray::{Array1, Array2};
use rand::Rng;
use tracing::{debug, info};

/// Runs the nested protocol for one task.
///
/// Per repetition a test holdout is drawn from the shared generator; per
/// fraction a training subsample is drawn from the development pool, a
/// configuration is selected on it by inner k-fold search, and the winner
/// is refit on the whole subsample and scored once on the holdout.
#[derive(Debug)]
pub struct Evaluator<'a> {
    task: &'a EvaluationTask,
    config: EvaluationConfig,
}

impl<'a> Evaluator<'a> {
    pub fn new(task: &'a EvaluationTask, config: EvaluationConfig) -> Result<Self> {
        config.validate()?;
        task.search_space.validate()?;
        if task.metrics.is_empty() {
            return Err(CurveError::ConfigError(format!("task '{}' reports no metrics", task.name)));
        }
        Ok(Self { task, config })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Run every repetition and return the finalized records
    pub fn run<R: Rng + ?Sized>(&self, dataset: &Dataset, rng: &mut R) -> Result<ResultTable> {
        let mut accumulator = ResultAccumulator::new();
        self.run_with(dataset, rng, &mut accumulator)?;
        Ok(accumulator.finalize())
    }

    /// Run every repetition, appending records to `accumulator`
    pub fn run_with<R: Rng + ?Sized>(
        &self,
        dataset: &Dataset,
        rng: &mut R,
        accumulator: &mut ResultAccumulator,
    ) -> Result<()> {
        self.check_dataset(dataset)?;

        let fractions = subsample_fractions(self.config.num_subsamples);

        for rep in 0..self.config.k_outer {
            let holdout = draw_holdout(rng, dataset.n_rows(), self.config.test_fraction)
                .in_context(|| EvalContext::new().repetition(rep))?;
            let (x_test, y_test) = dataset.select_rows(&holdout.test);

            info!(
                task = %self.task.name,
                rep,
                test_rows = holdout.test.len(),
                dev_rows = holdout.development.len(),
                "Starting repetition"
            );

            for &fraction in &fractions {
                let context = || EvalContext::new().repetition(rep).fraction(fraction);

                let train_rows = draw_subsample(rng, &holdout.development, fraction).in_context(context)?;
                let (x_train, y_train) = dataset.select_rows(&train_rows);

                let values = self
                    .evaluate_fraction(dataset, &x_train, &y_train, &x_test, &y_test)
                    .in_context(context)?;

                for (metric, value) in self.task.metrics.iter().zip(values) {
                    accumulator.append(EvaluationRecord {
                        rep,
                        fraction,
                        method: self.task.method_name().to_string(),
                        metric: metric.name().to_string(),
                        value,
                    });
                }
            }
        }

        Ok(())
    }

    /// Select on the subsample, refit the winner and score the holdout
    fn evaluate_fraction(
        &self,
        dataset: &Dataset,
        x_train: &Array2<f64>,
        y_train: &Array1<usize>,
        x_test: &Array2<f64>,
        y_test: &Array1<usize>,
    ) -> Result<Vec<f64>> {
        let ctx = SelectionContext {
            k_inner: self.config.k_inner,
            search_space: &self.task.search_space,
            factory: self.task.factory.as_ref(),
            loss: self.task.loss,
            continuous: dataset.continuous(),
            n_classes: dataset.n_classes(),
            seed: self.config.seed,
        };

        let selection = select_hyperparameters(x_train, y_train, &ctx)?;
        info!(
            train_rows = x_train.nrows(),
            configuration = %selection.configuration,
            cv_loss = selection.mean_loss,
            "Selected configuration"
        );

        let proba = fit_and_predict(
            ctx.factory,
            &selection.configuration,
            ctx.seed,
            x_train,
            y_train,
            x_test,
            ctx.continuous,
            ctx.n_classes,
        )
        .in_context(|| EvalContext::new().configuration(selection.configuration.to_string()))?;

        let values = self
            .task
            .metrics
            .iter()
            .map(|metric| metric.compute(y_test, &proba, ctx.n_classes))
            .collect::<Result<Vec<f64>>>()?;

        for (metric, value) in self.task.metrics.iter().zip(&values) {
            debug!(metric = %metric, value, "Test holdout scored");
        }

        Ok(values)
    }

    fn check_dataset(&self, dataset: &Dataset) -> Result<()> {
        let n_classes = dataset.n_classes();
        if n_classes < 2 {
            return Err(CurveError::DataError(format!(
                "label '{}' has {} distinct values, need at least 2",
                dataset.label_name(),
                n_classes
            )));
        }

        let binary = self.task.loss == LossKind::Binary
            || self.task.metrics.contains(&Metric::CrossEntropy(LossKind::Binary));
        if binary && n_classes != 2 {
            return Err(CurveError::DataError(format!(
                "binary task '{}' got {} classes in label '{}'",
                self.task.name,
                n_classes,
                dataset.label_name()
            )));
        }

        Ok(())
    }
}
