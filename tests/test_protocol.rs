//! Integration test: nested learning-curve protocol end-to-end

use kolosal_curves::evaluation::{draw_holdout, draw_subsample, Evaluator, LossKind, Metric};
use kolosal_curves::prelude::*;
use ndarray::Array2;
use polars::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

/// 100 rows: `site` and `y` categorical, `x1..x3` continuous
fn binary_df() -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let n = 100;
    let mut site = Vec::with_capacity(n);
    let mut x1 = Vec::with_capacity(n);
    let mut x2 = Vec::with_capacity(n);
    let mut x3 = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);

    for i in 0..n {
        let a: f64 = rng.gen_range(-2.0..2.0);
        let b: f64 = rng.gen_range(0.0..50.0);
        let c: f64 = rng.gen_range(-1.0..1.0);
        site.push((i % 3) as f64);
        x1.push(a);
        x2.push(b);
        x3.push(c);
        y.push(if a + 0.02 * (b - 25.0) + 0.3 * c > 0.0 { 1.0 } else { 0.0 });
    }

    df! {
        "site" => site,
        "x1" => x1,
        "y" => y,
        "x2" => x2,
        "x3" => x3,
    }
    .unwrap()
}

fn binary_roles() -> ColumnRoles {
    ColumnRoles::new("y", ContinuousColumns::Remaining).with_categorical(["site", "y"])
}

fn logistic_task() -> EvaluationTask {
    EvaluationTask {
        name: "toy_binary".to_string(),
        factory: Box::new(LogisticRegressionFactory),
        search_space: SearchSpace::new().add("C", vec![0.01, 1.0]),
        loss: LossKind::Binary,
        metrics: vec![Metric::CrossEntropy(LossKind::Binary), Metric::F1Micro],
        roles: binary_roles(),
        dataset_file: "toy.csv".to_string(),
    }
}

fn small_config() -> EvaluationConfig {
    EvaluationConfig::new()
        .with_k_inner(3)
        .with_k_outer(1)
        .with_seed(42)
        .with_num_subsamples(2)
}

#[test]
fn test_roles_resolve_against_feature_columns() {
    let dataset = Dataset::from_dataframe(&binary_df(), &binary_roles()).unwrap();

    assert_eq!(dataset.n_rows(), 100);
    assert_eq!(dataset.n_features(), 4);
    assert_eq!(dataset.feature_names(), &["site", "x1", "x2", "x3"]);
    // Indices refer to the feature matrix, not the header with the label
    assert_eq!(dataset.continuous(), &[1, 2, 3]);
    assert_eq!(dataset.n_classes(), 2);
}

#[test]
fn test_binary_logistic_run() {
    let task = logistic_task();
    let dataset = Dataset::from_dataframe(&binary_df(), &task.roles).unwrap();
    let evaluator = Evaluator::new(&task, small_config()).unwrap();

    let table = evaluator
        .run(&dataset, &mut ChaCha8Rng::seed_from_u64(42))
        .unwrap();

    assert_eq!(table.len(), 2 * task.metrics.len());
    for record in table.records() {
        assert_eq!(record.rep, 0);
        assert_eq!(record.method, "logistic_regression");
        assert!(record.value.is_finite());
        assert!(record.value >= 0.0);
    }

    let fractions: Vec<f64> = table.for_metric("cross_entropy").map(|r| r.fraction).collect();
    assert_eq!(fractions, vec![0.5, 1.0]);

    for record in table.for_metric("f1") {
        assert!(record.value <= 1.0);
    }
}

#[test]
fn test_same_seed_same_table() {
    let task = logistic_task();
    let dataset = Dataset::from_dataframe(&binary_df(), &task.roles).unwrap();
    let config = small_config().with_k_outer(2);
    let evaluator = Evaluator::new(&task, config).unwrap();

    let first = evaluator.run(&dataset, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
    let second = evaluator.run(&dataset, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_single_subsample_uses_full_pool() {
    let task = logistic_task();
    let dataset = Dataset::from_dataframe(&binary_df(), &task.roles).unwrap();
    let evaluator = Evaluator::new(&task, small_config().with_num_subsamples(1)).unwrap();

    let table = evaluator.run(&dataset, &mut ChaCha8Rng::seed_from_u64(3)).unwrap();
    assert_eq!(table.len(), task.metrics.len());
    assert!(table.records().iter().all(|r| r.fraction == 1.0));
}

#[test]
fn test_holdout_and_subsamples_stay_disjoint() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let holdout = draw_holdout(&mut rng, 100, 0.1).unwrap();

    assert_eq!(holdout.test.len(), 10);
    assert_eq!(holdout.development.len(), 90);

    let test: HashSet<usize> = holdout.test.iter().copied().collect();
    assert_eq!(test.len(), 10);
    assert!(holdout.development.iter().all(|i| !test.contains(i)));
    assert!(holdout.development.windows(2).all(|w| w[0] < w[1]));

    for fraction in [0.25, 0.5, 1.0] {
        let rows = draw_subsample(&mut rng, &holdout.development, fraction).unwrap();
        assert_eq!(rows.len(), (fraction * 90.0_f64).floor() as usize);
        assert!(rows.iter().all(|i| !test.contains(i)));
        let unique: HashSet<usize> = rows.iter().copied().collect();
        assert_eq!(unique.len(), rows.len());
    }
}

#[test]
fn test_random_forest_run() {
    let task = EvaluationTask {
        name: "toy_forest".to_string(),
        factory: Box::new(RandomForestFactory),
        search_space: SearchSpace::new()
            .add("n_estimators", vec![5i64])
            .add("max_depth", vec![2i64, 4])
            .add("max_features", vec![ParamValue::None, ParamValue::from("sqrt")]),
        loss: LossKind::Binary,
        metrics: vec![Metric::CrossEntropy(LossKind::Binary)],
        roles: ColumnRoles::new("y", ContinuousColumns::AllFeatures),
        dataset_file: "toy.csv".to_string(),
    };

    let df = binary_df().drop("site").unwrap();
    let dataset = Dataset::from_dataframe(&df, &task.roles).unwrap();
    let evaluator = Evaluator::new(&task, small_config()).unwrap();

    let table = evaluator.run(&dataset, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
    assert_eq!(table.len(), 2);
    assert!(table.records().iter().all(|r| r.method == "random_forest"));
    assert!(table.records().iter().all(|r| r.value.is_finite() && r.value >= 0.0));
}

#[test]
fn test_multiclass_categorical_loss() {
    let n = 90;
    let x = Array2::from_shape_fn((n, 2), |(i, j)| {
        let class = (i % 3) as f64;
        class * 3.0 + ((i * 13 + j * 7) % 10) as f64 / 10.0
    });
    let labels: Vec<f64> = (0..n).map(|i| (i % 3 + 1) as f64).collect();
    let dataset =
        Dataset::from_parts(x, &labels, vec!["a".into(), "b".into()], "Disease", vec![0, 1]).unwrap();
    assert_eq!(dataset.classes(), &[1.0, 2.0, 3.0]);

    let task = EvaluationTask {
        name: "toy_multiclass".to_string(),
        factory: Box::new(LogisticRegressionFactory),
        search_space: SearchSpace::new()
            .add("C", vec![0.1, 10.0])
            .add("penalty", vec!["l2"])
            .add("max_iter", vec![1000i64]),
        loss: LossKind::Categorical,
        metrics: vec![Metric::CrossEntropy(LossKind::Categorical), Metric::F1Micro],
        roles: ColumnRoles::new("Disease", ContinuousColumns::AllFeatures),
        dataset_file: "toy.csv".to_string(),
    };

    let evaluator = Evaluator::new(&task, small_config()).unwrap();
    let table = evaluator.run(&dataset, &mut ChaCha8Rng::seed_from_u64(11)).unwrap();

    assert_eq!(table.len(), 4);
    // Well-separated classes: the full-pool model beats chance comfortably
    let f1_full = table
        .for_metric("f1")
        .find(|r| r.fraction == 1.0)
        .map(|r| r.value)
        .unwrap();
    assert!(f1_full > 0.6, "f1 = {}", f1_full);
}

#[test]
fn test_failure_names_repetition_and_fraction() {
    let task = logistic_task();
    let dataset = Dataset::from_dataframe(&binary_df(), &task.roles).unwrap();
    // 90 development rows at fraction 0.02 leaves a single training row
    let config = small_config().with_k_inner(2).with_num_subsamples(50);
    let evaluator = Evaluator::new(&task, config).unwrap();

    let err = evaluator.run(&dataset, &mut ChaCha8Rng::seed_from_u64(42)).unwrap_err();
    let context = err.context().unwrap();
    assert_eq!(context.repetition, Some(0));
    assert_eq!(context.fraction, Some(0.02));
}
