//! Integration test: CSV in, evaluation, results and manifest out

use kolosal_curves::cli::{cmd_run, RunArgs};
use kolosal_curves::evaluation::{Evaluator, LossKind, Metric};
use kolosal_curves::prelude::*;
use kolosal_curves::tasks::TaskName;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt::Write as _;
use std::path::Path;
use tempfile::tempdir;

/// Binary sepsis-style table: every column numeric, label last
fn write_sepsis_csv(path: &Path, n: usize) {
    let mut text = String::from("age,lactate,heart_rate,mortality_indicator\n");
    for i in 0..n {
        let age = 40.0 + (i * 7 % 45) as f64;
        let lactate = 0.5 + (i * 11 % 40) as f64 / 10.0;
        let heart_rate = 60.0 + (i * 13 % 70) as f64;
        let died = u8::from(lactate + age / 30.0 > 4.5);
        writeln!(text, "{},{},{},{}", age, lactate, heart_rate, died).unwrap();
    }
    std::fs::write(path, text).unwrap();
}

/// Three-class table with a categorical feature before the label
fn write_cancer_csv(path: &Path, n: usize) {
    let mut text = String::from("site,size,Disease,density\n");
    for i in 0..n {
        let class = i % 3;
        let site = i % 2;
        let size = class as f64 * 4.0 + (i * 7 % 10) as f64 / 10.0;
        let density = class as f64 * 2.0 + (i * 3 % 5) as f64 / 5.0;
        writeln!(text, "{},{},{},{}", site, size, class + 1, density).unwrap();
    }
    std::fs::write(path, text).unwrap();
}

fn run_args(task: TaskName, results: &Path, data: &Path) -> RunArgs {
    RunArgs {
        task,
        results_dir: results.to_path_buf(),
        data_dir: data.to_path_buf(),
        k_inner: 2,
        k_outer: 2,
        seed: 42,
        num_subsamples: 2,
        test_fraction: 0.1,
        search_space: None,
        column_roles: None,
        dataset: None,
    }
}

#[test]
fn test_loader_to_evaluator() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("sepsis.csv");
    write_sepsis_csv(&csv, 80);

    let df = DataLoader::new().load_csv(&csv).unwrap();
    let task = EvaluationTask {
        name: "sepsis_mortality".to_string(),
        factory: Box::new(LogisticRegressionFactory),
        search_space: SearchSpace::new().add("C", vec![0.1, 1.0]),
        loss: LossKind::Binary,
        metrics: vec![Metric::CrossEntropy(LossKind::Binary)],
        roles: ColumnRoles::new("mortality_indicator", ContinuousColumns::AllFeatures),
        dataset_file: "sepsis.csv".to_string(),
    };
    let dataset = Dataset::from_dataframe(&df, &task.roles).unwrap();
    assert_eq!(dataset.n_features(), 3);

    let config = EvaluationConfig::new()
        .with_k_inner(3)
        .with_k_outer(2)
        .with_num_subsamples(2);
    let evaluator = Evaluator::new(&task, config).unwrap();
    let table = evaluator.run(&dataset, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();

    let out = dir.path().join("out").join("results.csv");
    let mut frame = table.to_dataframe().unwrap();
    DataSaver::save_csv(&mut frame, &out).unwrap();

    let reloaded = DataLoader::new().load_csv(&out).unwrap();
    assert_eq!(reloaded.height(), 4);
    let names: Vec<String> = reloaded.get_column_names().iter().map(|s| s.to_string()).collect();
    assert_eq!(names, vec!["rep", "fraction", "method", "metric", "value"]);
}

#[test]
fn test_cmd_run_sepsis_with_overrides() {
    let data = tempdir().unwrap();
    let results = tempdir().unwrap();
    write_sepsis_csv(&data.path().join("small_sepsis.csv"), 80);

    let space = data.path().join("space.json");
    std::fs::write(&space, r#"{"n_estimators": [5], "max_depth": [2, 3]}"#).unwrap();

    let mut args = run_args(TaskName::SepsisMortality, results.path(), data.path());
    args.search_space = Some(space);
    args.dataset = Some("small_sepsis.csv".to_string());

    let output = cmd_run(&args).unwrap();

    // 2 repetitions × 2 fractions × 1 metric
    assert_eq!(output.table.len(), 4);
    assert!(output.results_csv.starts_with(results.path().join("sepsis_mortality")));
    let file_name = output.results_csv.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("sepsis_mortality_random_forest_baseline_"));
    assert!(file_name.ends_with(".csv"));

    let reloaded = DataLoader::new().load_csv(&output.results_csv).unwrap();
    assert_eq!(reloaded.height(), 4);

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output.manifest_json).unwrap()).unwrap();
    assert_eq!(manifest["task"], "sepsis_mortality");
    assert_eq!(manifest["method"], "random_forest");
    assert_eq!(manifest["config"]["k_inner"], 2);
    assert_eq!(manifest["n_rows"], 80);
    assert_eq!(manifest["n_records"], 4);
    assert_eq!(manifest["search_space"]["max_depth"], serde_json::json!([2, 3]));
}

#[test]
fn test_cmd_run_cancer_with_roles_file() {
    let data = tempdir().unwrap();
    let results = tempdir().unwrap();
    write_cancer_csv(&data.path().join("cancer.csv"), 90);

    let roles = data.path().join("roles.json");
    std::fs::write(
        &roles,
        r#"{"label": "Disease", "categorical": ["site", "Disease"], "continuous": "remaining"}"#,
    )
    .unwrap();
    let space = data.path().join("space.json");
    std::fs::write(&space, r#"{"C": [0.1, 1.0], "penalty": ["l2"]}"#).unwrap();

    let mut args = run_args(TaskName::CancerDiagnosis, results.path(), data.path());
    args.column_roles = Some(roles);
    args.search_space = Some(space);
    args.dataset = Some("cancer.csv".to_string());
    args.k_outer = 1;

    let output = cmd_run(&args).unwrap();

    // cross-entropy and F1 for each of 2 fractions
    assert_eq!(output.table.len(), 4);
    let metrics: Vec<&str> = output.table.records().iter().map(|r| r.metric.as_str()).collect();
    assert_eq!(metrics, vec!["cross_entropy", "f1", "cross_entropy", "f1"]);

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output.manifest_json).unwrap()).unwrap();
    assert_eq!(manifest["n_classes"], 3);
    assert_eq!(manifest["n_features"], 3);
    assert_eq!(manifest["label"], "Disease");
}

#[test]
fn test_cmd_run_missing_dataset_fails() {
    let data = tempdir().unwrap();
    let results = tempdir().unwrap();
    let args = run_args(TaskName::SepsisMortality, results.path(), data.path());

    assert!(cmd_run(&args).is_err());
    assert!(!results.path().join("sepsis_mortality").exists());
}

#[test]
fn test_cmd_run_rejects_bad_config_before_loading() {
    let data = tempdir().unwrap();
    let results = tempdir().unwrap();
    let mut args = run_args(TaskName::SepsisMortality, results.path(), data.path());
    args.k_inner = 1;

    let err = cmd_run(&args).unwrap_err();
    let curve = err.downcast_ref::<CurveError>().unwrap();
    assert_eq!(curve.category(), ErrorCategory::Configuration);
}
