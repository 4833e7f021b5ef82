//! Kolosal Curves CLI Module
//!
//! Command-line interface for running learning-curve evaluations.

use clap::{Args, Parser, Subcommand};
use colored::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::EvaluationConfig;
use crate::dataset::Dataset;
use crate::evaluation::{Evaluator, ResultTable};
use crate::optimizer::SearchSpace;
use crate::preprocessing::ColumnRoles;
use crate::tasks::TaskName;
use crate::utils::{DataLoader, DataSaver};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "kolosal-curves")]
#[command(author = "KolosalAI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Nested cross-validation learning curves for tabular classifiers")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a learning-curve evaluation and write its results
    Run(RunArgs),

    /// List the built-in tasks
    Tasks,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Task to evaluate
    #[arg(short, long, value_enum)]
    pub task: TaskName,

    /// Root directory for results; a per-task subdirectory is created
    #[arg(long)]
    pub results_dir: PathBuf,

    /// Directory holding the task's dataset file
    #[arg(long)]
    pub data_dir: PathBuf,

    /// Folds for inner model selection
    #[arg(long, default_value = "5")]
    pub k_inner: usize,

    /// Outer repetitions
    #[arg(long, default_value = "10")]
    pub k_outer: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Learning-curve points per repetition
    #[arg(long, default_value = "10")]
    pub num_subsamples: usize,

    /// Share of rows held out for testing
    #[arg(long, default_value = "0.1")]
    pub test_fraction: f64,

    /// JSON file replacing the task's hyperparameter grid
    #[arg(long)]
    pub search_space: Option<PathBuf>,

    /// JSON file replacing the task's column roles
    #[arg(long)]
    pub column_roles: Option<PathBuf>,

    /// Dataset file name inside the data directory
    #[arg(long)]
    pub dataset: Option<String>,
}

impl RunArgs {
    pub fn evaluation_config(&self) -> EvaluationConfig {
        EvaluationConfig::new()
            .with_k_inner(self.k_inner)
            .with_k_outer(self.k_outer)
            .with_seed(self.seed)
            .with_num_subsamples(self.num_subsamples)
            .with_test_fraction(self.test_fraction)
    }
}

/// Written next to the results CSV
#[derive(Debug, Serialize)]
pub struct RunManifest {
    pub task: String,
    pub method: String,
    pub dataset_path: PathBuf,
    pub n_rows: usize,
    pub n_features: usize,
    pub n_classes: usize,
    pub label: String,
    pub config: EvaluationConfig,
    pub search_space: SearchSpace,
    pub roles: ColumnRoles,
    pub started_at: chrono::DateTime<chrono::Local>,
    pub finished_at: chrono::DateTime<chrono::Local>,
    pub n_records: usize,
    pub results_file: PathBuf,
}

/// Paths written by a successful run
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub results_csv: PathBuf,
    pub manifest_json: PathBuf,
    pub table: ResultTable,
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_run(args: &RunArgs) -> anyhow::Result<RunOutput> {
    let started_at = chrono::Local::now();
    let timestamp = started_at.format("%Y%m%d-%H%M%S").to_string();

    let config = args.evaluation_config();
    config.validate()?;

    let mut task = args.task.task();
    if let Some(path) = &args.search_space {
        task = task.with_search_space(SearchSpace::from_json_file(path)?);
    }
    if let Some(path) = &args.column_roles {
        task = task.with_roles(ColumnRoles::from_json_file(path)?);
    }
    if let Some(file) = &args.dataset {
        task = task.with_dataset_file(file.clone());
    }

    section(&format!("Evaluate {}", task.name));
    kv("Method", task.method_name());
    kv("Grid", &format!("{} configurations", task.search_space.n_combinations()));
    kv(
        "Protocol",
        &format!(
            "k_outer={} k_inner={} subsamples={} seed={}",
            config.k_outer, config.k_inner, config.num_subsamples, config.seed
        ),
    );
    println!();

    let dataset_path = args.data_dir.join(&task.dataset_file);
    step_run("Loading data");
    let start = Instant::now();
    let df = DataLoader::new().load_csv(&dataset_path)?;
    let dataset = Dataset::from_dataframe(&df, &task.roles)?;
    step_done(&format!(
        "{} rows × {} features, {} classes in {:?}",
        dataset.n_rows(),
        dataset.n_features(),
        dataset.n_classes(),
        start.elapsed()
    ));

    step_run("Running nested cross-validation");
    let start = Instant::now();
    let evaluator = Evaluator::new(&task, config.clone())?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let table = evaluator.run(&dataset, &mut rng)?;
    step_done(&format!("{} records in {:?}", table.len(), start.elapsed()));

    let out_dir = args.results_dir.join(&task.name);
    let stem = task.output_stem(&timestamp);
    let results_csv = out_dir.join(format!("{}.csv", stem));
    let manifest_json = out_dir.join(format!("{}.json", stem));

    let mut frame = table.to_dataframe()?;
    DataSaver::save_csv(&mut frame, &results_csv)?;

    let manifest = RunManifest {
        task: task.name.clone(),
        method: task.method_name().to_string(),
        dataset_path,
        n_rows: dataset.n_rows(),
        n_features: dataset.n_features(),
        n_classes: dataset.n_classes(),
        label: dataset.label_name().to_string(),
        config,
        search_space: task.search_space.clone(),
        roles: task.roles.clone(),
        started_at,
        finished_at: chrono::Local::now(),
        n_records: table.len(),
        results_file: results_csv.clone(),
    };
    DataSaver::save_json(&manifest, &manifest_json)?;

    print_summary(&table);
    step_ok(&format!("Results written to {}", results_csv.display()));
    println!();

    Ok(RunOutput {
        results_csv,
        manifest_json,
        table,
    })
}

fn print_summary(table: &ResultTable) {
    section("Learning curve");
    println!(
        "  {:<10} {:<16} {:>10} {:>10}",
        muted("Fraction"),
        muted("Metric"),
        muted("Mean"),
        muted("Std")
    );
    println!("  {}", dim(&"─".repeat(50)));
    for row in table.summary() {
        println!(
            "  {:<10} {:<16} {:>10} {:>10}",
            format!("{:.2}", row.fraction),
            row.metric,
            format!("{:.4}", row.mean).white().bold(),
            format!("{:.4}", row.std)
        );
    }
    println!();
}

pub fn cmd_tasks() -> anyhow::Result<()> {
    section("Tasks");
    println!(
        "  {:<18} {:<20} {:<22} {:>6}",
        muted("Task"),
        muted("Method"),
        muted("Label"),
        muted("Grid")
    );
    println!("  {}", dim(&"─".repeat(70)));

    for name in TaskName::all() {
        let task = name.task();
        println!(
            "  {:<18} {:<20} {:<22} {:>6}",
            name.as_str(),
            task.method_name(),
            task.roles.label,
            task.search_space.n_combinations()
        );
        println!("  {:<18} {}", "", dim(&task.dataset_file));
    }

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_args() {
        let cli = Cli::try_parse_from([
            "kolosal-curves",
            "run",
            "--task",
            "sepsis-mortality",
            "--results-dir",
            "out",
            "--data-dir",
            "data",
            "--k-inner",
            "3",
            "--num-subsamples",
            "4",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.task, TaskName::SepsisMortality);
                let config = args.evaluation_config();
                assert_eq!(config.k_inner, 3);
                assert_eq!(config.k_outer, 10);
                assert_eq!(config.num_subsamples, 4);
                assert_eq!(config.test_fraction, 0.1);
            }
            Commands::Tasks => panic!("expected run"),
        }
    }
}
