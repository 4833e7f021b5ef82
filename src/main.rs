//! Kolosal Curves - Main Entry Point

use clap::Parser;
use kolosal_curves::cli::{cmd_run, cmd_tasks, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kolosal_curves=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            cmd_run(&args)?;
        }
        Commands::Tasks => {
            cmd_tasks()?;
        }
    }

    Ok(())
}
