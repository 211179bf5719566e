//! Conflict parameter sweep
//!
//! Expands a parameter grid, runs every combination several times on a
//! rayon pool and writes one JSON record per run.

use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use enclave::aggregate::{run_batch, ConflictSweep};
use enclave::core::config::load_toml;
use enclave::core::{EnclaveError, Result};

/// Parallel sweep over conflict model parameters
#[derive(Parser, Debug)]
#[command(name = "conflict_sweep")]
#[command(about = "Run a conflict model parameter sweep and write the results as JSON")]
struct Args {
    /// TOML sweep definition; the built-in grid is used when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Runs per parameter combination
    #[arg(long, default_value_t = 2)]
    iterations: usize,

    /// Steps per run
    #[arg(long, default_value_t = 50)]
    max_steps: u64,

    /// First seed; run k of the batch uses seed + k
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Where to write the records
    #[arg(long, default_value = "conflict_sweep.json")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| EnclaveError::InvalidConfig(format!("thread pool: {e}")))?;
    }

    let sweep: ConflictSweep = match &args.config {
        Some(path) => load_toml(path)?,
        None => ConflictSweep::default(),
    };
    let tasks = sweep.expand();
    tracing::info!(combinations = tasks.len(), iterations = args.iterations, "expanded sweep");

    let start = Instant::now();
    let records = run_batch(&tasks, args.iterations, args.max_steps, args.seed);
    let elapsed = start.elapsed();

    std::fs::write(&args.output, serde_json::to_string_pretty(&records)?)?;
    println!(
        "{} runs in {:.2}s, results written to {}",
        records.len(),
        elapsed.as_secs_f64(),
        args.output.display()
    );
    Ok(())
}
