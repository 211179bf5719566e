//! Conflict simulation binary
//!
//! The conflict model has no stopping condition of its own, so it always
//! runs for the full step budget.

use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use enclave::aggregate::RunOutput;
use enclave::core::config::{load_toml, ConflictConfig};
use enclave::core::Result;
use enclave::simulation::Scenario;

/// Ethnic conflict model
#[derive(Parser, Debug)]
#[command(name = "conflict_sim")]
#[command(about = "Run an ethnic conflict model and report per-step metrics")]
struct Args {
    /// TOML configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<u32>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<u32>,

    /// Share of cells occupied at start
    #[arg(long)]
    density: Option<f64>,

    /// Probability that an agent belongs to the majority
    #[arg(long)]
    majority_share: Option<f64>,

    /// Grievance gain on violence
    #[arg(long)]
    alpha: Option<f64>,

    /// Grievance relief on a neutral encounter
    #[arg(long)]
    beta: Option<f64>,

    /// Per-step grievance multiplier
    #[arg(long)]
    decay: Option<f64>,

    /// Partner search radius
    #[arg(long)]
    vision: Option<u32>,

    /// Probability of taking the least-violent move
    #[arg(long)]
    aversion: Option<f64>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of steps
    #[arg(long, default_value_t = 50)]
    steps: u64,

    /// Write the full run as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    fn resolve(&self) -> Result<ConflictConfig> {
        let mut config: ConflictConfig = match &self.config {
            Some(path) => load_toml(path)?,
            None => ConflictConfig::default(),
        };
        config.grid.width = self.width.unwrap_or(config.grid.width);
        config.grid.height = self.height.unwrap_or(config.grid.height);
        config.density = self.density.unwrap_or(config.density);
        config.majority_share = self.majority_share.unwrap_or(config.majority_share);
        config.alpha = self.alpha.unwrap_or(config.alpha);
        config.beta = self.beta.unwrap_or(config.beta);
        config.decay = self.decay.unwrap_or(config.decay);
        config.vision = self.vision.unwrap_or(config.vision);
        config.aversion = self.aversion.unwrap_or(config.aversion);
        config.seed = self.seed.unwrap_or(config.seed);
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = args.resolve()?;
    tracing::info!(
        alpha = config.alpha,
        beta = config.beta,
        decay = config.decay,
        aversion = config.aversion,
        seed = config.seed,
        "starting conflict run"
    );

    let start = Instant::now();
    let mut model = config.build()?;
    model.run(args.steps)?;
    let output = RunOutput::new(config, &model, start.elapsed());

    println!("{}", output.summary_line());
    if let Some(path) = &args.output {
        output.write_json(path)?;
        println!("Full output written to {}", path.display());
    }
    Ok(())
}
