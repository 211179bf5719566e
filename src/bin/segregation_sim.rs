//! Segregation simulation binary
//!
//! Runs one segregation model until every agent is satisfied or the step
//! budget runs out.

use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use enclave::aggregate::RunOutput;
use enclave::core::config::{load_toml, SegregationConfig, ToleranceDraw};
use enclave::core::Result;
use enclave::simulation::Scenario;

/// Schelling-style segregation model
#[derive(Parser, Debug)]
#[command(name = "segregation_sim")]
#[command(about = "Run a segregation model and report per-step metrics")]
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

    /// Neighborhood radius
    #[arg(long)]
    radius: Option<u32>,

    /// Mean of the Gaussian lower-bound draw
    #[arg(long)]
    tolerance_mean: Option<f64>,

    /// Standard deviation of the Gaussian lower-bound draw
    #[arg(long)]
    tolerance_std: Option<f64>,

    /// Upper tolerance bound shared by every agent
    #[arg(long)]
    tolerance_upper: Option<f64>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of steps
    #[arg(long, default_value_t = 200)]
    steps: u64,

    /// Write the full run as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    fn resolve(&self) -> Result<SegregationConfig> {
        let mut config: SegregationConfig = match &self.config {
            Some(path) => load_toml(path)?,
            None => SegregationConfig::default(),
        };
        config.grid.width = self.width.unwrap_or(config.grid.width);
        config.grid.height = self.height.unwrap_or(config.grid.height);
        config.density = self.density.unwrap_or(config.density);
        config.majority_share = self.majority_share.unwrap_or(config.majority_share);
        config.radius = self.radius.unwrap_or(config.radius);
        config.seed = self.seed.unwrap_or(config.seed);

        // Any tolerance flag switches the draw to Gaussian, keeping unset parameters
        if self.tolerance_mean.is_some() || self.tolerance_std.is_some() || self.tolerance_upper.is_some() {
            let (mean, std_dev, upper) = match config.tolerance {
                ToleranceDraw::Gaussian { mean, std_dev, upper } => (mean, std_dev, upper),
                ToleranceDraw::Fixed { upper, .. } | ToleranceDraw::Uniform { upper, .. } => {
                    (ToleranceDraw::DEFAULT_MEAN, ToleranceDraw::DEFAULT_STD_DEV, upper)
                }
            };
            config.tolerance = ToleranceDraw::Gaussian {
                mean: self.tolerance_mean.unwrap_or(mean),
                std_dev: self.tolerance_std.unwrap_or(std_dev),
                upper: self.tolerance_upper.unwrap_or(upper),
            };
        }
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
        width = config.grid.width,
        height = config.grid.height,
        density = config.density,
        seed = config.seed,
        "starting segregation run"
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerance_flags_override_gaussian_draw() {
        let args = Args::try_parse_from([
            "segregation_sim",
            "--tolerance-mean",
            "0.3",
            "--tolerance-std",
            "0.05",
            "--tolerance-upper",
            "0.8",
        ])
        .unwrap();
        let config = args.resolve().unwrap();
        assert_eq!(
            config.tolerance,
            ToleranceDraw::Gaussian { mean: 0.3, std_dev: 0.05, upper: 0.8 }
        );
    }

    #[test]
    fn test_partial_tolerance_flags_keep_defaults() {
        let args = Args::try_parse_from(["segregation_sim", "--tolerance-std", "0.2"]).unwrap();
        let config = args.resolve().unwrap();
        assert_eq!(
            config.tolerance,
            ToleranceDraw::Gaussian {
                mean: ToleranceDraw::DEFAULT_MEAN,
                std_dev: 0.2,
                upper: ToleranceDraw::DEFAULT_UPPER,
            }
        );
    }

    #[test]
    fn test_unset_flags_leave_config_untouched() {
        let args = Args::try_parse_from(["segregation_sim", "--width", "12", "--seed", "9"]).unwrap();
        let config = args.resolve().unwrap();
        let defaults = SegregationConfig::default();
        assert_eq!(config.grid.width, 12);
        assert_eq!(config.grid.height, defaults.grid.height);
        assert_eq!(config.seed, 9);
        assert_eq!(config.density, defaults.density);
        assert_eq!(config.tolerance, defaults.tolerance);
    }
}
