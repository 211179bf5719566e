//! Parameter sweeps
//!
//! Each (configuration, iteration) pair is an independent full run with its
//! own seed, so sweeps parallelize across runs with rayon while every single
//! run stays sequential and reproducible.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::config::ConflictConfig;
use crate::core::error::Result;
use crate::core::types::Step;
use crate::simulation::metrics::Metrics;
use crate::simulation::model::Scenario;

/// Result of one run inside a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRecord<C> {
    pub config: C,
    pub iteration: usize,
    pub seed: u64,
    pub steps: Step,
    /// Last recorded snapshot; empty when no step ran
    pub final_metrics: Metrics,
}

/// Seed for one run of a batch
pub fn run_seed(base_seed: u64, task_index: usize, iterations: usize, iteration: usize) -> u64 {
    base_seed.wrapping_add((task_index * iterations + iteration) as u64)
}

/// Build and run one scenario until `max_steps` or it stops by itself
pub fn run_one<S: Scenario>(scenario: &S, max_steps: Step) -> Result<(Step, Metrics)> {
    let mut model = scenario.build()?;
    let steps = model.run(max_steps)?;
    let metrics = model.latest().map(|s| s.metrics.clone()).unwrap_or_default();
    Ok((steps, metrics))
}

/// Run every task `iterations` times in parallel
///
/// Records come back in task order, then iteration order. Runs that fail to
/// build or step are logged and left out.
pub fn run_batch<S>(tasks: &[S], iterations: usize, max_steps: Step, base_seed: u64) -> Vec<BatchRecord<S>>
where
    S: Scenario,
{
    let jobs: Vec<(usize, usize)> = (0..tasks.len())
        .flat_map(|t| (0..iterations).map(move |i| (t, i)))
        .collect();
    let total = jobs.len();
    let completed = AtomicUsize::new(0);
    tracing::info!(tasks = tasks.len(), iterations, total, "starting batch");

    let records: Vec<Option<BatchRecord<S>>> = jobs
        .into_par_iter()
        .map(|(task_index, iteration)| {
            let seed = run_seed(base_seed, task_index, iterations, iteration);
            let config = tasks[task_index].with_seed(seed);
            let outcome = run_one(&config, max_steps);

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            let pct = done * 100 / total;
            if pct > (done - 1) * 100 / total {
                tracing::info!(done, total, "progress {pct}%");
            }

            match outcome {
                Ok((steps, final_metrics)) => {
                    tracing::debug!(task_index, iteration, steps, "run complete");
                    Some(BatchRecord {
                        config,
                        iteration,
                        seed,
                        steps,
                        final_metrics,
                    })
                }
                Err(e) => {
                    tracing::warn!(task_index, iteration, error = %e, "run failed");
                    None
                }
            }
        })
        .collect();

    records.into_iter().flatten().collect()
}

/// How the sweep chooses beta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum BetaAxis {
    /// Beta values used as given
    Values(Vec<f64>),
    /// alpha / beta ratios; beta = alpha / ratio
    Ratios(Vec<f64>),
}

impl BetaAxis {
    /// Betas paired with `alpha`, dropping any outside (0, 1]
    pub fn betas_for(&self, alpha: f64) -> Vec<f64> {
        let raw: Vec<f64> = match self {
            BetaAxis::Values(values) => values.clone(),
            BetaAxis::Ratios(ratios) => ratios
                .iter()
                .map(|r| ((alpha / r) * 1e12).round() / 1e12)
                .collect(),
        };
        raw.into_iter().filter(|&b| b > 0.0 && b <= 1.0).collect()
    }
}

/// Cartesian grid of conflict configurations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictSweep {
    /// Values for everything the sweep does not vary
    pub base: ConflictConfig,
    pub majority_share: Vec<f64>,
    pub density: Vec<f64>,
    pub alpha: Vec<f64>,
    pub beta: BetaAxis,
    pub decay: Vec<f64>,
    pub vision: Vec<u32>,
    pub aversion: Vec<f64>,
}

impl Default for ConflictSweep {
    fn default() -> Self {
        let base = ConflictConfig::default();
        Self {
            majority_share: vec![base.majority_share],
            density: vec![base.density],
            alpha: vec![0.1, 0.2, 0.3],
            beta: BetaAxis::Ratios(vec![0.5, 1.0, 4.0]),
            decay: vec![0.7, 0.9],
            vision: vec![1, 2],
            aversion: vec![0.0, 0.1, 0.3],
            base,
        }
    }
}

impl ConflictSweep {
    /// Every combination, in axis order majority share, density, alpha,
    /// beta, decay, vision, aversion
    pub fn expand(&self) -> Vec<ConflictConfig> {
        let mut out = Vec::new();
        for &majority_share in &self.majority_share {
            for &density in &self.density {
                for &alpha in &self.alpha {
                    for beta in self.beta.betas_for(alpha) {
                        for &decay in &self.decay {
                            for &vision in &self.vision {
                                for &aversion in &self.aversion {
                                    out.push(ConflictConfig {
                                        majority_share,
                                        density,
                                        alpha,
                                        beta,
                                        decay,
                                        vision,
                                        aversion,
                                        ..self.base.clone()
                                    });
                                }
                            }
                        }
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GridConfig;

    #[test]
    fn test_run_seed_layout() {
        assert_eq!(run_seed(100, 0, 3, 0), 100);
        assert_eq!(run_seed(100, 0, 3, 2), 102);
        assert_eq!(run_seed(100, 2, 3, 1), 107);
    }

    #[test]
    fn test_ratio_axis_skips_out_of_range() {
        let axis = BetaAxis::Ratios(vec![0.1, 0.5, 2.0, 0.0, -1.0]);
        // 0.2 / 0.1 = 2.0 > 1 and 0.2 / 0 = inf are dropped, negative too
        assert_eq!(axis.betas_for(0.2), vec![0.4, 0.1]);
    }

    #[test]
    fn test_value_axis_passthrough() {
        let axis = BetaAxis::Values(vec![0.05, 0.0, 1.5]);
        assert_eq!(axis.betas_for(0.3), vec![0.05]);
    }

    #[test]
    fn test_expand_cartesian() {
        let sweep = ConflictSweep {
            majority_share: vec![0.6, 0.7],
            density: vec![0.5],
            alpha: vec![0.1, 0.2],
            beta: BetaAxis::Values(vec![0.05]),
            decay: vec![0.8],
            vision: vec![1, 2, 3],
            aversion: vec![0.1],
            ..Default::default()
        };
        let configs = sweep.expand();
        assert_eq!(configs.len(), 2 * 2 * 3);
        assert_eq!(configs[0].majority_share, 0.6);
        assert_eq!(configs[0].vision, 1);
        assert_eq!(configs[1].vision, 2);
        assert!(configs.iter().all(|c| c.beta == 0.05));
    }

    #[test]
    fn test_batch_records_in_task_order() {
        let small = ConflictConfig {
            grid: GridConfig::new(8, 8, false),
            ..Default::default()
        };
        let tasks = vec![
            ConflictConfig { alpha: 0.1, ..small.clone() },
            ConflictConfig { alpha: 0.3, ..small },
        ];
        let records = run_batch(&tasks, 2, 3, 10);

        assert_eq!(records.len(), 4);
        let seeds: Vec<u64> = records.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![10, 11, 12, 13]);
        assert_eq!(records[2].config.alpha, 0.3);
        assert!(records.iter().all(|r| r.steps == 3));
        assert!(records.iter().all(|r| r.config.seed == r.seed));
    }

    #[test]
    fn test_failed_runs_are_dropped() {
        let bad = ConflictConfig {
            density: 2.0,
            ..Default::default()
        };
        assert!(run_batch(&[bad], 2, 5, 0).is_empty());
    }
}
