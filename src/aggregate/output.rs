//! Run output and serialization

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::core::error::Result;
use crate::core::types::Step;
use crate::simulation::metrics::{Metrics, Snapshot};
use crate::simulation::model::Model;
use crate::simulation::policy::DecisionPolicy;

/// Complete output of one run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunOutput<C> {
    pub config: C,
    pub history: Vec<Snapshot>,
    pub summary: RunSummary,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub model: String,
    pub steps: Step,
    pub population: usize,
    /// False when the model stopped on its own
    pub still_running: bool,
    pub simulation_time_ms: u64,
    pub final_metrics: Metrics,
}

impl<C: Serialize> RunOutput<C> {
    pub fn new<P: DecisionPolicy>(config: C, model: &Model<P>, elapsed: Duration) -> Self {
        let final_metrics = model.latest().map(|s| s.metrics.clone()).unwrap_or_default();
        Self {
            config,
            history: model.snapshot_history().to_vec(),
            summary: RunSummary {
                model: model.policy().name().to_string(),
                steps: model.steps(),
                population: model.world().population(),
                still_running: model.is_running(),
                simulation_time_ms: elapsed.as_millis() as u64,
                final_metrics,
            },
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn summary_line(&self) -> String {
        let s = &self.summary;
        let metrics = s
            .final_metrics
            .iter()
            .map(|(k, v)| format!("{k}={v:.4}"))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{} model: {} agents, {} steps in {}ms{}\n{}",
            s.model,
            s.population,
            s.steps,
            s.simulation_time_ms,
            if s.still_running { "" } else { " (stopped)" },
            metrics,
        )
    }
}
