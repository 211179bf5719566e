//! Agents and their variant-specific state

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, CellPos, Group};
use crate::entity::memory::{MemoryWindow, Outcome};

/// One member of the population
///
/// `cell` is the agent's side of the agent/cell edge; the spatial index
/// holds the inverse. `group` never changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent<S> {
    pub id: AgentId,
    pub cell: CellPos,
    pub group: Group,
    pub state: S,
}

impl<S> Agent<S> {
    pub fn new(id: AgentId, cell: CellPos, group: Group, state: S) -> Self {
        Self {
            id,
            cell,
            group,
            state,
        }
    }
}

/// Acceptable range for the share of same-group neighbors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub lower: f64,
    pub upper: f64,
}

impl Tolerance {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn accepts(&self, share_alike: f64) -> bool {
        self.lower <= share_alike && share_alike <= self.upper
    }
}

/// Mutable disposition of a conflict-model agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disposition {
    /// Propensity toward violent encounters (0.0 to 1.0)
    pub grievance: f64,
    /// Adaptive sensitivity; only the majority group updates it (0.0 to 1.0)
    pub violence_threshold: f64,
    /// Probability of taking the least-violent move (0.0 to 1.0)
    pub aversion: f64,
    /// Last few encounter outcomes, when personal memory is enabled
    pub memory: Option<MemoryWindow>,
}

impl Disposition {
    /// All three values must already lie in [0, 1]
    pub fn new(grievance: f64, violence_threshold: f64, aversion: f64, memory_capacity: Option<usize>) -> Self {
        debug_assert!((0.0..=1.0).contains(&grievance), "grievance out of range: {grievance}");
        debug_assert!(
            (0.0..=1.0).contains(&violence_threshold),
            "violence_threshold out of range: {violence_threshold}"
        );
        debug_assert!((0.0..=1.0).contains(&aversion), "aversion out of range: {aversion}");
        Self {
            grievance,
            violence_threshold,
            aversion,
            memory: memory_capacity.map(MemoryWindow::new),
        }
    }

    /// Shift grievance after an encounter
    pub fn absorb(&mut self, outcome: Outcome, alpha: f64, beta: f64) {
        self.grievance = match outcome {
            Outcome::Violent => (self.grievance + alpha).min(1.0),
            Outcome::Neutral => (self.grievance - beta).max(0.0),
        };
    }

    pub fn remember(&mut self, outcome: Outcome) {
        if let Some(memory) = self.memory.as_mut() {
            memory.push(outcome);
        }
    }

    pub fn decay(&mut self, factor: f64) {
        self.grievance = (self.grievance * factor).clamp(0.0, 1.0);
    }

    /// Move the violence threshold given the violent and neutral shares of a
    /// memory window
    ///
    /// Erosion scales with the current threshold and recovery with its
    /// distance from 1, so the threshold is path dependent.
    pub fn adapt_threshold(&mut self, alpha: f64, beta: f64, violent_share: f64, neutral_share: f64) {
        let t = self.violence_threshold;
        let delta = -alpha * violent_share * t + beta * neutral_share * (1.0 - t);
        self.violence_threshold = (t + delta).clamp(0.0, 1.0);
    }
}
