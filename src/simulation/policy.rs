//! Decision policy framework
//!
//! One agent shape, two decision rules. A policy decides what a single
//! agent does during its turn and how the population is summarized; the
//! model owns the schedule, the random stream and the history.

use rand::Rng;
use std::fmt;

use crate::core::error::Result;
use crate::core::types::AgentId;
use crate::entity::memory::Outcome;
use crate::simulation::metrics::Metrics;
use crate::simulation::world::World;
use crate::spatial::index::SpatialIndex;

/// When a step's snapshot is taken relative to agent activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotTiming {
    /// Row describes the state entering the step
    BeforeAgents,
    /// Row describes the state the step produced
    AfterAgents,
}

/// What one agent's turn amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Verdict {
    pub satisfied: bool,
    pub moved: bool,
    pub encounter: Option<Outcome>,
}

impl Verdict {
    pub fn satisfied() -> Self {
        Self {
            satisfied: true,
            ..Self::default()
        }
    }

    pub fn seeking() -> Self {
        Self::default()
    }

    pub fn moved() -> Self {
        Self {
            moved: true,
            ..Self::default()
        }
    }
}

/// Step-scoped accumulator of verdicts, reset by the model every step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepTally {
    pub acted: usize,
    pub satisfied: usize,
    pub moved: usize,
    pub violent: usize,
    pub neutral: usize,
}

impl StepTally {
    pub fn record(&mut self, verdict: Verdict) {
        self.acted += 1;
        self.satisfied += verdict.satisfied as usize;
        self.moved += verdict.moved as usize;
        match verdict.encounter {
            Some(Outcome::Violent) => self.violent += 1,
            Some(Outcome::Neutral) => self.neutral += 1,
            None => {}
        }
    }
}

/// Trait for variant-specific agent behavior
pub trait DecisionPolicy {
    type State: Clone + fmt::Debug;
    type Grid: SpatialIndex;

    const TIMING: SnapshotTiming;

    fn name(&self) -> &'static str;

    /// Run one agent's full turn
    fn act<R: Rng + ?Sized>(
        &self,
        id: AgentId,
        world: &mut World<Self::State, Self::Grid>,
        rng: &mut R,
    ) -> Result<Verdict>;

    /// Summarize the population; `tally` holds the most recent step's verdicts
    fn observe(&self, world: &World<Self::State, Self::Grid>, tally: &StepTally) -> Metrics;

    /// Whether the run should continue after a step
    fn is_running(&self, _world: &World<Self::State, Self::Grid>, _tally: &StepTally) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_counts_verdicts() {
        let mut tally = StepTally::default();
        tally.record(Verdict::satisfied());
        tally.record(Verdict::moved());
        tally.record(Verdict::seeking());
        tally.record(Verdict {
            satisfied: false,
            moved: true,
            encounter: Some(Outcome::Violent),
        });

        assert_eq!(tally.acted, 4);
        assert_eq!(tally.satisfied, 1);
        assert_eq!(tally.moved, 2);
        assert_eq!(tally.violent, 1);
        assert_eq!(tally.neutral, 0);
    }
}
