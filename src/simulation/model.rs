//! Main simulation loop

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::error::Result;
use crate::core::types::{AgentId, Step};
use crate::simulation::metrics::Snapshot;
use crate::simulation::policy::{DecisionPolicy, SnapshotTiming, StepTally};
use crate::simulation::world::World;

/// Owns the population and drives it one step at a time
///
/// All randomness of a run (activation order, partner and cell choices,
/// encounter rolls) comes from the model's single seeded stream, so two
/// models built from the same seed and configuration produce the same
/// history.
pub struct Model<P: DecisionPolicy> {
    policy: P,
    world: World<P::State, P::Grid>,
    schedule: Vec<AgentId>,
    rng: ChaCha8Rng,
    steps: Step,
    history: Vec<Snapshot>,
    last_tally: StepTally,
    running: bool,
}

impl<P: DecisionPolicy> Model<P> {
    /// Wrap an already-populated world, continuing an existing stream
    pub fn from_parts(policy: P, world: World<P::State, P::Grid>, rng: ChaCha8Rng) -> Self {
        let schedule = world.ids();
        Self {
            policy,
            world,
            schedule,
            rng,
            steps: 0,
            history: Vec::new(),
            last_tally: StepTally::default(),
            running: true,
        }
    }

    /// Wrap a hand-built world with a fresh stream
    pub fn from_world(policy: P, world: World<P::State, P::Grid>, seed: u64) -> Self {
        Self::from_parts(policy, world, ChaCha8Rng::seed_from_u64(seed))
    }

    /// Advance one step
    ///
    /// 1. Snapshot (policies that describe the state entering the step)
    /// 2. Shuffle the activation order
    /// 3. Every agent takes its full turn, seeing earlier agents' changes
    /// 4. Snapshot (policies that describe the state the step produced)
    /// 5. Re-evaluate the running predicate, advance the counter
    pub fn step(&mut self) -> Result<()> {
        if P::TIMING == SnapshotTiming::BeforeAgents {
            let previous = self.last_tally;
            self.record(&previous);
        }

        let mut tally = StepTally::default();
        self.schedule.shuffle(&mut self.rng);
        for &id in &self.schedule {
            let verdict = self.policy.act(id, &mut self.world, &mut self.rng)?;
            tally.record(verdict);
        }

        if P::TIMING == SnapshotTiming::AfterAgents {
            self.record(&tally);
        }

        self.running = self.policy.is_running(&self.world, &tally);
        self.last_tally = tally;
        self.steps += 1;

        tracing::debug!(
            model = self.policy.name(),
            step = self.steps,
            satisfied = tally.satisfied,
            moved = tally.moved,
            violent = tally.violent,
            neutral = tally.neutral,
            "step complete"
        );
        Ok(())
    }

    /// Step until `max_steps` more steps have run or the model stops
    ///
    /// Returns the number of steps taken.
    pub fn run(&mut self, max_steps: Step) -> Result<Step> {
        let mut taken = 0;
        while taken < max_steps && self.running {
            self.step()?;
            taken += 1;
        }
        Ok(taken)
    }

    fn record(&mut self, tally: &StepTally) {
        let metrics = self.policy.observe(&self.world, tally);
        self.history.push(Snapshot::new(self.steps, metrics));
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn snapshot_history(&self) -> &[Snapshot] {
        &self.history
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.history.last()
    }

    pub fn steps(&self) -> Step {
        self.steps
    }

    pub fn last_tally(&self) -> &StepTally {
        &self.last_tally
    }

    pub fn world(&self) -> &World<P::State, P::Grid> {
        &self.world
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

/// A validated configuration that can build a ready-to-run model
pub trait Scenario: Clone + Send + Sync {
    type Policy: DecisionPolicy;

    fn seed(&self) -> u64;

    fn with_seed(&self, seed: u64) -> Self;

    fn build(&self) -> Result<Model<Self::Policy>>;
}
