//! Residential segregation: agents stay while the share of same-group
//! neighbors sits inside their tolerance range, and otherwise try one
//! random vacant cell per step.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::core::config::{SegregationConfig, ToleranceDraw};
use crate::core::error::{EnclaveError, Result};
use crate::core::types::{AgentId, CellPos, Group};
use crate::entity::agent::Tolerance;
use crate::simulation::metrics::{self, mean_or_zero, Metrics};
use crate::simulation::model::{Model, Scenario};
use crate::simulation::policy::{DecisionPolicy, SnapshotTiming, StepTally, Verdict};
use crate::simulation::population::{draw_group, sample_cells};
use crate::simulation::world::World;
use crate::spatial::index::{SingleGrid, SpatialIndex};

pub type SegregationWorld = World<Tolerance, SingleGrid>;
pub type SegregationModel = Model<Segregation>;

/// Segregation decision rule
#[derive(Debug, Clone)]
pub struct Segregation {
    /// Moore radius of the neighborhood an agent judges
    pub radius: u32,
}

impl Segregation {
    pub fn new(radius: u32) -> Self {
        Self { radius }
    }

    /// Share of same-group agents around `cell`; 0 when nobody is around
    pub fn share_alike_at(&self, world: &SegregationWorld, cell: CellPos, group: Group) -> f64 {
        let neighbors = world.grid.neighbors(cell, self.radius);
        if neighbors.is_empty() {
            return 0.0;
        }
        let alike = neighbors
            .iter()
            .filter(|&&n| world.group_of(n) == Some(group))
            .count();
        alike as f64 / neighbors.len() as f64
    }
}

impl DecisionPolicy for Segregation {
    type State = Tolerance;
    type Grid = SingleGrid;

    const TIMING: SnapshotTiming = SnapshotTiming::AfterAgents;

    fn name(&self) -> &'static str {
        "segregation"
    }

    fn act<R: Rng + ?Sized>(&self, id: AgentId, world: &mut SegregationWorld, rng: &mut R) -> Result<Verdict> {
        let agent = world.fetch(id)?;
        let (cell, group, tolerance) = (agent.cell, agent.group, agent.state);

        if tolerance.accepts(self.share_alike_at(world, cell, group)) {
            return Ok(Verdict::satisfied());
        }

        // One random candidate per step, no retries
        let Some(&candidate) = world.grid.empty_cells().choose(rng) else {
            return Ok(Verdict::seeking());
        };
        if !tolerance.accepts(self.share_alike_at(world, candidate, group)) {
            return Ok(Verdict::seeking());
        }

        world.relocate(id, candidate)?;
        tracing::trace!(agent = id.0, from = %cell, to = %candidate, "relocated");
        Ok(Verdict::moved())
    }

    fn observe(&self, world: &SegregationWorld, tally: &StepTally) -> Metrics {
        let population = world.population();
        let share_happy = if population > 0 {
            tally.satisfied as f64 / population as f64 * 100.0
        } else {
            0.0
        };
        let mean_share_alike = mean_or_zero(
            world
                .agents()
                .iter()
                .map(|a| self.share_alike_at(world, a.cell, a.group)),
        );

        let mut metrics = Metrics::new();
        metrics.insert(metrics::HAPPY.to_string(), tally.satisfied as f64);
        metrics.insert(metrics::SHARE_HAPPY.to_string(), share_happy);
        metrics.insert(metrics::MOVED.to_string(), tally.moved as f64);
        metrics.insert(metrics::MEAN_SHARE_ALIKE.to_string(), mean_share_alike);
        metrics
    }

    /// Runs until every agent is satisfied in the same step
    fn is_running(&self, world: &SegregationWorld, tally: &StepTally) -> bool {
        tally.satisfied < world.population()
    }
}

/// Draws tolerance ranges according to a `ToleranceDraw`
struct ToleranceSampler {
    draw: ToleranceDraw,
    normal: Option<Normal<f64>>,
}

impl ToleranceSampler {
    fn new(draw: &ToleranceDraw) -> Result<Self> {
        let normal = match *draw {
            ToleranceDraw::Gaussian { mean, std_dev, .. } => Some(
                Normal::new(mean, std_dev)
                    .map_err(|e| EnclaveError::InvalidConfig(format!("tolerance distribution: {e}")))?,
            ),
            _ => None,
        };
        Ok(Self {
            draw: draw.clone(),
            normal,
        })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Tolerance {
        match (&self.draw, &self.normal) {
            (ToleranceDraw::Fixed { lower, upper }, _) => Tolerance::new(*lower, *upper),
            (ToleranceDraw::Uniform { min, max, upper }, _) => {
                let raw = if min < max { rng.gen_range(*min..*max) } else { *min };
                Self::bounded(raw, *upper)
            }
            (ToleranceDraw::Gaussian { upper, .. }, Some(normal)) => Self::bounded(normal.sample(rng), *upper),
            (ToleranceDraw::Gaussian { mean, upper, .. }, None) => Self::bounded(*mean, *upper),
        }
    }

    /// Clamp a drawn lower bound and pick an upper bound above it
    fn bounded(raw: f64, upper: f64) -> Tolerance {
        let lower = raw.clamp(ToleranceDraw::LOWER_FLOOR, ToleranceDraw::LOWER_CEIL);
        let upper = if upper > lower { upper } else { 1.0 };
        Tolerance::new(lower, upper)
    }
}

/// Place `floor(density * cells)` agents with drawn groups and tolerances
pub fn populate<R: Rng + ?Sized>(config: &SegregationConfig, rng: &mut R) -> Result<SegregationWorld> {
    let grid = SingleGrid::new(config.grid.width, config.grid.height, config.grid.edge());
    // The ledger is unused by this variant but the world always carries one
    let mut world = World::new(grid, 1);
    let sampler = ToleranceSampler::new(&config.tolerance)?;

    for cell in sample_cells(&config.grid, config.density, rng) {
        let group = draw_group(config.majority_share, rng);
        let tolerance = sampler.sample(rng);
        world.spawn(group, cell, tolerance)?;
    }
    Ok(world)
}

impl Scenario for SegregationConfig {
    type Policy = Segregation;

    fn seed(&self) -> u64 {
        self.seed
    }

    fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    fn build(&self) -> Result<SegregationModel> {
        self.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let world = populate(self, &mut rng)?;
        tracing::debug!(
            population = world.population(),
            majority = world.group_count(Group::Majority),
            "segregation model populated"
        );
        Ok(Model::from_parts(Segregation::new(self.radius), world, rng))
    }
}
