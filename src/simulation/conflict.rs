//! Ethnic conflict: pairwise encounters across group lines raise or lower
//! grievance, the majority adapts its violence threshold from recent
//! memory, and agents drift toward cells with less recorded violence.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::config::{ConflictConfig, FallbackRule};
use crate::core::error::Result;
use crate::core::types::{AgentId, CellPos, Group};
use crate::entity::agent::Disposition;
use crate::entity::memory::Outcome;
use crate::simulation::metrics::{self, mean_or_zero, Metrics};
use crate::simulation::model::{Model, Scenario};
use crate::simulation::policy::{DecisionPolicy, SnapshotTiming, StepTally, Verdict};
use crate::simulation::population::{draw_group, sample_cells};
use crate::simulation::world::World;
use crate::spatial::index::{MultiGrid, SpatialIndex};

pub type ConflictWorld = World<Disposition, MultiGrid>;
pub type ConflictModel = Model<Conflict>;

/// Conflict decision rule
#[derive(Debug, Clone)]
pub struct Conflict {
    /// Radius for partner search and cell-history lookups
    pub vision: u32,
    /// Grievance gain on a violent encounter, threshold erosion rate
    pub alpha: f64,
    /// Grievance relief on a neutral encounter, threshold recovery rate
    pub beta: f64,
    /// Per-step grievance multiplier
    pub decay: f64,
    pub fallback: FallbackRule,
}

impl Conflict {
    pub fn from_config(config: &ConflictConfig) -> Self {
        Self {
            vision: config.vision,
            alpha: config.alpha,
            beta: config.beta,
            decay: config.decay,
            fallback: config.fallback,
        }
    }

    /// Encounter one random out-group neighbor, if any
    pub fn interact<R: Rng + ?Sized>(
        &self,
        id: AgentId,
        world: &mut ConflictWorld,
        rng: &mut R,
    ) -> Result<Option<Outcome>> {
        let agent = world.fetch(id)?;
        let (cell, group, grievance) = (agent.cell, agent.group, agent.state.grievance);

        let out_group: Vec<AgentId> = world
            .grid
            .neighbors(cell, self.vision)
            .into_iter()
            .filter(|&n| world.group_of(n) == Some(group.other()))
            .collect();
        let Some(&partner) = out_group.choose(rng) else {
            return Ok(None);
        };

        let p_violence = ((grievance + world.fetch(partner)?.state.grievance) / 2.0).min(1.0);
        let outcome = if rng.gen::<f64>() < p_violence {
            Outcome::Violent
        } else {
            Outcome::Neutral
        };

        for participant in [id, partner] {
            let state = &mut world.fetch_mut(participant)?.state;
            state.absorb(outcome, self.alpha, self.beta);
            state.remember(outcome);
        }
        world.ledger.record(cell, outcome);

        tracing::trace!(agent = id.0, partner = partner.0, at = %cell, ?outcome, "encounter");
        Ok(Some(outcome))
    }

    /// Decay grievance; the majority also adapts its violence threshold
    pub fn update(&self, id: AgentId, world: &mut ConflictWorld) -> Result<()> {
        let agent = world.fetch(id)?;
        let (cell, group) = (agent.cell, agent.group);

        let window = if group == Group::Majority {
            match &agent.state.memory {
                Some(memory) => memory.to_vec(),
                None => world.ledger.recent_in_radius(&world.grid, cell, self.vision),
            }
        } else {
            Vec::new()
        };

        let state = &mut world.fetch_mut(id)?.state;
        state.decay(self.decay);
        if !window.is_empty() {
            let len = window.len() as f64;
            let violent = window.iter().filter(|&&o| o == Outcome::Violent).count() as f64 / len;
            let neutral = window.iter().filter(|&&o| o == Outcome::Neutral).count() as f64 / len;
            state.adapt_threshold(self.alpha, self.beta, violent, neutral);
        }
        Ok(())
    }

    /// Step toward the adjacent cell with the least recorded violence
    ///
    /// Candidates are the current cell followed by the empty neighbors in
    /// enumeration order; the first minimum wins ties. Returns whether the
    /// agent changed cells.
    pub fn relocate<R: Rng + ?Sized>(&self, id: AgentId, world: &mut ConflictWorld, rng: &mut R) -> Result<bool> {
        let agent = world.fetch(id)?;
        let (current, aversion) = (agent.cell, agent.state.aversion);

        let empty: Vec<CellPos> = world
            .grid
            .neighborhood(current, 1, false)
            .into_iter()
            .filter(|&c| world.grid.is_vacant(c))
            .collect();
        if empty.is_empty() {
            return Ok(false);
        }

        let best = std::iter::once(current)
            .chain(empty.iter().copied())
            .min_by_key(|c| world.ledger.violent_count(c))
            .unwrap_or(current);

        let target = if best != current && rng.gen::<f64>() < aversion {
            Some(best)
        } else {
            match self.fallback {
                FallbackRule::SecondRoll => {
                    if rng.gen::<f64>() < 1.0 - aversion {
                        empty.choose(rng).copied()
                    } else {
                        None
                    }
                }
                FallbackRule::AlwaysRandom => {
                    let mut options = Vec::with_capacity(empty.len() + 1);
                    options.push(current);
                    options.extend_from_slice(&empty);
                    options.choose(rng).copied()
                }
            }
        };

        match target {
            Some(to) if to != current => {
                world.relocate(id, to)?;
                tracing::trace!(agent = id.0, from = %current, to = %to, "relocated");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn group_mean(world: &ConflictWorld, group: Group, value: impl Fn(&Disposition) -> f64) -> f64 {
        mean_or_zero(
            world
                .agents()
                .iter()
                .filter(|a| a.group == group)
                .map(|a| value(&a.state)),
        )
    }
}

impl DecisionPolicy for Conflict {
    type State = Disposition;
    type Grid = MultiGrid;

    const TIMING: SnapshotTiming = SnapshotTiming::BeforeAgents;

    fn name(&self) -> &'static str {
        "conflict"
    }

    /// interact, then update, then move; no phase is skipped
    fn act<R: Rng + ?Sized>(&self, id: AgentId, world: &mut ConflictWorld, rng: &mut R) -> Result<Verdict> {
        let encounter = self.interact(id, world, rng)?;
        self.update(id, world)?;
        let moved = self.relocate(id, world, rng)?;
        Ok(Verdict {
            satisfied: !moved,
            moved,
            encounter,
        })
    }

    fn observe(&self, world: &ConflictWorld, _tally: &StepTally) -> Metrics {
        let (violent, total) = world.ledger.totals();

        let mut metrics = Metrics::new();
        metrics.insert(
            metrics::AVG_MAJORITY_GRIEVANCE.to_string(),
            Self::group_mean(world, Group::Majority, |d| d.grievance),
        );
        metrics.insert(
            metrics::AVG_MINORITY_GRIEVANCE.to_string(),
            Self::group_mean(world, Group::Minority, |d| d.grievance),
        );
        metrics.insert(
            metrics::AVG_MAJORITY_THRESHOLD.to_string(),
            Self::group_mean(world, Group::Majority, |d| d.violence_threshold),
        );
        metrics.insert(
            metrics::AVG_MINORITY_THRESHOLD.to_string(),
            Self::group_mean(world, Group::Minority, |d| d.violence_threshold),
        );
        metrics.insert(
            metrics::VIOLENCE_LEVEL.to_string(),
            violent as f64 / total.max(1) as f64,
        );
        metrics.insert(metrics::INTERACTIONS.to_string(), total as f64);
        metrics
    }
}

/// Place agents with random groups and initial dispositions
pub fn populate<R: Rng + ?Sized>(config: &ConflictConfig, rng: &mut R) -> Result<ConflictWorld> {
    let grid = MultiGrid::new(config.grid.width, config.grid.height, config.grid.edge());
    let mut world = World::new(grid, config.memory.cell_capacity);
    let initial = &config.initial;

    for cell in sample_cells(&config.grid, config.density, rng) {
        let group = draw_group(config.majority_share, rng);
        let grievance = rng.gen::<f64>() * initial.grievance_max;
        let threshold = (rng.gen::<f64>() * (initial.threshold_max - initial.threshold_min) + initial.threshold_min)
            .min(initial.threshold_max);
        let disposition = Disposition::new(grievance, threshold, config.aversion, config.memory.personal_capacity);
        world.spawn(group, cell, disposition)?;
    }
    Ok(world)
}

impl Scenario for ConflictConfig {
    type Policy = Conflict;

    fn seed(&self) -> u64 {
        self.seed
    }

    fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    fn build(&self) -> Result<ConflictModel> {
        self.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let world = populate(self, &mut rng)?;
        tracing::debug!(
            population = world.population(),
            majority = world.group_count(Group::Majority),
            "conflict model populated"
        );
        Ok(Model::from_parts(Conflict::from_config(self), world, rng))
    }
}
