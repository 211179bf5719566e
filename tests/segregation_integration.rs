//! Segregation model integration tests

use std::collections::HashSet;

use enclave::core::config::{GridConfig, SegregationConfig, ToleranceDraw};
use enclave::core::types::{CellPos, Group};
use enclave::entity::Tolerance;
use enclave::simulation::metrics::{HAPPY, MOVED, SHARE_HAPPY};
use enclave::simulation::{Model, Scenario, Segregation, SegregationModel, World};
use enclave::spatial::{EdgePolicy, SingleGrid, SpatialIndex};

fn small_config(seed: u64) -> SegregationConfig {
    SegregationConfig {
        grid: GridConfig::new(20, 20, true),
        density: 0.8,
        seed,
        ..Default::default()
    }
}

fn assert_consistent(model: &SegregationModel) {
    let world = model.world();
    let cells: HashSet<CellPos> = world.agents().iter().map(|a| a.cell).collect();
    assert_eq!(cells.len(), world.population(), "two agents share a cell");
    for agent in world.agents() {
        assert_eq!(world.grid.occupant(agent.cell), Some(agent.id));
    }
    let total = (world.grid.width() * world.grid.height()) as usize;
    assert_eq!(world.grid.empty_cells().len(), total - world.population());
}

#[test]
fn test_fully_tolerant_full_grid_settles_immediately() {
    let config = SegregationConfig {
        grid: GridConfig::new(10, 10, true),
        density: 1.0,
        tolerance: ToleranceDraw::Fixed { lower: 0.0, upper: 1.0 },
        ..Default::default()
    };
    let mut model = config.build().unwrap();
    assert_eq!(model.world().population(), 100);
    assert!(model.is_running());

    model.step().unwrap();

    let snapshot = model.latest().unwrap();
    assert_eq!(snapshot.step, 0);
    assert_eq!(snapshot.get(HAPPY), Some(100.0));
    assert_eq!(snapshot.get(SHARE_HAPPY), Some(100.0));
    assert_eq!(snapshot.get(MOVED), Some(0.0));
    assert!(!model.is_running());

    // No further steps once settled
    assert_eq!(model.run(10).unwrap(), 0);
    assert_eq!(model.snapshot_history().len(), 1);
}

#[test]
fn test_happy_never_exceeds_population() {
    let mut model = small_config(7).build().unwrap();
    let population = model.world().population() as f64;
    model.run(30).unwrap();

    assert!(!model.snapshot_history().is_empty());
    for snapshot in model.snapshot_history() {
        let happy = snapshot.get(HAPPY).unwrap();
        assert!(happy <= population);
        assert!(snapshot.get(MOVED).unwrap() <= population - happy);
    }
}

#[test]
fn test_one_snapshot_per_step() {
    let mut model = small_config(3).build().unwrap();
    let taken = model.run(5).unwrap();
    assert_eq!(model.snapshot_history().len() as u64, taken);
    for (i, snapshot) in model.snapshot_history().iter().enumerate() {
        assert_eq!(snapshot.step, i as u64);
    }
}

#[test]
fn test_same_seed_same_history() {
    let mut a = small_config(99).build().unwrap();
    let mut b = small_config(99).build().unwrap();
    a.run(15).unwrap();
    b.run(15).unwrap();

    assert_eq!(a.snapshot_history(), b.snapshot_history());
    let cells_a: Vec<_> = a.world().agents().iter().map(|x| x.cell).collect();
    let cells_b: Vec<_> = b.world().agents().iter().map(|x| x.cell).collect();
    assert_eq!(cells_a, cells_b);
}

#[test]
fn test_moves_stay_legal() {
    let mut model = small_config(5).build().unwrap();
    assert_consistent(&model);
    for _ in 0..20 {
        if !model.is_running() {
            break;
        }
        model.step().unwrap();
        assert_consistent(&model);
    }
}

#[test]
fn test_groups_never_change() {
    let mut model = small_config(11).build().unwrap();
    let before: Vec<Group> = model.world().agents().iter().map(|a| a.group).collect();
    model.run(10).unwrap();
    let after: Vec<Group> = model.world().agents().iter().map(|a| a.group).collect();
    assert_eq!(before, after);
}

#[test]
fn test_isolated_agent_satisfied_only_with_zero_lower_bound() {
    for (lower, satisfied) in [(0.0, 1), (0.2, 0)] {
        let mut world = World::new(SingleGrid::new(7, 7, EdgePolicy::Bounded), 1);
        let id = world
            .spawn(Group::Minority, CellPos::new(3, 3), Tolerance::new(lower, 0.9))
            .unwrap();
        let mut model = Model::from_world(Segregation::new(1), world, 17);
        model.step().unwrap();
        assert_eq!(model.last_tally().satisfied, satisfied);
        // Adjacent cells see the agent itself (share 1 > 0.9), distant ones see nobody
        assert_eq!(model.last_tally().moved, 0);
        assert_eq!(model.world().agent(id).unwrap().cell, CellPos::new(3, 3));
    }
}

#[test]
fn test_intolerant_population_keeps_running() {
    // Only perfectly homogeneous neighborhoods are acceptable
    let config = SegregationConfig {
        grid: GridConfig::new(10, 10, true),
        density: 0.5,
        tolerance: ToleranceDraw::Fixed { lower: 1.0, upper: 1.0 },
        majority_share: 0.5,
        ..Default::default()
    };
    let mut model = config.build().unwrap();
    assert_eq!(model.run(5).unwrap(), 5);
    assert!(model.is_running());
}

#[test]
fn test_happy_recounted_each_step_on_static_world() {
    // Full 3x3 grid: a lone minority agent in the middle, nobody can move
    let mut world = World::new(SingleGrid::new(3, 3, EdgePolicy::Bounded), 1);
    let tolerance = Tolerance::new(0.5, 1.0);
    for x in 0..3 {
        for y in 0..3 {
            let group = if (x, y) == (1, 1) { Group::Minority } else { Group::Majority };
            world.spawn(group, CellPos::new(x, y), tolerance).unwrap();
        }
    }
    let mut model = Model::from_world(Segregation::new(1), world, 23);

    assert_eq!(model.run(5).unwrap(), 5);
    assert!(model.is_running());
    assert_eq!(model.snapshot_history().len(), 5);
    for snapshot in model.snapshot_history() {
        assert_eq!(snapshot.get(HAPPY), Some(8.0), "step {}", snapshot.step);
        assert_eq!(snapshot.get(MOVED), Some(0.0));
    }
}

#[test]
fn test_radius_beyond_grid_steps_without_blowup() {
    let config = SegregationConfig {
        grid: GridConfig::new(10, 10, false),
        radius: 100_000,
        density: 0.7,
        tolerance: ToleranceDraw::Fixed { lower: 0.0, upper: 1.0 },
        ..Default::default()
    };
    let mut model = config.build().unwrap();
    model.step().unwrap();
    assert_eq!(model.last_tally().satisfied, model.world().population());
    assert!(!model.is_running());
    assert_consistent(&model);
}
