//! Batch sweep integration tests

use enclave::aggregate::batch::{run_one, run_seed};
use enclave::aggregate::{run_batch, BetaAxis, ConflictSweep};
use enclave::core::config::{ConflictConfig, GridConfig, SegregationConfig, ToleranceDraw};
use enclave::simulation::metrics::HAPPY;
use enclave::simulation::Scenario;

#[test]
fn test_batch_matches_individual_runs() {
    let tasks = vec![
        SegregationConfig {
            grid: GridConfig::new(12, 12, true),
            density: 0.6,
            ..Default::default()
        },
        SegregationConfig {
            grid: GridConfig::new(12, 12, true),
            density: 0.9,
            ..Default::default()
        },
    ];
    let records = run_batch(&tasks, 3, 20, 500);
    assert_eq!(records.len(), 6);

    for record in &records {
        let task_index = usize::from(record.config.density > 0.7);
        assert_eq!(record.seed, run_seed(500, task_index, 3, record.iteration));

        let (steps, metrics) = run_one(&tasks[task_index].with_seed(record.seed), 20).unwrap();
        assert_eq!(steps, record.steps);
        assert_eq!(metrics, record.final_metrics);
    }
}

#[test]
fn test_settled_runs_stop_early() {
    let task = SegregationConfig {
        grid: GridConfig::new(8, 8, true),
        density: 1.0,
        tolerance: ToleranceDraw::Fixed { lower: 0.0, upper: 1.0 },
        ..Default::default()
    };
    let records = run_batch(&[task], 2, 100, 0);
    assert!(records.iter().all(|r| r.steps == 1));
    assert!(records.iter().all(|r| r.final_metrics[HAPPY] == 64.0));
}

#[test]
fn test_ratio_sweep_runs() {
    let sweep = ConflictSweep {
        base: ConflictConfig {
            grid: GridConfig::new(10, 10, false),
            ..Default::default()
        },
        alpha: vec![0.1, 0.4],
        beta: BetaAxis::Ratios(vec![0.2, 2.0]),
        decay: vec![0.8],
        vision: vec![1],
        aversion: vec![0.0, 0.5],
        ..Default::default()
    };
    let tasks = sweep.expand();
    // alpha 0.4 / ratio 0.2 = 2.0 is out of range
    assert_eq!(tasks.len(), 3 * 2);
    assert!(tasks.iter().all(|c| c.beta > 0.0 && c.beta <= 1.0));

    let records = run_batch(&tasks, 1, 5, 1);
    assert_eq!(records.len(), tasks.len());
    assert!(records.iter().all(|r| r.steps == 5 && !r.final_metrics.is_empty()));

    let json = serde_json::to_string(&records).unwrap();
    assert!(json.contains("\"final_metrics\""));
}

#[test]
fn test_sweep_from_toml() {
    let sweep: ConflictSweep = toml::from_str(
        r#"
        alpha = [0.2]
        decay = [0.9]
        vision = [2]
        aversion = [0.1]

        [beta]
        kind = "values"
        values = [0.05, 0.1]

        [base.grid]
        width = 15
        height = 15
        "#,
    )
    .unwrap();
    let tasks = sweep.expand();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].grid.width, 15);
    assert_eq!(tasks[1].beta, 0.1);
}
