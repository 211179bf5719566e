//! Per-step aggregate snapshots

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::Step;

/// Metric name -> value
pub type Metrics = BTreeMap<String, f64>;

pub const HAPPY: &str = "happy";
pub const SHARE_HAPPY: &str = "share_happy";
pub const MOVED: &str = "moved";
pub const MEAN_SHARE_ALIKE: &str = "mean_share_alike";

pub const AVG_MAJORITY_GRIEVANCE: &str = "avg_majority_grievance";
pub const AVG_MINORITY_GRIEVANCE: &str = "avg_minority_grievance";
pub const AVG_MAJORITY_THRESHOLD: &str = "avg_majority_threshold";
pub const AVG_MINORITY_THRESHOLD: &str = "avg_minority_threshold";
pub const VIOLENCE_LEVEL: &str = "violence_level";
pub const INTERACTIONS: &str = "interactions";

/// Aggregate metrics recorded for one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub step: Step,
    pub metrics: Metrics,
}

impl Snapshot {
    pub fn new(step: Step, metrics: Metrics) -> Self {
        Self { step, metrics }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Mean of `values`, dividing by at least one
pub(crate) fn mean_or_zero(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    sum / count.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_metric() {
        let mut metrics = Metrics::new();
        metrics.insert(HAPPY.to_string(), 3.0);
        let snapshot = Snapshot::new(0, metrics);
        assert_eq!(snapshot.get(HAPPY), Some(3.0));
        assert_eq!(snapshot.get(MOVED), None);
    }

    #[test]
    fn test_mean_of_nothing_is_zero() {
        assert_eq!(mean_or_zero(std::iter::empty()), 0.0);
        assert_eq!(mean_or_zero([1.0, 2.0, 3.0].into_iter()), 2.0);
    }
}
