//! Step engine and the two decision policies

pub mod conflict;
pub mod metrics;
pub mod model;
pub mod policy;
pub mod population;
pub mod segregation;
pub mod world;

pub use conflict::{Conflict, ConflictModel, ConflictWorld};
pub use metrics::{Metrics, Snapshot};
pub use model::{Model, Scenario};
pub use policy::{DecisionPolicy, SnapshotTiming, StepTally, Verdict};
pub use segregation::{Segregation, SegregationModel, SegregationWorld};
pub use world::World;
