//! Outer-level orchestration
//!
//! Parameter sweeps over independent runs, and the serializable output of a
//! single run.

pub mod batch;
pub mod output;

pub use batch::{run_batch, BatchRecord, BetaAxis, ConflictSweep};
pub use output::{RunOutput, RunSummary};
