//! Enclave - spatial agent simulations
//!
//! Agents live on a 2-D grid, act once per step in shuffled order and may
//! relocate. Two decision policies share the same engine: a Schelling-style
//! segregation model and an ethnic-conflict model with bounded interaction
//! memory.

pub mod aggregate;
pub mod core;
pub mod entity;
pub mod simulation;
pub mod spatial;
