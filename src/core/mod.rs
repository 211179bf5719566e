pub mod config;
pub mod error;
pub mod types;

pub use error::{EnclaveError, Result};
pub use types::{AgentId, CellPos, Group, Step};
