use thiserror::Error;

use crate::core::types::{AgentId, CellPos};

#[derive(Error, Debug)]
pub enum EnclaveError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cell already occupied: {0}")]
    CellOccupied(CellPos),

    #[error("Cell outside the grid: {0}")]
    OutOfBounds(CellPos),

    #[error("Agent not found: {0:?}")]
    AgentNotFound(AgentId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EnclaveError>;
