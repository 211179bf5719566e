//! World - the population, its spatial index and the cell ledger

use crate::core::error::{EnclaveError, Result};
use crate::core::types::{AgentId, CellPos, Group};
use crate::entity::agent::Agent;
use crate::entity::memory::Ledger;
use crate::spatial::index::SpatialIndex;

/// Everything a decision policy reads and mutates during a step
pub struct World<S, G> {
    agents: Vec<Agent<S>>,
    /// Cell -> occupants
    pub grid: G,
    /// Recent encounter outcomes per cell
    pub ledger: Ledger<CellPos>,
}

impl<S, G: SpatialIndex> World<S, G> {
    pub fn new(grid: G, ledger_capacity: usize) -> Self {
        Self {
            agents: Vec::new(),
            grid,
            ledger: Ledger::new(ledger_capacity),
        }
    }

    /// Create an agent on `cell`; ids are assigned sequentially
    pub fn spawn(&mut self, group: Group, cell: CellPos, state: S) -> Result<AgentId> {
        let id = AgentId(self.agents.len() as u32);
        self.grid.place(id, cell)?;
        self.agents.push(Agent::new(id, cell, group, state));
        Ok(id)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent<S>> {
        self.agents.get(id.index())
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent<S>> {
        self.agents.get_mut(id.index())
    }

    pub fn fetch(&self, id: AgentId) -> Result<&Agent<S>> {
        self.agent(id).ok_or(EnclaveError::AgentNotFound(id))
    }

    pub fn fetch_mut(&mut self, id: AgentId) -> Result<&mut Agent<S>> {
        self.agent_mut(id).ok_or(EnclaveError::AgentNotFound(id))
    }

    pub fn agents(&self) -> &[Agent<S>] {
        &self.agents
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(|a| a.id).collect()
    }

    pub fn population(&self) -> usize {
        self.agents.len()
    }

    pub fn group_count(&self, group: Group) -> usize {
        self.agents.iter().filter(|a| a.group == group).count()
    }

    pub fn group_of(&self, id: AgentId) -> Option<Group> {
        self.agent(id).map(|a| a.group)
    }

    /// Move an agent, keeping its cell and the index in step
    pub fn relocate(&mut self, id: AgentId, to: CellPos) -> Result<()> {
        let from = self.fetch(id)?.cell;
        self.grid.relocate(id, from, to)?;
        self.fetch_mut(id)?.cell = to;
        Ok(())
    }
}
