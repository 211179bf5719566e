//! Occupancy indexes: which agents sit on which cells
//!
//! The agent owns its cell; the index holds the inverse mapping. Every
//! mutation is applied immediately, so a query issued right after a move
//! sees the new layout.

use crate::core::error::{EnclaveError, Result};
use crate::core::types::{AgentId, CellPos};
use crate::spatial::grid::{EdgePolicy, Grid};

/// Capability the decision policies need from a grid
pub trait SpatialIndex {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn contains(&self, cell: CellPos) -> bool {
        cell.x < self.width() && cell.y < self.height()
    }

    /// Moore neighborhood honoring the edge policy
    fn neighborhood(&self, cell: CellPos, radius: u32, include_center: bool) -> Vec<CellPos>;

    /// Agents currently on `cell`; empty for vacant or off-grid cells
    fn occupants(&self, cell: CellPos) -> &[AgentId];

    fn is_vacant(&self, cell: CellPos) -> bool {
        self.occupants(cell).is_empty()
    }

    /// Whether `place` onto this cell would succeed
    fn accepts(&self, cell: CellPos) -> bool;

    fn place(&mut self, agent: AgentId, cell: CellPos) -> Result<()>;

    fn vacate(&mut self, agent: AgentId, cell: CellPos) -> Result<()>;

    /// Currently vacant cells, in no particular order
    fn empty_cells(&self) -> &[CellPos];

    /// Atomic vacate + place; on error nothing changes
    fn relocate(&mut self, agent: AgentId, from: CellPos, to: CellPos) -> Result<()> {
        if !self.contains(to) {
            return Err(EnclaveError::OutOfBounds(to));
        }
        if from == to {
            return Ok(());
        }
        if !self.accepts(to) {
            return Err(EnclaveError::CellOccupied(to));
        }
        self.vacate(agent, from)?;
        self.place(agent, to)
    }

    /// Agents on the cells around `cell`, center excluded
    fn neighbors(&self, cell: CellPos, radius: u32) -> Vec<AgentId> {
        self.neighborhood(cell, radius, false)
            .into_iter()
            .flat_map(|c| self.occupants(c).iter().copied())
            .collect()
    }
}

/// Vacant-cell set with O(1) insert, remove and indexed access
#[derive(Debug, Clone)]
struct Vacancies {
    cells: Vec<CellPos>,
    slots: Grid<Option<usize>>,
}

impl Vacancies {
    fn all(width: u32, height: u32, edge: EdgePolicy) -> Self {
        let mut slots = Grid::new(width, height, edge);
        let cells: Vec<CellPos> = slots.coords().collect();
        for (i, &cell) in cells.iter().enumerate() {
            slots.set(cell, Some(i));
        }
        Self { cells, slots }
    }

    fn remove(&mut self, cell: CellPos) {
        let Some(slot) = self.slots.get(cell).copied().flatten() else {
            return;
        };
        self.cells.swap_remove(slot);
        if let Some(&moved) = self.cells.get(slot) {
            self.slots.set(moved, Some(slot));
        }
        self.slots.set(cell, None);
    }

    fn insert(&mut self, cell: CellPos) {
        if self.slots.get(cell) == Some(&None) {
            self.slots.set(cell, Some(self.cells.len()));
            self.cells.push(cell);
        }
    }
}

/// At most one agent per cell
#[derive(Debug, Clone)]
pub struct SingleGrid {
    cells: Grid<Option<AgentId>>,
    vacant: Vacancies,
}

impl SingleGrid {
    pub fn new(width: u32, height: u32, edge: EdgePolicy) -> Self {
        Self {
            cells: Grid::new(width, height, edge),
            vacant: Vacancies::all(width, height, edge),
        }
    }

    pub fn occupant(&self, cell: CellPos) -> Option<AgentId> {
        self.cells.get(cell).copied().flatten()
    }
}

impl SpatialIndex for SingleGrid {
    fn width(&self) -> u32 {
        self.cells.width
    }

    fn height(&self) -> u32 {
        self.cells.height
    }

    fn neighborhood(&self, cell: CellPos, radius: u32, include_center: bool) -> Vec<CellPos> {
        self.cells.neighborhood(cell, radius, include_center)
    }

    fn occupants(&self, cell: CellPos) -> &[AgentId] {
        self.cells.get(cell).map(Option::as_slice).unwrap_or(&[])
    }

    fn accepts(&self, cell: CellPos) -> bool {
        self.cells.get(cell).is_some_and(Option::is_none)
    }

    fn place(&mut self, agent: AgentId, cell: CellPos) -> Result<()> {
        match self.cells.get_mut(cell) {
            None => Err(EnclaveError::OutOfBounds(cell)),
            Some(Some(_)) => Err(EnclaveError::CellOccupied(cell)),
            Some(slot) => {
                *slot = Some(agent);
                self.vacant.remove(cell);
                Ok(())
            }
        }
    }

    fn vacate(&mut self, agent: AgentId, cell: CellPos) -> Result<()> {
        match self.cells.get_mut(cell) {
            None => Err(EnclaveError::OutOfBounds(cell)),
            Some(slot) if *slot == Some(agent) => {
                *slot = None;
                self.vacant.insert(cell);
                Ok(())
            }
            Some(_) => Err(EnclaveError::AgentNotFound(agent)),
        }
    }

    fn empty_cells(&self) -> &[CellPos] {
        &self.vacant.cells
    }
}

/// Any number of agents per cell
#[derive(Debug, Clone)]
pub struct MultiGrid {
    cells: Grid<Vec<AgentId>>,
    vacant: Vacancies,
}

impl MultiGrid {
    pub fn new(width: u32, height: u32, edge: EdgePolicy) -> Self {
        Self {
            cells: Grid::new(width, height, edge),
            vacant: Vacancies::all(width, height, edge),
        }
    }
}

impl SpatialIndex for MultiGrid {
    fn width(&self) -> u32 {
        self.cells.width
    }

    fn height(&self) -> u32 {
        self.cells.height
    }

    fn neighborhood(&self, cell: CellPos, radius: u32, include_center: bool) -> Vec<CellPos> {
        self.cells.neighborhood(cell, radius, include_center)
    }

    fn occupants(&self, cell: CellPos) -> &[AgentId] {
        self.cells.get(cell).map(Vec::as_slice).unwrap_or(&[])
    }

    fn accepts(&self, cell: CellPos) -> bool {
        self.cells.contains(cell)
    }

    fn place(&mut self, agent: AgentId, cell: CellPos) -> Result<()> {
        let slot = self
            .cells
            .get_mut(cell)
            .ok_or(EnclaveError::OutOfBounds(cell))?;
        slot.push(agent);
        self.vacant.remove(cell);
        Ok(())
    }

    fn vacate(&mut self, agent: AgentId, cell: CellPos) -> Result<()> {
        let slot = self
            .cells
            .get_mut(cell)
            .ok_or(EnclaveError::OutOfBounds(cell))?;
        let before = slot.len();
        slot.retain(|&a| a != agent);
        if slot.len() == before {
            return Err(EnclaveError::AgentNotFound(agent));
        }
        if slot.is_empty() {
            self.vacant.insert(cell);
        }
        Ok(())
    }

    fn empty_cells(&self) -> &[CellPos] {
        &self.vacant.cells
    }
}
