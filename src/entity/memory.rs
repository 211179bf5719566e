//! Bounded interaction memory
//!
//! A `MemoryWindow` keeps the most recent outcomes oldest-first and evicts
//! strictly FIFO once full. A `Ledger` maps keys (cells, agents) to windows
//! of one shared capacity. Records are never edited after insertion.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::hash::Hash;

use crate::core::types::CellPos;
use crate::spatial::index::SpatialIndex;

/// Categorical result of one encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Also called "hostile" in some model revisions
    Violent,
    Neutral,
}

/// Fixed-capacity FIFO of recent outcomes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryWindow<T = Outcome> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T: Copy + PartialEq> MemoryWindow<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: T) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.entries.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    pub fn count(&self, entry: T) -> usize {
        self.entries.iter().filter(|&&e| e == entry).count()
    }
}

/// Per-key windows sharing one capacity
///
/// Lookups on keys that were never recorded behave like an empty window.
#[derive(Debug, Clone)]
pub struct Ledger<K, T = Outcome> {
    windows: AHashMap<K, MemoryWindow<T>>,
    capacity: usize,
}

impl<K: Hash + Eq + Copy, T: Copy + PartialEq> Ledger<K, T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            windows: AHashMap::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&mut self, key: K, entry: T) {
        let capacity = self.capacity;
        self.windows
            .entry(key)
            .or_insert_with(|| MemoryWindow::new(capacity))
            .push(entry);
    }

    pub fn window(&self, key: &K) -> Option<&MemoryWindow<T>> {
        self.windows.get(key)
    }

    /// Current window for `key`, oldest first
    pub fn recent(&self, key: &K) -> Vec<T> {
        self.windows.get(key).map(MemoryWindow::to_vec).unwrap_or_default()
    }

    pub fn count(&self, key: &K, entry: T) -> usize {
        self.windows.get(key).map_or(0, |w| w.count(entry))
    }

    /// Number of entries across all keys
    pub fn total_len(&self) -> usize {
        self.windows.values().map(MemoryWindow::len).sum()
    }

    /// Number of `entry` records across all keys
    pub fn total_count(&self, entry: T) -> usize {
        self.windows.values().map(|w| w.count(entry)).sum()
    }
}

impl<T: Copy + PartialEq> Ledger<CellPos, T> {
    /// Flattened history of every cell within `radius` of `cell`, center
    /// included, in neighborhood enumeration order
    pub fn recent_in_radius<G: SpatialIndex>(&self, index: &G, cell: CellPos, radius: u32) -> Vec<T> {
        index
            .neighborhood(cell, radius, true)
            .iter()
            .filter_map(|c| self.windows.get(c))
            .flat_map(|w| w.iter())
            .collect()
    }
}

impl Ledger<CellPos> {
    pub fn violent_count(&self, cell: &CellPos) -> usize {
        self.count(cell, Outcome::Violent)
    }

    /// (violent, all) entries across every cell
    pub fn totals(&self) -> (usize, usize) {
        (self.total_count(Outcome::Violent), self.total_len())
    }
}
