//! Dense grid storage and Moore-neighborhood enumeration

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::core::types::CellPos;

/// What happens to neighborhoods at the grid boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgePolicy {
    /// Edges wrap around
    Torus,
    /// Neighborhoods are clipped at the boundary
    Bounded,
}

/// Dense row-major 2D grid, one `T` per cell
#[derive(Debug, Clone)]
pub struct Grid<T: Clone + Default> {
    pub width: u32,
    pub height: u32,
    pub edge: EdgePolicy,
    data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    pub fn new(width: u32, height: u32, edge: EdgePolicy) -> Self {
        Self {
            width,
            height,
            edge,
            data: vec![T::default(); width as usize * height as usize],
        }
    }

    #[inline]
    pub fn contains(&self, pos: CellPos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    #[inline]
    fn offset(&self, pos: CellPos) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }

    #[inline]
    pub fn get(&self, pos: CellPos) -> Option<&T> {
        if self.contains(pos) {
            Some(&self.data[self.offset(pos)])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, pos: CellPos) -> Option<&mut T> {
        if self.contains(pos) {
            let offset = self.offset(pos);
            Some(&mut self.data[offset])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, pos: CellPos, value: T) {
        if let Some(slot) = self.get_mut(pos) {
            *slot = value;
        }
    }

    pub fn cell_count(&self) -> usize {
        self.data.len()
    }

    /// Every coordinate, x-major then y
    pub fn coords(&self) -> impl Iterator<Item = CellPos> {
        let height = self.height;
        (0..self.width).flat_map(move |x| (0..height).map(move |y| CellPos::new(x, y)))
    }

    /// Cells within Chebyshev distance `radius` of `center`
    ///
    /// Enumeration order is dx ascending, then dy ascending. On a torus small
    /// enough for the neighborhood to wrap onto itself, each cell appears
    /// once (at its first offset) and the center is never re-admitted through
    /// wrapping unless `include_center` is set. Offsets are clipped per axis,
    /// so the cost is bounded by the grid size whatever the radius.
    pub fn neighborhood(&self, center: CellPos, radius: u32, include_center: bool) -> Vec<CellPos> {
        let r = radius as i64;
        let xs = self.axis_offsets(center.x as i64, r, self.width as i64);
        let ys = self.axis_offsets(center.y as i64, r, self.height as i64);

        let capacity = (xs.end() - xs.start() + 1).max(0) * (ys.end() - ys.start() + 1).max(0);
        let mut cells = Vec::with_capacity(capacity as usize);
        for dx in xs {
            for dy in ys.clone() {
                let cell = self.wrapped_offset(center, dx, dy);
                if cell == center && !include_center {
                    continue;
                }
                cells.push(cell);
            }
        }
        cells
    }

    /// Offsets along one axis that land on distinct in-grid coordinates
    fn axis_offsets(&self, c: i64, r: i64, len: i64) -> RangeInclusive<i64> {
        match self.edge {
            // Beyond `len` consecutive offsets the residues repeat
            EdgePolicy::Torus if 2 * r + 1 > len => -r..=(-r + len - 1),
            EdgePolicy::Torus => -r..=r,
            EdgePolicy::Bounded => (-r).max(-c)..=r.min(len - 1 - c),
        }
    }

    fn wrapped_offset(&self, center: CellPos, dx: i64, dy: i64) -> CellPos {
        let x = (center.x as i64 + dx).rem_euclid(self.width as i64);
        let y = (center.y as i64 + dy).rem_euclid(self.height as i64);
        CellPos::new(x as u32, y as u32)
    }
}
