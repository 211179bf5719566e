pub mod grid;
pub mod index;

pub use grid::{EdgePolicy, Grid};
pub use index::{MultiGrid, SingleGrid, SpatialIndex};
