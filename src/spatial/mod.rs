//! Broad-phase: spatial hash grid rebuilt every step.

mod hash_grid;
mod hasher;

pub use hash_grid::SpatialHashGrid;
pub use hasher::build_grid;
