//! Per-tick systems that act on the world.

pub mod physics;
pub mod spawner;

pub use spawner::Spawner;
