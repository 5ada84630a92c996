//! Domain types: particles, the world store and simulation settings.

pub mod config;
pub mod particle;
pub mod world;

pub use config::{SimConfig, SpawnerConfig};
pub use particle::{IntegrationScheme, Particle, ParticleId, ParticleSpec};
pub use world::{DistanceLink, World};
