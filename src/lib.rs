//! Granula Engine - sub-stepped Verlet particle physics in WASM
//!
//! Architecture:
//! - core/        - Vector math and the crate error type
//! - domain/      - Particles, the world store and settings
//! - spatial/     - Spatial hash grid (broad-phase)
//! - systems/     - Integrator, collision resolver, links, spawner
//! - simulation/  - Tick driver, perf stats and the JS facade

pub mod core;
pub mod domain;
pub mod spatial;
pub mod systems;
pub mod simulation;

pub use crate::core::{IVec3, Result, SimError, Vec3};
pub use domain::{
    DistanceLink, IntegrationScheme, Particle, ParticleId, ParticleSpec, SimConfig, SpawnerConfig,
    World,
};
pub use simulation::{Engine, ParticleView, PerfStats, Simulation, SimulationSnapshot};
pub use spatial::{build_grid, SpatialHashGrid};
pub use systems::physics::{resolve, ResolveParams, ResolveStats};
pub use systems::Spawner;

use wasm_bindgen::prelude::*;

// Thread pool setup for rayon inside the browser
#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
pub use wasm_bindgen_rayon::init_thread_pool;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    web_sys::console::log_1(&"Granula WASM engine initialized".into());
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
