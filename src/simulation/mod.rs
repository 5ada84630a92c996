//! Simulation - fixed-step driver around the particle world
//!
//! One step runs SPAWN -> HASH -> RESOLVE -> INTEGRATE (links) and every tick
//! ends with a snapshot. The heavy lifting lives in `systems/`; this module
//! only orchestrates, times and logs.

use std::ops::Range;

use crate::core::{Result, Vec3};
use crate::domain::{IntegrationScheme, Particle, ParticleId, ParticleSpec, SimConfig, World};
use crate::systems::physics::ResolveStats;
use crate::systems::Spawner;

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "render/snapshot.rs"]
mod snapshot;
#[path = "step/step_physics.rs"]
mod step_physics;
#[path = "step/step.rs"]
mod step;
#[path = "commands/commands.rs"]
mod commands;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
mod facade;

pub use facade::Engine;
pub use perf_stats::PerfStats;
pub use snapshot::{ParticleView, SimulationSnapshot};

use snapshot::RenderBuffers;

/// The simulation: world, settings and the tick accumulator
pub struct Simulation {
    world: World,
    config: SimConfig,
    spawner: Spawner,

    // State
    frame: u64,
    elapsed: f64,
    last_resolve: ResolveStats,

    render: RenderBuffers,

    // Perf metrics
    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl Simulation {
    /// Errors: `SimError::InvalidConfiguration` if `config` does not validate.
    pub fn new(config: SimConfig) -> Result<Self> {
        init::create_simulation(config)
    }

    pub fn from_config_json(json: &str) -> Result<Self> {
        Self::new(SimConfig::from_json(json)?)
    }

    /// Default settings with a custom spawner seed
    pub fn with_seed(seed: u64) -> Self {
        init::create_seeded(seed)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Integration scheme, fixed once particles exist
    pub fn scheme(&self) -> IntegrationScheme {
        self.config.scheme
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn particle_count(&self) -> usize {
        self.world.particle_count()
    }

    /// Stats of the last collision pass (zeros when collisions are off)
    pub fn last_resolve_stats(&self) -> ResolveStats {
        self.last_resolve
    }

    // === SETTINGS ===

    /// Update the step parameters. Nothing is clamped: invalid values are
    /// rejected and leave the previous settings in place.
    pub fn configure(&mut self, gravity: Vec3, cell_size: f64, sub_steps: u32, sim_dt: f64) -> Result<()> {
        settings::configure(self, gravity, cell_size, sub_steps, sim_dt)
    }

    pub fn set_gravity(&mut self, gravity: Vec3) -> Result<()> {
        settings::set_gravity(self, gravity)
    }

    /// `None` derives the window from the largest radius
    pub fn set_search_radius(&mut self, radius: Option<u32>) -> Result<()> {
        settings::set_search_radius(self, radius)
    }

    pub fn set_collisions_enabled(&mut self, enabled: bool) {
        settings::set_collisions_enabled(self, enabled);
    }

    pub fn set_spawn_per_tick(&mut self, count: u32) {
        settings::set_spawn_per_tick(self, count);
    }

    /// Replace every setting at once.
    ///
    /// Errors: `SimError::InvalidConfiguration` for invalid values or a scheme
    /// change on a world that already has particles.
    pub fn apply_config(&mut self, config: SimConfig) -> Result<()> {
        settings::apply_config(self, config)
    }

    /// Enable or disable per-step perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled);
    }

    /// Last step perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        settings::get_perf_stats(self)
    }

    // === COMMANDS ===

    pub fn spawn(&mut self, spec: ParticleSpec) -> Result<ParticleId> {
        commands::spawn(self, spec)
    }

    /// Spawn `count` particles from the seeded spawner; returns their IDs
    pub fn spawn_random(&mut self, count: usize) -> Range<ParticleId> {
        commands::spawn_random(self, count)
    }

    /// Link two particles; `target_distance` defaults to their current distance
    pub fn link(&mut self, a: ParticleId, b: ParticleId, target_distance: Option<f64>) -> Result<()> {
        commands::link(self, a, b, target_distance)
    }

    pub fn get_particle(&self, id: ParticleId) -> Result<Particle> {
        self.world.get(id)
    }

    pub fn set_particle(&mut self, id: ParticleId, particle: Particle) -> Result<()> {
        self.world.set(id, particle)
    }

    // === STEPPING ===

    /// Feed wall time and take a snapshot. Steps at most once per call.
    pub fn tick(&mut self, dt_wall: f64) -> SimulationSnapshot {
        let stepped = self.advance(dt_wall);
        SimulationSnapshot::capture(&self.world, self.frame, stepped)
    }

    /// `tick` without building the snapshot; returns whether a step ran
    pub fn advance(&mut self, dt_wall: f64) -> bool {
        step::advance(self, dt_wall)
    }

    /// Run one full step now, ignoring the accumulator
    pub fn step(&mut self) -> Result<()> {
        step::step(self)
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot::capture(&self.world, self.frame, false)
    }

    // === RENDER BUFFERS ===

    pub(crate) fn refresh_render_buffers(&mut self) {
        self.render.refresh(&self.world);
    }

    pub(crate) fn render_buffers(&self) -> &RenderBuffers {
        &self.render
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
