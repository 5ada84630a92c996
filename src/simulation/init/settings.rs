use tracing::info;

use crate::core::{Result, SimError, Vec3};
use crate::domain::config::validate_step;
use crate::domain::{IntegrationScheme, SimConfig};
use crate::systems::Spawner;

use super::perf_stats::PerfStats;
use super::Simulation;

pub(super) fn configure(
    sim: &mut Simulation,
    gravity: Vec3,
    cell_size: f64,
    sub_steps: u32,
    sim_dt: f64,
) -> Result<()> {
    validate_step(gravity, cell_size, sub_steps, sim_dt)?;
    let old_sub_dt = sim.config.sub_dt();
    sim.config.gravity = gravity.to_array();
    sim.config.cell_size = cell_size;
    sim.config.sub_steps = sub_steps;
    sim.config.sim_dt = sim_dt;
    sim.world.set_gravity(gravity);
    rescale_implicit_velocity(sim, old_sub_dt);
    info!(cell_size, sub_steps, sim_dt, "step parameters updated");
    Ok(())
}

pub(super) fn set_gravity(sim: &mut Simulation, gravity: Vec3) -> Result<()> {
    if !gravity.is_finite() {
        return Err(SimError::InvalidConfiguration("gravity must be finite".into()));
    }
    sim.config.gravity = gravity.to_array();
    sim.world.set_gravity(gravity);
    Ok(())
}

pub(super) fn set_search_radius(sim: &mut Simulation, radius: Option<u32>) -> Result<()> {
    if radius == Some(0) {
        return Err(SimError::InvalidConfiguration("searchRadius must be >= 1".into()));
    }
    sim.config.search_radius = radius;
    Ok(())
}

pub(super) fn set_collisions_enabled(sim: &mut Simulation, enabled: bool) {
    sim.config.collisions_enabled = enabled;
}

pub(super) fn set_spawn_per_tick(sim: &mut Simulation, count: u32) {
    sim.config.spawn_per_tick = count;
}

pub(super) fn apply_config(sim: &mut Simulation, config: SimConfig) -> Result<()> {
    config.validate()?;
    if config.scheme != sim.config.scheme && !sim.world.is_empty() {
        return Err(SimError::InvalidConfiguration(
            "integration scheme cannot change once particles exist".into(),
        ));
    }
    // Same spawner settings keep the sequence going
    if config.spawner != sim.config.spawner {
        sim.spawner = Spawner::from_validated(config.spawner.clone());
    }
    sim.world.set_gravity(config.gravity_vec());
    info!(scheme = ?config.scheme, sub_steps = config.sub_steps, "configuration applied");
    let old_sub_dt = sim.config.sub_dt();
    sim.config = config;
    rescale_implicit_velocity(sim, old_sub_dt);
    Ok(())
}

/// Position-based particles store velocity as a per-sub-step displacement;
/// stretch it to the new sub-step length so speeds survive a retune.
fn rescale_implicit_velocity(sim: &mut Simulation, old_sub_dt: f64) {
    let new_sub_dt = sim.config.sub_dt();
    if sim.config.scheme != IntegrationScheme::PositionBased || new_sub_dt == old_sub_dt {
        return;
    }
    let ratio = new_sub_dt / old_sub_dt;
    for p in sim.world.particles_mut() {
        p.position_previous = p.position_current - (p.position_current - p.position_previous) * ratio;
    }
}

pub(super) fn enable_perf_metrics(sim: &mut Simulation, enabled: bool) {
    sim.perf_enabled = enabled;
    if !enabled {
        sim.perf_stats.reset();
    }
}

pub(super) fn get_perf_stats(sim: &Simulation) -> PerfStats {
    sim.perf_stats.clone()
}
