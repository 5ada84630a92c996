use crate::core::Result;
use crate::domain::{SimConfig, World};
use crate::spatial::{build_grid, SpatialHashGrid};
use crate::systems::physics::{integrate, resolve, ResolveParams, ResolveStats};
use crate::systems::Spawner;

use super::commands::insert_particle;

/// Auto-spawn policy: `spawn_per_tick` particles from the seeded spawner
pub(super) fn spawn_stage(world: &mut World, spawner: &mut Spawner, config: &SimConfig) -> usize {
    let count = config.spawn_per_tick as usize;
    if count == 0 {
        return 0;
    }
    for spec in spawner.next_batch(count) {
        insert_particle(world, spec, config.scheme, config.sub_dt());
    }
    count
}

pub(super) fn resolve_params(world: &World, config: &SimConfig) -> ResolveParams {
    ResolveParams {
        cell_size: config.cell_size,
        sub_steps: config.sub_steps,
        dt: config.sim_dt,
        search_radius: config.resolved_search_radius(world.max_radius()),
        scheme: config.scheme,
        gravity: world.gravity(),
    }
}

pub(super) fn hash_stage(world: &World, params: &ResolveParams) -> Result<SpatialHashGrid> {
    build_grid(world, params.cell_size)
}

pub(super) fn resolve_stage(
    world: &mut World,
    grid: &SpatialHashGrid,
    params: &ResolveParams,
) -> Result<ResolveStats> {
    resolve(world, grid, params)
}

/// Non-colliding variant: plain sub-stepped integration of every particle
pub(super) fn integrate_stage(world: &mut World, params: &ResolveParams) -> Result<()> {
    integrate(world, params.dt, params.sub_steps, params.scheme)
}
