use tracing::{debug, warn};

use crate::core::Result;
use crate::systems::physics::{relax_links, ResolveStats};

use super::perf_stats::saturate_u32;
use super::perf_timer::StepClock;
use super::step_physics::{hash_stage, integrate_stage, resolve_params, resolve_stage, spawn_stage};
use super::Simulation;

/// Accumulate wall time; step once when a full `sim_dt` has passed.
pub(super) fn advance(sim: &mut Simulation, dt_wall: f64) -> bool {
    if !dt_wall.is_finite() || dt_wall < 0.0 {
        warn!(dt_wall, "ignoring invalid wall time");
        return false;
    }

    sim.elapsed += dt_wall;
    if sim.elapsed < sim.config.sim_dt {
        return false;
    }
    sim.elapsed = 0.0;

    match step(sim) {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, frame = sim.frame, "step failed");
            false
        }
    }
}

pub(super) fn step(sim: &mut Simulation) -> Result<()> {
    let perf_on = sim.perf_enabled;
    if perf_on {
        sim.perf_stats.reset();
    }
    let clock = StepClock::new(perf_on);

    // === SPAWN ===
    let spawned = clock.stage(&mut sim.perf_stats.spawn_ms, || {
        spawn_stage(&mut sim.world, &mut sim.spawner, &sim.config)
    });

    let params = resolve_params(&sim.world, &sim.config);

    // === HASH + RESOLVE (integration runs inside the sub-steps) ===
    let mut occupied_cells = 0usize;
    let stats = if sim.config.collisions_enabled {
        let grid = clock.stage(&mut sim.perf_stats.hash_ms, || hash_stage(&sim.world, &params))?;
        occupied_cells = grid.occupied_cells();
        clock.stage(&mut sim.perf_stats.resolve_ms, || {
            resolve_stage(&mut sim.world, &grid, &params)
        })?
    } else {
        // === INTEGRATE ===
        clock.stage(&mut sim.perf_stats.integrate_ms, || integrate_stage(&mut sim.world, &params))?;
        ResolveStats::default()
    };
    sim.last_resolve = stats;
    if stats.degenerate_pairs > 0 {
        warn!(pairs = stats.degenerate_pairs, frame = sim.frame, "skipped coincident particle pairs");
    }

    let degenerate_links = clock.stage(&mut sim.perf_stats.links_ms, || relax_links(&mut sim.world));
    if degenerate_links > 0 {
        warn!(links = degenerate_links, frame = sim.frame, "skipped links with coincident ends");
    }

    sim.frame += 1;

    if let Some(step_ms) = clock.total_ms() {
        let perf = &mut sim.perf_stats;
        perf.step_ms = step_ms;
        perf.particle_count = saturate_u32(sim.world.particle_count() as u64);
        perf.spawned = saturate_u32(spawned as u64);
        perf.occupied_cells = saturate_u32(occupied_cells as u64);
        perf.search_radius = params.search_radius;
        perf.resolved_particles = saturate_u32(stats.resolved_particles);
        perf.candidates = saturate_u32(stats.candidates);
        perf.contacts = saturate_u32(stats.contacts);
        perf.degenerate_pairs = saturate_u32(stats.degenerate_pairs);
        perf.degenerate_links = saturate_u32(degenerate_links);
    }

    debug!(
        frame = sim.frame,
        particles = sim.world.particle_count(),
        spawned,
        contacts = stats.contacts,
        "step"
    );
    Ok(())
}
