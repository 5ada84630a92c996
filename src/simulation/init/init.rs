use tracing::info;

use crate::core::Result;
use crate::domain::{SimConfig, SpawnerConfig, World};
use crate::systems::physics::ResolveStats;
use crate::systems::Spawner;

use super::perf_stats::PerfStats;
use super::RenderBuffers;
use super::Simulation;

pub(super) fn create_simulation(config: SimConfig) -> Result<Simulation> {
    config.validate()?;
    let spawner = Spawner::new(config.spawner.clone())?;
    info!(
        scheme = ?config.scheme,
        cell_size = config.cell_size,
        sub_steps = config.sub_steps,
        sim_dt = config.sim_dt,
        "simulation created"
    );
    Ok(assemble(config, spawner))
}

/// Defaults only differ by seed, which never fails validation
pub(super) fn create_seeded(seed: u64) -> Simulation {
    let config = SimConfig {
        spawner: SpawnerConfig { seed, ..SpawnerConfig::default() },
        ..SimConfig::default()
    };
    let spawner = Spawner::from_validated(config.spawner.clone());
    assemble(config, spawner)
}

fn assemble(config: SimConfig, spawner: Spawner) -> Simulation {
    Simulation {
        world: World::new(config.gravity_vec()),
        config,
        spawner,
        frame: 0,
        elapsed: 0.0,
        last_resolve: ResolveStats::default(),
        render: RenderBuffers::default(),
        perf_enabled: false,
        perf_stats: PerfStats::default(),
    }
}
