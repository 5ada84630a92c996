use std::ops::Range;

use crate::core::Result;
use crate::domain::{IntegrationScheme, ParticleId, ParticleSpec, World};
use crate::systems::physics::drag_acceleration;

use super::Simulation;

/// Add a validated spec to the world in the state `scheme` expects.
///
/// `sub_dt` is the sub-step length, the unit of the position-based implicit
/// velocity. Velocity-based particles start with the acceleration they would
/// have had after a previous step, so the first update already sees gravity.
pub(super) fn insert_particle(
    world: &mut World,
    spec: ParticleSpec,
    scheme: IntegrationScheme,
    sub_dt: f64,
) -> ParticleId {
    let material_id = spec.material_id;
    let mut particle = spec.into_particle(scheme, sub_dt);
    if scheme == IntegrationScheme::VelocityBased && !particle.frozen {
        particle.acceleration = world.gravity()
            + drag_acceleration(particle.velocity, particle.drag_coefficient, particle.mass);
    }
    world.add_particle_with_material(particle, material_id)
}

pub(super) fn spawn(sim: &mut Simulation, spec: ParticleSpec) -> Result<ParticleId> {
    spec.validate()?;
    Ok(insert_particle(&mut sim.world, spec, sim.config.scheme, sim.config.sub_dt()))
}

pub(super) fn spawn_random(sim: &mut Simulation, count: usize) -> Range<ParticleId> {
    let start = sim.world.particle_count();
    for spec in sim.spawner.next_batch(count) {
        insert_particle(&mut sim.world, spec, sim.config.scheme, sim.config.sub_dt());
    }
    start..sim.world.particle_count()
}

pub(super) fn link(
    sim: &mut Simulation,
    a: ParticleId,
    b: ParticleId,
    target_distance: Option<f64>,
) -> Result<()> {
    let target = match target_distance {
        Some(d) => d,
        None => (sim.world.get(b)?.position() - sim.world.get(a)?.position()).length(),
    };
    sim.world.add_link(a, b, target)
}
