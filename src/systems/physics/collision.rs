#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::{Result, SimError, Vec3};
use crate::domain::{IntegrationScheme, Particle, ParticleId, World};
use crate::spatial::SpatialHashGrid;

use super::integrator::substep;
use super::types::{ResolveParams, ResolveStats};

/// Below this distance two centers have no usable contact normal
pub const DEGENERATE_DISTANCE: f64 = 1e-12;

/// Read-only view of a neighbor, captured before the resolve pass
#[derive(Clone, Copy, Debug)]
struct NeighborState {
    position: Vec3,
    radius: f64,
    frozen: bool,
}

/// Unit axis from `a` towards `b` and the distance between them.
///
/// Errors: `SimError::DegenerateGeometry` when the centers (nearly) coincide.
#[inline]
pub fn contact_normal(
    a: ParticleId,
    pos_a: Vec3,
    b: ParticleId,
    pos_b: Vec3,
) -> Result<(Vec3, f64)> {
    let delta = pos_b - pos_a;
    let dist = delta.length();
    if !(dist >= DEGENERATE_DISTANCE) {
        return Err(SimError::DegenerateGeometry { a, b });
    }
    Ok((delta / dist, dist))
}

/// Sub-stepped penetration resolution over all particles.
///
/// Every non-frozen particle is integrated by `dt / sub_steps` and then pushed
/// out of its neighbors, `sub_steps` times. Neighbors are read from a copy of
/// the world taken before the pass, so each task writes only its own particle.
///
/// Pushes move `position_current`. Position-based particles turn that into
/// implicit velocity; velocity-based particles also lose the part of their
/// velocity that still points into the contact.
///
/// Errors:
/// - `SimError::InvalidConfiguration` for bad params or a grid not built from `world`
///   with this cell size
/// - `SimError::InvalidArgument` for a non-positive `dt`
pub fn resolve(world: &mut World, grid: &SpatialHashGrid, params: &ResolveParams) -> Result<ResolveStats> {
    params.validate()?;
    if grid.cell_size() != params.cell_size {
        return Err(SimError::InvalidConfiguration(format!(
            "grid cell size {} does not match resolve cell size {}",
            grid.cell_size(),
            params.cell_size
        )));
    }
    if grid.len() != world.particle_count() {
        return Err(SimError::InvalidConfiguration(format!(
            "grid indexes {} particles, world has {}",
            grid.len(),
            world.particle_count()
        )));
    }

    let snapshot: Vec<NeighborState> = world
        .particles()
        .iter()
        .map(|p| NeighborState { position: p.position_current, radius: p.radius, frozen: p.frozen })
        .collect();
    let params = *params;

    #[cfg(feature = "parallel")]
    let stats = world
        .particles_mut()
        .par_iter_mut()
        .enumerate()
        .map_init(Vec::new, |scratch, (i, p)| {
            resolve_particle(i, p, grid, &snapshot, &params, scratch)
        })
        .reduce(ResolveStats::default, ResolveStats::merge);

    #[cfg(not(feature = "parallel"))]
    let stats = {
        let mut scratch = Vec::new();
        world
            .particles_mut()
            .iter_mut()
            .enumerate()
            .map(|(i, p)| resolve_particle(i, p, grid, &snapshot, &params, &mut scratch))
            .fold(ResolveStats::default(), ResolveStats::merge)
    };

    Ok(stats)
}

/// Integrate first, then push: two touching particles at rest separate by
/// exactly half the overlap each in one sub-step.
fn resolve_particle(
    i: ParticleId,
    p: &mut Particle,
    grid: &SpatialHashGrid,
    snapshot: &[NeighborState],
    params: &ResolveParams,
    scratch: &mut Vec<ParticleId>,
) -> ResolveStats {
    let mut stats = ResolveStats::default();
    if p.frozen {
        return stats;
    }
    stats.resolved_particles = 1;

    grid.gather_neighbors(grid.cell_of(p.position_current), params.search_radius, i, scratch);
    stats.candidates = scratch.len() as u64;

    let h = params.sub_dt();
    for _ in 0..params.sub_steps {
        substep(p, params.gravity, h, params.scheme);

        for &n in scratch.iter() {
            let other = &snapshot[n];
            let (axis, dist) = match contact_normal(i, p.position_current, n, other.position) {
                Ok(contact) => contact,
                Err(_) => {
                    stats.degenerate_pairs += 1;
                    continue;
                }
            };
            let min_separation = p.radius + other.radius;
            if dist < min_separation {
                let share = if other.frozen { 1.0 } else { 0.5 };
                p.position_current -= axis * ((min_separation - dist) * share);
                if params.scheme == IntegrationScheme::VelocityBased {
                    let approach = p.velocity.dot(axis);
                    if approach > 0.0 {
                        p.velocity -= axis * (approach * share);
                    }
                }
                stats.contacts += 1;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::build_grid;

    fn params(sub_steps: u32, scheme: IntegrationScheme) -> ResolveParams {
        ResolveParams {
            cell_size: 1.0,
            sub_steps,
            dt: 0.01,
            search_radius: 2,
            scheme,
            gravity: Vec3::ZERO,
        }
    }

    fn pair(d: f64, frozen_b: bool) -> World {
        let mut world = World::new(Vec3::ZERO);
        world.add_particle(Particle::new(Vec3::ZERO, 0.5));
        let mut b = Particle::new(Vec3::new(d, 0.0, 0.0), 0.5);
        b.frozen = frozen_b;
        world.add_particle(b);
        world
    }

    #[test]
    fn contact_normal_points_from_a_to_b() {
        let (axis, dist) = contact_normal(0, Vec3::ZERO, 1, Vec3::new(0.0, 3.0, 4.0)).unwrap();
        assert_eq!(dist, 5.0);
        assert!((axis - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-15);
        assert_eq!(
            contact_normal(2, Vec3::ZERO, 7, Vec3::ZERO),
            Err(SimError::DegenerateGeometry { a: 2, b: 7 })
        );
    }

    #[test]
    fn equal_pair_splits_overlap() {
        for scheme in [IntegrationScheme::PositionBased, IntegrationScheme::VelocityBased] {
            let mut world = pair(0.6, false);
            let grid = build_grid(&world, 1.0).unwrap();
            let stats = resolve(&mut world, &grid, &params(1, scheme)).unwrap();

            // overlap 0.4, each side takes 0.2
            assert!((world.get(0).unwrap().position().x + 0.2).abs() < 1e-12);
            assert!((world.get(1).unwrap().position().x - 0.8).abs() < 1e-12);
            assert_eq!(stats.contacts, 2);
            assert_eq!(stats.resolved_particles, 2);
        }
    }

    #[test]
    fn frozen_neighbor_takes_no_share() {
        let mut world = pair(0.6, true);
        let before = world.get(1).unwrap();
        let grid = build_grid(&world, 1.0).unwrap();
        resolve(&mut world, &grid, &params(1, IntegrationScheme::PositionBased)).unwrap();

        assert!((world.get(0).unwrap().position().x + 0.4).abs() < 1e-12);
        assert_eq!(world.get(1).unwrap(), before);
    }

    #[test]
    fn separated_pair_is_left_alone() {
        let mut world = pair(1.5, false);
        let grid = build_grid(&world, 1.0).unwrap();
        let stats = resolve(&mut world, &grid, &params(4, IntegrationScheme::PositionBased)).unwrap();
        assert_eq!(stats.contacts, 0);
        assert_eq!(world.get(0).unwrap().position(), Vec3::ZERO);
        assert_eq!(world.get(1).unwrap().position(), Vec3::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn coincident_pair_is_skipped_without_nan() {
        let mut world = pair(0.0, false);
        let grid = build_grid(&world, 1.0).unwrap();
        let stats = resolve(&mut world, &grid, &params(3, IntegrationScheme::VelocityBased)).unwrap();
        assert_eq!(stats.degenerate_pairs, 6);
        assert!(world.particles().iter().all(|p| p.position().is_finite()));
    }

    #[test]
    fn rejects_grid_with_other_cell_size() {
        let mut world = pair(0.6, false);
        let grid = build_grid(&world, 2.0).unwrap();
        assert!(matches!(
            resolve(&mut world, &grid, &params(1, IntegrationScheme::PositionBased)),
            Err(SimError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_grid_from_another_world() {
        let mut bigger = pair(0.6, false);
        bigger.add_particle(Particle::new(Vec3::new(0.3, 0.0, 0.0), 0.5));
        let grid = build_grid(&bigger, 1.0).unwrap();

        let mut world = pair(0.6, false);
        assert!(matches!(
            resolve(&mut world, &grid, &params(1, IntegrationScheme::PositionBased)),
            Err(SimError::InvalidConfiguration(_))
        ));
        assert_eq!(world.particles(), pair(0.6, false).particles());
    }

    #[test]
    fn velocity_based_contact_stops_approach_only() {
        let mut world = pair(0.6, true);
        let mut mover = world.get(0).unwrap();
        mover.velocity = Vec3::new(3.0, 0.0, 0.0);
        world.set(0, mover).unwrap();
        let grid = build_grid(&world, 1.0).unwrap();
        resolve(&mut world, &grid, &params(1, IntegrationScheme::VelocityBased)).unwrap();
        assert!(world.get(0).unwrap().velocity.length() < 1e-12);

        // moving away while still overlapping keeps its speed
        let mut world = pair(0.6, true);
        let mut mover = world.get(0).unwrap();
        mover.velocity = Vec3::new(-1.0, 0.0, 0.0);
        world.set(0, mover).unwrap();
        let grid = build_grid(&world, 1.0).unwrap();
        let stats = resolve(&mut world, &grid, &params(1, IntegrationScheme::VelocityBased)).unwrap();
        assert_eq!(stats.contacts, 1);
        assert_eq!(world.get(0).unwrap().velocity, Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn gravity_is_applied_inside_sub_steps() {
        let mut world = World::new(Vec3::ZERO);
        world.add_particle(Particle::new(Vec3::new(0.0, 5.0, 0.0), 0.5));
        let grid = build_grid(&world, 1.0).unwrap();
        let mut p = params(2, IntegrationScheme::PositionBased);
        p.gravity = Vec3::new(0.0, -10.0, 0.0);
        resolve(&mut world, &grid, &p).unwrap();
        assert!(world.get(0).unwrap().position().y < 5.0);
    }
}
