use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::{IVec3, Result, SimError};
use crate::domain::{ParticleId, World};

use super::hash_grid::SpatialHashGrid;

type CellMap = HashMap<IVec3, Vec<ParticleId>>;

/// Bucket every particle of `world` by `floor(position / cell_size)`.
///
/// PARALLEL: each rayon worker fills its own map, maps are merged after the
/// parallel phase. No bucket is shared between threads while appending.
///
/// Errors: `SimError::InvalidConfiguration` if `cell_size` is not a positive finite number.
pub fn build_grid(world: &World, cell_size: f64) -> Result<SpatialHashGrid> {
    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(SimError::InvalidConfiguration(format!(
            "cell_size must be finite and > 0, got {cell_size}"
        )));
    }

    let particles = world.particles();

    #[cfg(feature = "parallel")]
    let cells = particles
        .par_iter()
        .enumerate()
        .fold(CellMap::new, |mut map, (id, p)| {
            map.entry(p.cell(cell_size)).or_default().push(id);
            map
        })
        .reduce(CellMap::new, merge_cells);

    #[cfg(not(feature = "parallel"))]
    let cells = {
        let mut map = CellMap::new();
        for (id, p) in particles.iter().enumerate() {
            map.entry(p.cell(cell_size)).or_default().push(id);
        }
        map
    };

    Ok(SpatialHashGrid::from_cells(cell_size, cells))
}

/// Append-only merge; bucket order is fixed later by sorting
#[cfg_attr(not(feature = "parallel"), allow(dead_code))]
fn merge_cells(mut a: CellMap, mut b: CellMap) -> CellMap {
    if a.len() < b.len() {
        std::mem::swap(&mut a, &mut b);
    }
    for (cell, ids) in b {
        a.entry(cell).or_default().extend(ids);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Vec3;
    use crate::domain::Particle;
    use std::collections::BTreeSet;

    fn scattered_world(n: usize) -> World {
        let mut world = World::new(Vec3::ZERO);
        for i in 0..n {
            let f = i as f64;
            let pos = Vec3::new((f * 0.37).sin() * 8.0, (f * 0.91).cos() * 8.0, f * 0.05 - 3.0);
            world.add_particle(Particle::new(pos, 0.2));
        }
        world
    }

    #[test]
    fn rejects_non_positive_cell_size() {
        let world = scattered_world(4);
        assert!(matches!(build_grid(&world, 0.0), Err(SimError::InvalidConfiguration(_))));
        assert!(build_grid(&world, -1.0).is_err());
        assert!(build_grid(&world, f64::NAN).is_err());
    }

    #[test]
    fn every_particle_lands_in_its_floor_cell() {
        let world = scattered_world(200);
        let grid = build_grid(&world, 0.75).unwrap();
        assert_eq!(grid.len(), 200);
        for (id, p) in world.particles().iter().enumerate() {
            assert!(grid.cell(p.cell(0.75)).contains(&id));
        }
    }

    #[test]
    fn negative_coordinates_get_negative_cells() {
        let mut world = World::new(Vec3::ZERO);
        world.add_particle(Particle::new(Vec3::new(-0.5, -1.5, 0.5), 0.1));
        let grid = build_grid(&world, 1.0).unwrap();
        assert_eq!(grid.cell(IVec3::new(-1, -2, 0)), &[0]);
    }

    #[test]
    fn rebuilding_gives_same_sets_per_cell() {
        let world = scattered_world(500);
        let a = build_grid(&world, 1.0).unwrap();
        let b = build_grid(&world, 1.0).unwrap();
        assert_eq!(a.occupied_cells(), b.occupied_cells());
        for (cell, ids) in a.iter() {
            let lhs: BTreeSet<_> = ids.iter().copied().collect();
            let rhs: BTreeSet<_> = b.cell(cell).iter().copied().collect();
            assert_eq!(lhs, rhs);
        }
    }

    #[test]
    fn merge_keeps_all_entries() {
        let mut a = CellMap::new();
        a.insert(IVec3::new(0, 0, 0), vec![1]);
        let mut b = CellMap::new();
        b.insert(IVec3::new(0, 0, 0), vec![2]);
        b.insert(IVec3::new(1, 0, 0), vec![3]);
        let merged = merge_cells(a, b);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[&IVec3::new(0, 0, 0)].len(), 2);
    }
}
