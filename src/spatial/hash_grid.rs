use std::collections::HashMap;

use crate::core::{IVec3, Vec3};
use crate::domain::ParticleId;

/// Per-tick broad-phase index: cell coordinate -> particle IDs in that cell.
///
/// Built once per step by the hasher and only read afterwards.
/// Buckets are sorted by ID, so two grids built from the same positions
/// compare equal regardless of how the build was scheduled.
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialHashGrid {
    cell_size: f64,
    cells: HashMap<IVec3, Vec<ParticleId>>,
    /// Occupied cells in window scan order (z, then y, then x)
    occupied: Vec<IVec3>,
    entries: usize,
}

impl SpatialHashGrid {
    pub(crate) fn from_cells(cell_size: f64, mut cells: HashMap<IVec3, Vec<ParticleId>>) -> Self {
        let mut entries = 0usize;
        for bucket in cells.values_mut() {
            bucket.sort_unstable();
            entries += bucket.len();
        }
        let mut occupied: Vec<IVec3> = cells.keys().copied().collect();
        occupied.sort_unstable_by_key(|c| (c.z, c.y, c.x));
        Self { cell_size, cells, occupied, entries }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[inline]
    pub fn cell_of(&self, position: Vec3) -> IVec3 {
        position.cell(self.cell_size)
    }

    /// Particles in `cell`; empty for cells nobody occupies
    #[inline]
    pub fn cell(&self, cell: IVec3) -> &[ParticleId] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Total number of indexed particles
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (IVec3, &[ParticleId])> {
        self.cells.iter().map(|(c, ids)| (*c, ids.as_slice()))
    }

    /// Collect every particle in the `(2r+1)^3` block around `center`,
    /// skipping `exclude`. `out` is cleared first so callers can reuse it.
    ///
    /// When the block has more cells than the grid has occupied ones, the
    /// occupied cells are filtered instead of probing the whole block. Both
    /// walks yield the same IDs in the same order.
    pub fn gather_neighbors(
        &self,
        center: IVec3,
        radius: u32,
        exclude: ParticleId,
        out: &mut Vec<ParticleId>,
    ) {
        out.clear();
        let side = 2 * radius as u64 + 1;
        let window = side.checked_mul(side).and_then(|sq| sq.checked_mul(side));
        match window {
            Some(cells) if cells <= self.occupied.len() as u64 => {
                self.gather_in_window(center, radius, exclude, out)
            }
            _ => self.gather_in_occupied(center, radius, exclude, out),
        }
    }

    fn gather_in_window(&self, center: IVec3, radius: u32, exclude: ParticleId, out: &mut Vec<ParticleId>) {
        let r = radius.min(i32::MAX as u32) as i32;
        for dz in -r..=r {
            for dy in -r..=r {
                for dx in -r..=r {
                    let bucket = self.cell(center.offset(dx, dy, dz));
                    out.extend(bucket.iter().copied().filter(|&id| id != exclude));
                }
            }
        }
    }

    fn gather_in_occupied(&self, center: IVec3, radius: u32, exclude: ParticleId, out: &mut Vec<ParticleId>) {
        let r = i64::from(radius);
        let near = |a: i32, b: i32| (i64::from(a) - i64::from(b)).abs() <= r;
        for cell in &self.occupied {
            if near(cell.x, center.x) && near(cell.y, center.y) && near(cell.z, center.z) {
                out.extend(self.cell(*cell).iter().copied().filter(|&id| id != exclude));
            }
        }
    }
}
