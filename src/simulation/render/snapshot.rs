use serde::Serialize;

use crate::domain::World;

/// What a renderer needs to draw one particle
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleView {
    pub position: [f32; 3],
    pub radius: f32,
    pub material_id: u32,
}

/// Read-only view of the world after a tick, particles in ID order
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSnapshot {
    pub frame: u64,
    /// Whether this tick ran a simulation step
    pub stepped: bool,
    pub particles: Vec<ParticleView>,
}

impl SimulationSnapshot {
    pub(super) fn capture(world: &World, frame: u64, stepped: bool) -> Self {
        let particles = world
            .particles()
            .iter()
            .zip(world.materials())
            .map(|(p, &material_id)| ParticleView {
                position: p.position_current.to_f32_array(),
                radius: p.radius as f32,
                material_id,
            })
            .collect();
        Self { frame, stepped, particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Flat f32/u32 buffers handed to JS by pointer.
///
/// `positions` holds xyz triples, `radii` and `materials` one entry per particle.
#[derive(Clone, Debug, Default)]
pub(crate) struct RenderBuffers {
    pub(crate) positions: Vec<f32>,
    pub(crate) radii: Vec<f32>,
    pub(crate) materials: Vec<u32>,
}

impl RenderBuffers {
    pub(crate) fn refresh(&mut self, world: &World) {
        let n = world.particle_count();
        self.positions.clear();
        self.radii.clear();
        self.materials.clear();
        self.positions.reserve(n * 3);
        self.radii.reserve(n);

        for p in world.particles() {
            self.positions.extend_from_slice(&p.position_current.to_f32_array());
            self.radii.push(p.radius as f32);
        }
        self.materials.extend_from_slice(world.materials());
    }
}
