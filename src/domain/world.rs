use crate::core::{Result, SimError, Vec3};

use super::particle::{Particle, ParticleId};

/// Pairwise distance constraint between two particles
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceLink {
    pub a: ParticleId,
    pub b: ParticleId,
    pub target_distance: f64,
}

/// Owned particle store plus global gravity.
///
/// Append-only: a `ParticleId` stays valid for the lifetime of the world.
#[derive(Clone, Debug)]
pub struct World {
    particles: Vec<Particle>,
    materials: Vec<u32>,
    links: Vec<DistanceLink>,
    gravity: Vec3,
}

impl World {
    pub fn new(gravity: Vec3) -> Self {
        Self::with_capacity(gravity, 0)
    }

    pub fn with_capacity(gravity: Vec3, capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            materials: Vec::with_capacity(capacity),
            links: Vec::new(),
            gravity,
        }
    }

    /// Append a particle; O(1) amortized
    pub fn add_particle(&mut self, particle: Particle) -> ParticleId {
        self.add_particle_with_material(particle, 0)
    }

    pub fn add_particle_with_material(&mut self, particle: Particle, material_id: u32) -> ParticleId {
        let id = self.particles.len();
        self.particles.push(particle);
        self.materials.push(material_id);
        id
    }

    pub fn get(&self, id: ParticleId) -> Result<Particle> {
        self.particles
            .get(id)
            .copied()
            .ok_or(SimError::IndexOutOfBounds { id, len: self.particles.len() })
    }

    pub fn set(&mut self, id: ParticleId, particle: Particle) -> Result<()> {
        let len = self.particles.len();
        let slot = self
            .particles
            .get_mut(id)
            .ok_or(SimError::IndexOutOfBounds { id, len })?;
        *slot = particle;
        Ok(())
    }

    pub fn material(&self, id: ParticleId) -> Result<u32> {
        self.materials
            .get(id)
            .copied()
            .ok_or(SimError::IndexOutOfBounds { id, len: self.materials.len() })
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Takes effect for every non-frozen particle on the next step
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Exclusive per-index access for the write phases
    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn materials(&self) -> &[u32] {
        &self.materials
    }

    /// Largest collision radius in the store (0 when empty)
    pub fn max_radius(&self) -> f64 {
        self.particles
            .iter()
            .map(|p| p.radius)
            .fold(0.0, f64::max)
    }

    /// Register a distance constraint between `a` and `b`.
    ///
    /// Errors:
    /// - `SimError::IndexOutOfBounds` if either ID is unknown
    /// - `SimError::InvalidArgument` for a self-link or a negative / non-finite target
    pub fn add_link(&mut self, a: ParticleId, b: ParticleId, target_distance: f64) -> Result<()> {
        let len = self.particles.len();
        for id in [a, b] {
            if id >= len {
                return Err(SimError::IndexOutOfBounds { id, len });
            }
        }
        if a == b {
            return Err(SimError::InvalidArgument("cannot link a particle to itself".into()));
        }
        if !target_distance.is_finite() || target_distance < 0.0 {
            return Err(SimError::InvalidArgument(
                "link target distance must be finite and >= 0".into(),
            ));
        }
        self.links.push(DistanceLink { a, b, target_distance });
        Ok(())
    }

    pub fn links(&self) -> &[DistanceLink] {
        &self.links
    }

    pub(crate) fn links_and_particles_mut(&mut self) -> (&[DistanceLink], &mut [Particle]) {
        (&self.links, &mut self.particles)
    }
}
