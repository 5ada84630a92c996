use serde::{Deserialize, Serialize};

use crate::core::{IVec3, Result, SimError, Vec3};

/// Stable index of a particle in the world store
pub type ParticleId = usize;

/// Verlet formulation used by one simulation instance.
///
/// Picked once when the simulation is created. The two forms interpret the
/// particle state differently, so switching mid-simulation is rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntegrationScheme {
    /// Classic velocity Verlet with gravity + quadratic drag
    VelocityBased,
    /// `pos_current` / `pos_old` Verlet, velocity is implicit
    #[default]
    PositionBased,
}

/// Physics state of a single particle.
///
/// Both formulations live side by side: the position-based scheme reads
/// `position_previous`, the velocity-based scheme reads `velocity`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position_current: Vec3,
    pub position_previous: Vec3,
    pub velocity: Vec3,
    /// Accumulated acceleration; cleared after each position-based update
    pub acceleration: Vec3,
    pub radius: f64,
    pub mass: f64,
    pub drag_coefficient: f64,
    /// Static geometry: never moved by integration, collisions or links
    pub frozen: bool,
}

impl Particle {
    /// Particle at rest with unit mass and no drag
    pub fn new(position: Vec3, radius: f64) -> Self {
        Self {
            position_current: position,
            position_previous: position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            radius,
            mass: 1.0,
            drag_coefficient: 0.0,
            frozen: false,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position_current
    }

    #[inline]
    pub fn accelerate(&mut self, acc: Vec3) {
        self.acceleration += acc;
    }

    #[inline]
    pub fn cell(&self, cell_size: f64) -> IVec3 {
        self.position_current.cell(cell_size)
    }
}

/// Caller-side description of a particle to spawn
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticleSpec {
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f64,
    pub mass: f64,
    pub drag_coefficient: f64,
    pub frozen: bool,
    /// Opaque render payload (color / material slot), not read by physics
    pub material_id: u32,
}

impl Default for ParticleSpec {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            radius: 0.5,
            mass: 1.0,
            drag_coefficient: 0.0,
            frozen: false,
            material_id: 0,
        }
    }
}

impl ParticleSpec {
    pub fn new(position: Vec3, radius: f64) -> Self {
        Self {
            position,
            radius,
            ..Self::default()
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_drag(mut self, drag_coefficient: f64) -> Self {
        self.drag_coefficient = drag_coefficient;
        self
    }

    pub fn with_material(mut self, material_id: u32) -> Self {
        self.material_id = material_id;
        self
    }

    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    /// Errors:
    /// - `SimError::InvalidArgument` for non-finite vectors, negative radius,
    ///   non-positive mass or negative drag.
    pub fn validate(&self) -> Result<()> {
        if !self.position.is_finite() {
            return Err(SimError::InvalidArgument("position must be finite".into()));
        }
        if !self.velocity.is_finite() {
            return Err(SimError::InvalidArgument("velocity must be finite".into()));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(SimError::InvalidArgument("radius must be finite and >= 0".into()));
        }
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(SimError::InvalidArgument("mass must be finite and > 0".into()));
        }
        if !self.drag_coefficient.is_finite() || self.drag_coefficient < 0.0 {
            return Err(SimError::InvalidArgument(
                "drag coefficient must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }

    /// Build the physics state for `scheme`.
    ///
    /// For the position-based scheme the initial velocity is encoded as
    /// `position_previous = position - velocity * dt`, where `dt` is the
    /// length of one integration sub-step.
    pub fn into_particle(self, scheme: IntegrationScheme, dt: f64) -> Particle {
        let velocity = if self.frozen { Vec3::ZERO } else { self.velocity };
        let position_previous = match scheme {
            IntegrationScheme::PositionBased => self.position - velocity * dt,
            IntegrationScheme::VelocityBased => self.position,
        };
        Particle {
            position_current: self.position,
            position_previous,
            velocity,
            acceleration: Vec3::ZERO,
            radius: self.radius,
            mass: self.mass,
            drag_coefficient: self.drag_coefficient,
            frozen: self.frozen,
        }
    }
}
