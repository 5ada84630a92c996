#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::{Result, SimError, Vec3};
use crate::domain::{IntegrationScheme, Particle, World};

pub fn validate_dt(dt: f64) -> Result<()> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(SimError::InvalidArgument(format!("dt must be finite and > 0, got {dt}")));
    }
    Ok(())
}

/// Quadratic drag as `-(0.5 * c * v²) / m`, squared per component.
///
/// The square drops the sign of the velocity, so the result always points
/// towards negative axes. Kept as an approximation, not a physical drag law.
#[inline]
pub fn drag_acceleration(velocity: Vec3, drag_coefficient: f64, mass: f64) -> Vec3 {
    if drag_coefficient == 0.0 {
        return Vec3::ZERO;
    }
    -(velocity.mul_elem(velocity) * (0.5 * drag_coefficient)) / mass
}

/// Position-based Verlet: velocity is `current - previous`.
/// Clears the accumulated acceleration.
#[inline]
pub fn update_position_based(p: &mut Particle, dt: f64) {
    let implicit_velocity = p.position_current - p.position_previous;
    p.position_previous = p.position_current;
    p.position_current = p.position_current + implicit_velocity + p.acceleration * (dt * dt);
    p.acceleration = Vec3::ZERO;
    p.velocity = (p.position_current - p.position_previous) / dt;
}

/// Velocity Verlet with gravity and drag
#[inline]
pub fn update_velocity_based(p: &mut Particle, gravity: Vec3, dt: f64) {
    let new_position = p.position_current + p.velocity * dt + p.acceleration * (dt * dt * 0.5);
    let new_acceleration = gravity + drag_acceleration(p.velocity, p.drag_coefficient, p.mass);
    let new_velocity = p.velocity + (p.acceleration + new_acceleration) * (dt * 0.5);
    p.position_previous = p.position_current;
    p.position_current = new_position;
    p.velocity = new_velocity;
    p.acceleration = new_acceleration;
}

/// One sub-step for a single particle. Frozen particles are left untouched.
#[inline]
pub fn substep(p: &mut Particle, gravity: Vec3, dt: f64, scheme: IntegrationScheme) {
    if p.frozen {
        return;
    }
    match scheme {
        IntegrationScheme::PositionBased => {
            p.accelerate(gravity);
            update_position_based(p, dt);
        }
        IntegrationScheme::VelocityBased => update_velocity_based(p, gravity, dt),
    }
}

/// Advance every non-frozen particle by `dt`, split into `sub_steps`.
///
/// Used when collisions are off; the resolver integrates on its own otherwise.
pub fn integrate(world: &mut World, dt: f64, sub_steps: u32, scheme: IntegrationScheme) -> Result<()> {
    validate_dt(dt)?;
    if sub_steps == 0 {
        return Err(SimError::InvalidConfiguration("sub_steps must be >= 1".into()));
    }
    let h = dt / sub_steps as f64;
    let gravity = world.gravity();
    let advance = |p: &mut Particle| {
        for _ in 0..sub_steps {
            substep(p, gravity, h, scheme);
        }
    };

    #[cfg(feature = "parallel")]
    world.particles_mut().par_iter_mut().for_each(advance);

    #[cfg(not(feature = "parallel"))]
    world.particles_mut().iter_mut().for_each(advance);

    Ok(())
}
