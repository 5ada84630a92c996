use crate::core::{Result, SimError, Vec3};
use crate::domain::IntegrationScheme;

/// Inputs of one collision-resolution pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolveParams {
    pub cell_size: f64,
    pub sub_steps: u32,
    /// Full step length, split evenly across sub-steps
    pub dt: f64,
    /// Neighbor window in cells around the particle's own cell
    pub search_radius: u32,
    pub scheme: IntegrationScheme,
    pub gravity: Vec3,
}

impl ResolveParams {
    pub fn validate(&self) -> Result<()> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(SimError::InvalidConfiguration("cell_size must be finite and > 0".into()));
        }
        if self.sub_steps == 0 {
            return Err(SimError::InvalidConfiguration("sub_steps must be >= 1".into()));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimError::InvalidArgument("dt must be finite and > 0".into()));
        }
        if !self.gravity.is_finite() {
            return Err(SimError::InvalidConfiguration("gravity must be finite".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn sub_dt(&self) -> f64 {
        self.dt / self.sub_steps as f64
    }
}

/// Counters gathered by the resolver, summed over all particles
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Non-frozen particles that went through the sub-step loop
    pub resolved_particles: u64,
    /// Neighbor candidates pulled from the grid
    pub candidates: u64,
    /// Overlapping pairs found, counted once per sub-step
    pub contacts: u64,
    /// Coincident pairs skipped because no contact normal exists
    pub degenerate_pairs: u64,
}

impl ResolveStats {
    pub fn merge(self, other: ResolveStats) -> ResolveStats {
        ResolveStats {
            resolved_particles: self.resolved_particles + other.resolved_particles,
            candidates: self.candidates + other.candidates,
            contacts: self.contacts + other.contacts,
            degenerate_pairs: self.degenerate_pairs + other.degenerate_pairs,
        }
    }
}
