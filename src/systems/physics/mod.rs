//! Verlet physics: integration, penetration resolution and distance links.
//!
//! Every pass writes each particle from exactly one task. Parallel variants
//! run over the particle slice behind the `parallel` feature.

mod collision;
mod integrator;
mod links;
mod types;

pub use collision::{contact_normal, resolve, DEGENERATE_DISTANCE};
pub use integrator::{
    drag_acceleration, integrate, substep, update_position_based, update_velocity_based,
    validate_dt,
};
pub use links::relax_links;
pub use types::{ResolveParams, ResolveStats};
