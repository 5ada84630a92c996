//! Core building blocks shared by every layer: vector math and the error type.

pub mod error;

mod math {
    pub mod vec3;
}

pub use error::{Result, SimError};
pub use math::vec3::{IVec3, Vec3};
