//! Seeded random particle generator.
//!
//! Particle `k` (counted over the spawner's lifetime) draws from its own
//! `StdRng` seeded from `seed` and `k`, so batches are identical no matter how
//! many threads build them or how the requests are split into batches.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::{Result, Vec3};
use crate::domain::{ParticleSpec, SpawnerConfig};

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

#[derive(Clone, Debug)]
pub struct Spawner {
    config: SpawnerConfig,
    counter: u64,
}

impl Spawner {
    pub fn new(config: SpawnerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    pub(crate) fn from_validated(config: SpawnerConfig) -> Self {
        Self { config, counter: 0 }
    }

    pub fn config(&self) -> &SpawnerConfig {
        &self.config
    }

    /// Number of particles generated so far
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Seed of the RNG stream for particle `index`
    pub fn stream_seed(&self, index: u64) -> u64 {
        splitmix64(self.config.seed ^ splitmix64(index))
    }

    /// Particle `index` of this spawner's sequence. Pure: does not advance the counter.
    pub fn spec_at(&self, index: u64) -> ParticleSpec {
        let cfg = &self.config;
        let mut rng = StdRng::seed_from_u64(self.stream_seed(index));

        // uniform direction on the unit sphere
        let z: f64 = rng.random_range(-1.0..=1.0);
        let phi: f64 = rng.random_range(0.0..std::f64::consts::TAU);
        let ring = (1.0 - z * z).max(0.0).sqrt();
        let direction = Vec3::new(ring * phi.cos(), z, ring * phi.sin());

        let distance = rng.random_range(cfg.distance_min..=cfg.distance_max);
        let radius = rng.random_range(cfg.radius_min..=cfg.radius_max);
        let material_id = rng.random_range(0..cfg.material_count);

        ParticleSpec::new(Vec3::from_array(cfg.center) + direction * distance, radius)
            .with_mass(cfg.mass)
            .with_drag(cfg.drag_coefficient)
            .with_material(material_id)
    }

    /// Generate the next `count` particles and advance the counter
    pub fn next_batch(&mut self, count: usize) -> Vec<ParticleSpec> {
        let start = self.counter;
        let this = &*self;

        #[cfg(feature = "parallel")]
        let batch: Vec<ParticleSpec> = (0..count as u64)
            .into_par_iter()
            .map(|k| this.spec_at(start + k))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let batch: Vec<ParticleSpec> = (0..count as u64).map(|k| this.spec_at(start + k)).collect();

        self.counter = start + count as u64;
        batch
    }
}
